//! Data layer for the filter → sort → paginate pipeline
//!
//! Records are never modified or copied by a view. Every stage works on row
//! indices into an immutable source, the same separation of storage and
//! presentation the controller relies on.

// Core value model
pub mod schema;
pub mod value;

// Pipeline stages
pub mod filter;
pub mod pagination;
pub mod sort;

// Controller
pub mod view;

// Record sources and outputs
pub mod export;
pub mod loader;
pub mod summary;
