//! Configuration module
//!
//! User settings for table display and view behavior, stored as TOML.

pub mod config;

pub use config::{BehaviorConfig, Config, DisplayConfig};
