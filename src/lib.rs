pub mod config;
pub mod data;
pub mod display;
pub mod entities;
pub mod error;
pub mod logging;

pub use data::filter::{DatePredicate, FilterCriteria, NumericRange, TextMatchMode};
pub use data::pagination::{PageLink, PageSpec};
pub use data::schema::{FieldDef, ViewConfig};
pub use data::sort::{SortDirection, SortSpec};
pub use data::value::{Collation, FieldKind, FieldValue};
pub use data::view::{TabularView, ViewSnapshot};
pub use error::ViewError;
