use thiserror::Error;

use crate::data::schema::FilterKind;
use crate::data::value::FieldKind;

/// Errors raised while configuring or driving a table view.
///
/// Everything here is a configuration or caller error. Navigation past the
/// last page, empty result sets and inverted ranges are valid states and never
/// produce one of these.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view '{view}': field '{field}' is defined more than once")]
    DuplicateField { view: String, field: String },

    #[error("view '{view}': unknown field '{field}'")]
    UnknownField { view: String, field: String },

    #[error("view '{view}': field '{field}' is {kind} and cannot be searched as text")]
    NotSearchable {
        view: String,
        field: String,
        kind: FieldKind,
    },

    #[error("view '{view}': no filter is declared for field '{field}'")]
    UnknownFilter { view: String, field: String },

    #[error("view '{view}': field '{field}' does not support a {expected} filter")]
    FilterKindMismatch {
        view: String,
        field: String,
        expected: FilterKind,
    },

    #[error("view '{view}': page size must be at least 1")]
    InvalidPageSize { view: String },

    #[error("view '{view}': duplicate record key '{key}'")]
    DuplicateKey { view: String, key: String },

    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
