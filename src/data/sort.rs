use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::schema::FieldDef;
use crate::data::value::{compare_values, FieldValue};

/// Represents how data should be sorted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// The single active sort key of a view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// The sort after a click on `field`'s header: the same field flips
    /// direction, any other field starts ascending.
    pub fn toggled(&self, field: &str) -> Self {
        if self.field == field {
            Self::new(field, self.direction.reversed())
        } else {
            Self::ascending(field)
        }
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// Order row indices by one field of the records they point at.
///
/// The sort is stable: rows with equal keys keep their incoming relative order
/// in both directions, because descending reverses the comparison rather than
/// the output.
pub fn apply_sort<R>(
    records: &[R],
    rows: &mut Vec<usize>,
    field: &FieldDef<R>,
    direction: SortDirection,
) {
    let collation = field.collation();
    let mut keyed: Vec<(usize, FieldValue)> = rows
        .iter()
        .map(|&idx| (idx, field.value(&records[idx])))
        .collect();

    keyed.sort_by(|(_, a), (_, b)| {
        let cmp = compare_values(a, b, collation);
        match direction {
            SortDirection::Ascending => cmp,
            SortDirection::Descending => cmp.reverse(),
        }
    });

    rows.clear();
    rows.extend(keyed.into_iter().map(|(idx, _)| idx));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::value::Collation;

    #[derive(Debug)]
    struct Row {
        name: &'static str,
        score: f64,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "Bob", score: 3.0 },
            Row { name: "alice", score: 1.0 },
            Row { name: "Amy", score: 3.0 },
            Row { name: "carl", score: 2.0 },
        ]
    }

    fn sorted(field: &FieldDef<Row>, direction: SortDirection) -> Vec<&'static str> {
        let records = rows();
        let mut idx: Vec<usize> = (0..records.len()).collect();
        apply_sort(&records, &mut idx, field, direction);
        idx.iter().map(|&i| records[i].name).collect()
    }

    #[test]
    fn test_toggle_same_field_flips() {
        let spec = SortSpec::ascending("name");
        assert_eq!(spec.toggled("name"), SortSpec::descending("name"));
        assert_eq!(spec.toggled("name").toggled("name"), spec);
    }

    #[test]
    fn test_toggle_new_field_resets_to_ascending() {
        let spec = SortSpec::descending("name");
        assert_eq!(spec.toggled("score"), SortSpec::ascending("score"));
    }

    #[test]
    fn test_case_insensitive_text_sort() {
        let name = FieldDef::text("name", |r: &Row| r.name.to_string());
        assert_eq!(
            sorted(&name, SortDirection::Ascending),
            vec!["alice", "Amy", "Bob", "carl"]
        );
    }

    #[test]
    fn test_case_sensitive_text_sort() {
        let name = FieldDef::text("name", |r: &Row| r.name.to_string())
            .with_collation(Collation::CaseSensitive);
        assert_eq!(
            sorted(&name, SortDirection::Ascending),
            vec!["Amy", "Bob", "alice", "carl"]
        );
    }

    #[test]
    fn test_ties_keep_input_order_both_directions() {
        let score = FieldDef::number("score", |r: &Row| r.score);
        // Bob and Amy tie on 3.0; Bob comes first in the input
        assert_eq!(
            sorted(&score, SortDirection::Ascending),
            vec!["alice", "carl", "Bob", "Amy"]
        );
        assert_eq!(
            sorted(&score, SortDirection::Descending),
            vec!["Bob", "Amy", "carl", "alice"]
        );
    }
}
