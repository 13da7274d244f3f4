use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The semantic type registered for a field. It decides which comparator
/// the sort stage uses and which filters the field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Category,
    Date,
}

impl FieldKind {
    /// Whether a text search may scan this field
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Category)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Category => "category",
            FieldKind::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// How text and category values are ordered when sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collation {
    /// Compare lowercase forms; values differing only by case are ties
    #[default]
    CaseInsensitive,
    /// Plain byte-wise lexicographic order ("Amy" < "Bob" < "alice")
    CaseSensitive,
}

/// A single field value read from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Category(String),
    Date(NaiveDateTime),
    Null,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn category(value: impl Into<String>) -> Self {
        FieldValue::Category(value.into())
    }

    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            FieldValue::Text(_) => Some(FieldKind::Text),
            FieldValue::Number(_) => Some(FieldKind::Number),
            FieldValue::Category(_) => Some(FieldKind::Category),
            FieldValue::Date(_) => Some(FieldKind::Date),
            FieldValue::Null => None,
        }
    }

    /// String content of text and category values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// The text a search predicate scans. Null has nothing to match.
    pub fn search_text(&self) -> Option<String> {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => Some(s.clone()),
            FieldValue::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Rank used only when two values of different kinds meet in a comparison
    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Text(_) | FieldValue::Category(_) => 2,
            FieldValue::Date(_) => 3,
        }
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value.and_time(NaiveTime::MIN))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Number(f64::from(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) | FieldValue::Category(s) => write!(f, "{}", s),
            FieldValue::Number(n) if n.fract() == 0.0 && n.is_finite() => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            FieldValue::Date(dt) if dt.second() == 0 => write!(f, "{}", dt.format("%Y-%m-%d %H:%M")),
            FieldValue::Date(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Null => write!(f, ""),
        }
    }
}

/// Compare two field values by the natural order of their semantic type.
///
/// Null sorts before everything. Values of different kinds only meet when an
/// accessor disagrees with its declared kind; they are ordered by a fixed type
/// rank so the comparator stays total.
pub fn compare_values(a: &FieldValue, b: &FieldValue, collation: Collation) -> Ordering {
    match (a, b) {
        (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
        (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
        (
            FieldValue::Text(a) | FieldValue::Category(a),
            FieldValue::Text(b) | FieldValue::Category(b),
        ) => compare_text(a, b, collation),
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (a, b) => a.type_rank().cmp(&b.type_rank()),
    }
}

/// Compare two strings under a collation
pub fn compare_text(a: &str, b: &str, collation: Collation) -> Ordering {
    match collation {
        Collation::CaseSensitive => a.cmp(b),
        Collation::CaseInsensitive => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %I:%M %p",
];

/// Parse a calendar day in `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Parse a timestamp in any of the formats the sample data uses. A bare day
/// is read as midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date(value).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Serde helper for record date fields stored as human-readable strings
pub mod flexible_datetime {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_datetime(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised date '{}'", raw)))
    }
}
