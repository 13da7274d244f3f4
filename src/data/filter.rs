//! Filter stage: reduce a record set to the rows matching every active predicate.

use anyhow::anyhow;
use chrono::NaiveDate;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::data::schema::{FieldDef, FilterKind, ViewConfig};
use crate::error::ViewError;

/// How the search box matches its query against the searchable fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatchMode {
    /// Case-insensitive substring containment
    #[default]
    Substring,
    /// Skim-style fuzzy matching, case-insensitive
    Fuzzy,
    /// Case-insensitive regular expression
    Regex,
}

impl FromStr for TextMatchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" | "text" => Ok(TextMatchMode::Substring),
            "fuzzy" => Ok(TextMatchMode::Fuzzy),
            "regex" => Ok(TextMatchMode::Regex),
            other => Err(anyhow!(
                "Unknown search mode '{}' (expected substring, fuzzy or regex)",
                other
            )),
        }
    }
}

/// Inclusive numeric range. An inverted range matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Date predicate, compared at calendar-day granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePredicate {
    /// Same day, month and year; time of day ignored
    On(NaiveDate),
    /// Inclusive day range; a missing bound is open
    Between {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl DatePredicate {
    pub fn matches(&self, day: NaiveDate) -> bool {
        match self {
            DatePredicate::On(target) => day == *target,
            DatePredicate::Between { from, to } => {
                from.map_or(true, |from| day >= from) && to.map_or(true, |to| day <= to)
            }
        }
    }
}

/// The active predicates of a view, keyed by field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub search: String,
    pub search_mode: TextMatchMode,
    /// Selected values per category field. An empty selection accepts every value.
    pub categories: BTreeMap<String, BTreeSet<String>>,
    pub ranges: BTreeMap<String, NumericRange>,
    pub dates: BTreeMap<String, DatePredicate>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    pub fn with_search_mode(mut self, mode: TextMatchMode) -> Self {
        self.search_mode = mode;
        self
    }

    pub fn with_categories<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .insert(field.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_range(mut self, field: impl Into<String>, min: f64, max: f64) -> Self {
        self.ranges.insert(field.into(), NumericRange::new(min, max));
        self
    }

    pub fn with_date(mut self, field: impl Into<String>, predicate: DatePredicate) -> Self {
        self.dates.insert(field.into(), predicate);
        self
    }

    /// Number of predicates that actually constrain the result
    pub fn active_count(&self) -> usize {
        let search = usize::from(!self.search.is_empty());
        let categories = self.categories.values().filter(|s| !s.is_empty()).count();
        search + categories + self.ranges.len() + self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }
}

enum TextMatcher {
    Substring(String),
    Fuzzy {
        matcher: SkimMatcherV2,
        pattern: String,
    },
    Regex(Regex),
}

impl TextMatcher {
    fn compile(query: &str, mode: TextMatchMode) -> Result<Self, ViewError> {
        Ok(match mode {
            TextMatchMode::Substring => TextMatcher::Substring(query.to_lowercase()),
            TextMatchMode::Fuzzy => TextMatcher::Fuzzy {
                matcher: SkimMatcherV2::default().ignore_case(),
                pattern: query.to_string(),
            },
            TextMatchMode::Regex => TextMatcher::Regex(
                RegexBuilder::new(query).case_insensitive(true).build()?,
            ),
        })
    }

    fn is_match(&self, text: &str) -> bool {
        match self {
            TextMatcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            TextMatcher::Fuzzy { matcher, pattern } => {
                matcher.fuzzy_match(text, pattern).is_some()
            }
            TextMatcher::Regex(regex) => regex.is_match(text),
        }
    }
}

/// Criteria resolved against a view's schema, ready to test records.
///
/// Compiling resolves every field name once and builds the search matcher, so
/// unknown fields and bad patterns are reported here and `matches` is total.
pub struct FilterPlan<R> {
    search: Option<TextMatcher>,
    search_fields: Vec<FieldDef<R>>,
    categories: Vec<(FieldDef<R>, BTreeSet<String>)>,
    ranges: Vec<(FieldDef<R>, NumericRange)>,
    dates: Vec<(FieldDef<R>, DatePredicate)>,
}

impl<R> FilterPlan<R> {
    pub fn compile(config: &ViewConfig<R>, criteria: &FilterCriteria) -> Result<Self, ViewError> {
        let search = if criteria.search.is_empty() {
            None
        } else {
            Some(TextMatcher::compile(&criteria.search, criteria.search_mode)?)
        };

        let search_fields = config
            .search_fields()
            .iter()
            .map(|name| config.require_field(name).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        let categories = criteria
            .categories
            .iter()
            // Empty selection means "all values"
            .filter(|(_, selected)| !selected.is_empty())
            .map(|(name, selected)| {
                Ok((
                    typed_field(config, name, FilterKind::Category)?,
                    selected.clone(),
                ))
            })
            .collect::<Result<Vec<_>, ViewError>>()?;

        let ranges = criteria
            .ranges
            .iter()
            .map(|(name, range)| Ok((typed_field(config, name, FilterKind::Range)?, *range)))
            .collect::<Result<Vec<_>, ViewError>>()?;

        let dates = criteria
            .dates
            .iter()
            .map(|(name, predicate)| {
                Ok((typed_field(config, name, FilterKind::Date)?, *predicate))
            })
            .collect::<Result<Vec<_>, ViewError>>()?;

        Ok(Self {
            search,
            search_fields,
            categories,
            ranges,
            dates,
        })
    }

    /// True when the record satisfies every active predicate
    pub fn matches(&self, record: &R) -> bool {
        self.matches_search(record)
            && self.categories.iter().all(|(field, selected)| {
                field
                    .value(record)
                    .as_str()
                    .is_some_and(|value| selected.contains(value))
            })
            && self.ranges.iter().all(|(field, range)| {
                field
                    .value(record)
                    .as_number()
                    .is_some_and(|value| range.contains(value))
            })
            && self.dates.iter().all(|(field, predicate)| {
                field
                    .value(record)
                    .as_date()
                    .is_some_and(|day| predicate.matches(day))
            })
    }

    fn matches_search(&self, record: &R) -> bool {
        let Some(matcher) = &self.search else {
            return true;
        };
        self.search_fields.iter().any(|field| {
            field
                .value(record)
                .search_text()
                .is_some_and(|text| matcher.is_match(&text))
        })
    }

    /// Whether any predicate is active
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_none()
            && self.categories.is_empty()
            && self.ranges.is_empty()
            && self.dates.is_empty()
    }
}

fn typed_field<R>(
    config: &ViewConfig<R>,
    name: &str,
    kind: FilterKind,
) -> Result<FieldDef<R>, ViewError> {
    let field = config.require_field(name)?;
    if !kind.accepts(field.kind()) {
        return Err(ViewError::FilterKindMismatch {
            view: config.name().to_string(),
            field: name.to_string(),
            expected: kind,
        });
    }
    Ok(field.clone())
}

/// Indices of the records passing the plan, in source order
pub fn apply_filters<R>(records: &[R], plan: &FilterPlan<R>) -> Vec<usize> {
    if plan.is_unconstrained() {
        return (0..records.len()).collect();
    }
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| plan.matches(record))
        .map(|(idx, _)| idx)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::FieldDef;
    use crate::data::value::parse_date;

    #[derive(Debug, Clone)]
    struct Trip {
        id: u32,
        traveller: String,
        city: String,
        status: String,
        amount: f64,
        departs: Option<NaiveDate>,
    }

    fn trip(id: u32, traveller: &str, city: &str, status: &str, amount: f64, departs: &str) -> Trip {
        Trip {
            id,
            traveller: traveller.to_string(),
            city: city.to_string(),
            status: status.to_string(),
            amount,
            departs: parse_date(departs),
        }
    }

    fn config() -> ViewConfig<Trip> {
        ViewConfig::builder("trips")
            .field(FieldDef::number("id", |t: &Trip| f64::from(t.id)))
            .field(FieldDef::text("traveller", |t: &Trip| t.traveller.clone()))
            .field(FieldDef::text("city", |t: &Trip| t.city.clone()))
            .field(FieldDef::category("status", |t: &Trip| t.status.clone()))
            .field(FieldDef::number("amount", |t: &Trip| t.amount))
            .field(FieldDef::date("departs", |t: &Trip| t.departs))
            .key("id")
            .searchable(["traveller", "city"])
            .category_filter("status", ["confirmed", "pending", "cancelled"])
            .range_filter("amount")
            .date_filter("departs")
            .build()
            .unwrap()
    }

    fn trips() -> Vec<Trip> {
        vec![
            trip(1, "Alice Cooper", "Paris", "confirmed", 2450.0, "2025-06-15"),
            trip(2, "Bob Marley", "Tokyo", "pending", 3850.0, "2025-07-10"),
            trip(3, "Charlie Brown", "New York", "cancelled", 1950.0, "2025-08-05"),
            trip(4, "Diana Ross", "Rome", "confirmed", 2850.0, "2025-09-20"),
            trip(5, "Elton John", "Sydney", "pending", 4250.0, ""),
        ]
    }

    fn run(criteria: FilterCriteria) -> Vec<usize> {
        let config = config();
        let plan = FilterPlan::compile(&config, &criteria).unwrap();
        apply_filters(&trips(), &plan)
    }

    #[test]
    fn test_empty_criteria_pass_everything() {
        assert_eq!(run(FilterCriteria::new()), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_any_field() {
        assert_eq!(run(FilterCriteria::new().with_search("TOKYO")), vec![1]);
        assert_eq!(run(FilterCriteria::new().with_search("o")), vec![0, 1, 2, 3, 4]);
        assert_eq!(run(FilterCriteria::new().with_search("ro")), vec![2, 3]);
    }

    #[test]
    fn test_search_ignores_non_searchable_fields() {
        // "confirmed" only appears in the status column
        assert!(run(FilterCriteria::new().with_search("confirmed")).is_empty());
    }

    #[test]
    fn test_fuzzy_search() {
        let criteria = FilterCriteria::new()
            .with_search("ccpr")
            .with_search_mode(TextMatchMode::Fuzzy);
        assert_eq!(run(criteria), vec![0]);
    }

    #[test]
    fn test_regex_search() {
        let criteria = FilterCriteria::new()
            .with_search("^(rome|paris)$")
            .with_search_mode(TextMatchMode::Regex);
        assert_eq!(run(criteria), vec![0, 3]);
    }

    #[test]
    fn test_invalid_regex_fails_at_compile() {
        let criteria = FilterCriteria::new()
            .with_search("(unclosed")
            .with_search_mode(TextMatchMode::Regex);
        let result = FilterPlan::compile(&config(), &criteria);
        assert!(matches!(result, Err(ViewError::InvalidPattern(_))));
    }

    #[test]
    fn test_category_membership() {
        let criteria = FilterCriteria::new().with_categories("status", ["pending", "cancelled"]);
        assert_eq!(run(criteria), vec![1, 2, 4]);
    }

    #[test]
    fn test_empty_category_selection_accepts_all() {
        let empty: [&str; 0] = [];
        let criteria = FilterCriteria::new().with_categories("status", empty);
        assert_eq!(run(criteria), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_numeric_range_is_inclusive() {
        let criteria = FilterCriteria::new().with_range("amount", 2450.0, 3850.0);
        assert_eq!(run(criteria), vec![0, 1, 3]);
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let criteria = FilterCriteria::new().with_range("amount", 5000.0, 1000.0);
        assert!(run(criteria).is_empty());
    }

    #[test]
    fn test_date_on_and_between() {
        let on = FilterCriteria::new().with_date(
            "departs",
            DatePredicate::On(parse_date("2025-07-10").unwrap()),
        );
        assert_eq!(run(on), vec![1]);

        let open_ended = FilterCriteria::new().with_date(
            "departs",
            DatePredicate::Between {
                from: parse_date("2025-08-05"),
                to: None,
            },
        );
        // Record 5 has no departure date and never matches a date predicate
        assert_eq!(run(open_ended), vec![2, 3]);

        let inverted = FilterCriteria::new().with_date(
            "departs",
            DatePredicate::Between {
                from: parse_date("2025-09-01"),
                to: parse_date("2025-06-01"),
            },
        );
        assert!(run(inverted).is_empty());
    }

    #[test]
    fn test_predicates_are_anded() {
        let criteria = FilterCriteria::new()
            .with_categories("status", ["confirmed", "pending"])
            .with_range("amount", 2000.0, 4000.0)
            .with_search("a");
        assert_eq!(run(criteria), vec![0, 1, 3]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let criteria = FilterCriteria::new().with_range("price", 0.0, 1.0);
        assert!(matches!(
            FilterPlan::compile(&config(), &criteria),
            Err(ViewError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_wrong_filter_kind_is_rejected() {
        let criteria = FilterCriteria::new().with_range("traveller", 0.0, 1.0);
        assert!(matches!(
            FilterPlan::compile(&config(), &criteria),
            Err(ViewError::FilterKindMismatch { .. })
        ));
    }

    #[test]
    fn test_active_count() {
        let empty: [&str; 0] = [];
        let criteria = FilterCriteria::new()
            .with_search("x")
            .with_categories("status", empty)
            .with_range("amount", 0.0, 1.0);
        assert_eq!(criteria.active_count(), 2);
        assert!(FilterCriteria::new().is_empty());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Fuzzy".parse::<TextMatchMode>().unwrap(), TextMatchMode::Fuzzy);
        assert!("glob".parse::<TextMatchMode>().is_err());
    }
}
