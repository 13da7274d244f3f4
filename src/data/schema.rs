//! Field registry and per-view configuration.
//!
//! A `ViewConfig` is the only place a view learns about its record type: which
//! fields exist, how each one is read and compared, which of them the search
//! box scans and which filters the view offers. Everything is validated once
//! in `ViewConfigBuilder::build`, so a misspelt field name fails when the view
//! is configured rather than silently matching nothing later.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::data::filter::TextMatchMode;
use crate::data::sort::{SortDirection, SortSpec};
use crate::data::value::{Collation, FieldKind, FieldValue};
use crate::error::ViewError;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Reads one field out of a record
pub type Accessor<R> = Arc<dyn Fn(&R) -> FieldValue + Send + Sync>;

/// A named, typed field of a record type
pub struct FieldDef<R> {
    name: String,
    label: String,
    kind: FieldKind,
    collation: Collation,
    accessor: Accessor<R>,
}

impl<R> Clone for FieldDef<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            label: self.label.clone(),
            kind: self.kind,
            collation: self.collation,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<R> fmt::Debug for FieldDef<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("collation", &self.collation)
            .finish()
    }
}

impl<R> FieldDef<R> {
    pub fn new<F>(name: impl Into<String>, kind: FieldKind, accessor: F) -> Self
    where
        F: Fn(&R) -> FieldValue + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            kind,
            collation: Collation::default(),
            accessor: Arc::new(accessor),
        }
    }

    pub fn text<F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        Self::new(name, FieldKind::Text, move |r| FieldValue::Text(accessor(r)))
    }

    pub fn category<F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> String + Send + Sync + 'static,
    {
        Self::new(name, FieldKind::Category, move |r| {
            FieldValue::Category(accessor(r))
        })
    }

    pub fn number<F>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> f64 + Send + Sync + 'static,
    {
        Self::new(name, FieldKind::Number, move |r| FieldValue::Number(accessor(r)))
    }

    /// A date field. The accessor may return `None` for records without one.
    pub fn date<F, D>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&R) -> D + Send + Sync + 'static,
        D: Into<FieldValue>,
    {
        Self::new(name, FieldKind::Date, move |r| accessor(r).into())
    }

    /// Header text shown for this field
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn collation(&self) -> Collation {
        self.collation
    }

    /// Read this field from a record
    pub fn value(&self, record: &R) -> FieldValue {
        (self.accessor)(record)
    }
}

/// Ordered set of fields for one record type
pub struct Schema<R> {
    fields: Vec<FieldDef<R>>,
}

impl<R> Clone for Schema<R> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.fields.iter()).finish()
    }
}

impl<R> Schema<R> {
    pub fn new(fields: Vec<FieldDef<R>>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef<R>> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[FieldDef<R>] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The kind of filter a view offers on a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Multi-select over a fixed set of values
    Category,
    /// Inclusive numeric range
    Range,
    /// Single day or day range
    Date,
}

impl FilterKind {
    /// Whether a field of the given kind can carry this filter
    pub fn accepts(&self, kind: FieldKind) -> bool {
        match self {
            FilterKind::Category => kind.is_textual(),
            FilterKind::Range => kind == FieldKind::Number,
            FilterKind::Date => kind == FieldKind::Date,
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterKind::Category => "category",
            FilterKind::Range => "range",
            FilterKind::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// A filter offered by a view
#[derive(Debug, Clone, PartialEq)]
pub struct FilterDef {
    pub field: String,
    pub kind: FilterKind,
    /// Known values for category filters, in display order
    pub options: Vec<String>,
}

/// Complete configuration of one tabular view
pub struct ViewConfig<R> {
    name: String,
    schema: Schema<R>,
    key_index: usize,
    search_fields: Vec<String>,
    filters: Vec<FilterDef>,
    default_sort: SortSpec,
    default_page_size: usize,
    search_mode: TextMatchMode,
}

impl<R> Clone for ViewConfig<R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            key_index: self.key_index,
            search_fields: self.search_fields.clone(),
            filters: self.filters.clone(),
            default_sort: self.default_sort.clone(),
            default_page_size: self.default_page_size,
            search_mode: self.search_mode,
        }
    }
}

impl<R> fmt::Debug for ViewConfig<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewConfig")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("key_field", &self.key_field().name)
            .field("search_fields", &self.search_fields)
            .field("filters", &self.filters)
            .field("default_sort", &self.default_sort)
            .field("default_page_size", &self.default_page_size)
            .finish()
    }
}

impl<R> ViewConfig<R> {
    pub fn builder(name: impl Into<String>) -> ViewConfigBuilder<R> {
        ViewConfigBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    pub fn key_field(&self) -> &FieldDef<R> {
        &self.schema.fields[self.key_index]
    }

    pub fn search_fields(&self) -> &[String] {
        &self.search_fields
    }

    pub fn filters(&self) -> &[FilterDef] {
        &self.filters
    }

    pub fn filter(&self, field: &str) -> Option<&FilterDef> {
        self.filters.iter().find(|f| f.field == field)
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    pub fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    pub fn search_mode(&self) -> TextMatchMode {
        self.search_mode
    }

    /// Key of a record, as text
    pub fn record_key(&self, record: &R) -> String {
        self.key_field().value(record).to_string()
    }

    /// Look up a field, reporting an unknown name as a configuration error
    pub fn require_field(&self, name: &str) -> Result<&FieldDef<R>, ViewError> {
        self.schema.field(name).ok_or_else(|| ViewError::UnknownField {
            view: self.name.clone(),
            field: name.to_string(),
        })
    }

    /// Look up a declared filter and check it has the expected kind
    pub fn require_filter(&self, field: &str, kind: FilterKind) -> Result<&FilterDef, ViewError> {
        let filter = self.filter(field).ok_or_else(|| ViewError::UnknownFilter {
            view: self.name.clone(),
            field: field.to_string(),
        })?;
        if filter.kind != kind {
            return Err(ViewError::FilterKindMismatch {
                view: self.name.clone(),
                field: field.to_string(),
                expected: kind,
            });
        }
        Ok(filter)
    }

    /// Apply one collation to every text and category field
    pub fn with_text_collation(mut self, collation: Collation) -> Self {
        for field in &mut self.schema.fields {
            if field.kind.is_textual() {
                field.collation = collation;
            }
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Result<Self, ViewError> {
        if page_size == 0 {
            return Err(ViewError::InvalidPageSize {
                view: self.name.clone(),
            });
        }
        self.default_page_size = page_size;
        Ok(self)
    }

    pub fn with_search_mode(mut self, mode: TextMatchMode) -> Self {
        self.search_mode = mode;
        self
    }
}

/// Builder for `ViewConfig`
pub struct ViewConfigBuilder<R> {
    name: String,
    fields: Vec<FieldDef<R>>,
    key_field: Option<String>,
    search_fields: Vec<String>,
    filters: Vec<FilterDef>,
    default_sort: Option<SortSpec>,
    page_size: usize,
    search_mode: TextMatchMode,
}

impl<R> ViewConfigBuilder<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            key_field: None,
            search_fields: Vec::new(),
            filters: Vec::new(),
            default_sort: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_mode: TextMatchMode::default(),
        }
    }

    pub fn field(mut self, field: FieldDef<R>) -> Self {
        self.fields.push(field);
        self
    }

    /// Field holding the record's stable unique identity
    pub fn key(mut self, field: impl Into<String>) -> Self {
        self.key_field = Some(field.into());
        self
    }

    /// Fields the search box scans
    pub fn searchable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn category_filter<I, S>(mut self, field: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(FilterDef {
            field: field.into(),
            kind: FilterKind::Category,
            options: options.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn range_filter(mut self, field: impl Into<String>) -> Self {
        self.filters.push(FilterDef {
            field: field.into(),
            kind: FilterKind::Range,
            options: Vec::new(),
        });
        self
    }

    pub fn date_filter(mut self, field: impl Into<String>) -> Self {
        self.filters.push(FilterDef {
            field: field.into(),
            kind: FilterKind::Date,
            options: Vec::new(),
        });
        self
    }

    pub fn default_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = Some(SortSpec::new(field, direction));
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn search_mode(mut self, mode: TextMatchMode) -> Self {
        self.search_mode = mode;
        self
    }

    /// Validate every field reference and produce the configuration
    pub fn build(self) -> Result<ViewConfig<R>, ViewError> {
        let view = self.name.clone();
        let unknown = |field: &str| ViewError::UnknownField {
            view: view.clone(),
            field: field.to_string(),
        };

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(ViewError::DuplicateField {
                    view: view.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let schema = Schema::new(self.fields);

        // Without an explicit key the first field identifies records
        let key_field = match self.key_field {
            Some(key) => key,
            None => schema
                .fields()
                .first()
                .map(|f| f.name.clone())
                .ok_or_else(|| unknown("<key>"))?,
        };
        let key_index = schema
            .fields()
            .iter()
            .position(|f| f.name == key_field)
            .ok_or_else(|| unknown(&key_field))?;

        for name in &self.search_fields {
            let field = schema.field(name).ok_or_else(|| unknown(name))?;
            if !field.kind.is_textual() {
                return Err(ViewError::NotSearchable {
                    view: view.clone(),
                    field: name.clone(),
                    kind: field.kind,
                });
            }
        }

        let mut filtered = HashSet::new();
        for filter in &self.filters {
            let field = schema.field(&filter.field).ok_or_else(|| unknown(&filter.field))?;
            if !filter.kind.accepts(field.kind) || !filtered.insert(filter.field.as_str()) {
                return Err(ViewError::FilterKindMismatch {
                    view: view.clone(),
                    field: filter.field.clone(),
                    expected: filter.kind,
                });
            }
        }

        let default_sort = self
            .default_sort
            .unwrap_or_else(|| SortSpec::ascending(key_field.clone()));
        if schema.field(&default_sort.field).is_none() {
            return Err(unknown(&default_sort.field));
        }

        if self.page_size == 0 {
            return Err(ViewError::InvalidPageSize { view });
        }

        debug!(
            target: "view_config",
            "Configured view '{}' with {} fields, {} filters",
            self.name,
            schema.len(),
            self.filters.len()
        );

        Ok(ViewConfig {
            name: self.name,
            schema,
            key_index,
            search_fields: self.search_fields,
            filters: self.filters,
            default_sort,
            default_page_size: self.page_size,
            search_mode: self.search_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Item {
        id: u32,
        name: String,
        price: f64,
    }

    fn builder() -> ViewConfigBuilder<Item> {
        ViewConfig::builder("items")
            .field(FieldDef::number("id", |i: &Item| f64::from(i.id)))
            .field(FieldDef::text("name", |i: &Item| i.name.clone()).with_label("Name"))
            .field(FieldDef::number("price", |i: &Item| i.price))
            .key("id")
    }

    #[test]
    fn test_valid_config() {
        let config = builder()
            .searchable(["name"])
            .range_filter("price")
            .default_sort("name", SortDirection::Ascending)
            .build()
            .unwrap();

        assert_eq!(config.name(), "items");
        assert_eq!(config.schema().field_names(), vec!["id", "name", "price"]);
        assert_eq!(config.schema().field("name").unwrap().label(), "Name");
        assert_eq!(config.default_page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.default_sort().field, "name");

        let item = Item {
            id: 7,
            name: "Widget".to_string(),
            price: 2.5,
        };
        assert_eq!(config.record_key(&item), "7");
    }

    #[test]
    fn test_unknown_search_field_fails_at_build() {
        let err = builder().searchable(["title"]).build().unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_numeric_field_is_not_searchable() {
        let err = builder().searchable(["price"]).build().unwrap_err();
        assert!(matches!(err, ViewError::NotSearchable { .. }));
    }

    #[test]
    fn test_filter_kind_must_match_field() {
        let err = builder().date_filter("price").build().unwrap_err();
        assert!(matches!(
            err,
            ViewError::FilterKindMismatch {
                expected: FilterKind::Date,
                ..
            }
        ));

        let err = builder().range_filter("missing").build().unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { .. }));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = builder()
            .field(FieldDef::text("name", |i: &Item| i.name.clone()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::DuplicateField { .. }));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(matches!(
            builder().page_size(0).build(),
            Err(ViewError::InvalidPageSize { .. })
        ));
    }

    #[test]
    fn test_unknown_default_sort_rejected() {
        let err = builder()
            .default_sort("rating", SortDirection::Descending)
            .build()
            .unwrap_err();
        assert!(matches!(err, ViewError::UnknownField { ref field, .. } if field == "rating"));
    }

    #[test]
    fn test_with_text_collation() {
        let config = builder()
            .build()
            .unwrap()
            .with_text_collation(Collation::CaseSensitive);
        assert_eq!(
            config.schema().field("name").unwrap().collation(),
            Collation::CaseSensitive
        );
    }

    #[test]
    fn test_require_filter_checks_kind() {
        let config = builder().range_filter("price").build().unwrap();
        assert!(config.require_filter("price", FilterKind::Range).is_ok());
        assert!(matches!(
            config.require_filter("price", FilterKind::Category),
            Err(ViewError::FilterKindMismatch { .. })
        ));
        assert!(matches!(
            config.require_filter("name", FilterKind::Category),
            Err(ViewError::UnknownFilter { .. })
        ));
    }
}
