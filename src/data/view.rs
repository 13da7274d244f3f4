use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::data::filter::{
    apply_filters, DatePredicate, FilterCriteria, FilterPlan, NumericRange, TextMatchMode,
};
use crate::data::pagination::{page_links, total_pages, PageLink, PageSpec, DEFAULT_LINK_RADIUS};
use crate::data::schema::{FilterKind, ViewConfig};
use crate::data::sort::{apply_sort, SortSpec};
use chrono::NaiveDate;

use crate::error::ViewError;

/// A controller over an immutable record set that filters, sorts and pages
/// it without modifying the underlying data.
///
/// Every mutation re-derives the ordered row list from the full source, so
/// filters never compound on an already filtered subset. The current page is
/// sliced out of that list on read.
pub struct TabularView<R> {
    /// The underlying immutable data source
    source: Arc<[R]>,

    config: Arc<ViewConfig<R>>,

    criteria: FilterCriteria,
    sort: SortSpec,
    page: PageSpec,
    link_radius: usize,

    /// Source indices after filtering and sorting
    visible_rows: Vec<usize>,
}

/// Everything a presentation layer needs to draw one page of a view
#[derive(Debug)]
pub struct ViewSnapshot<'a, R> {
    pub items: Vec<&'a R>,
    /// 1-based position of the first item within the filtered rows, 0 when empty
    pub first_row: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub filtered_count: usize,
    pub source_count: usize,
    pub sort: &'a SortSpec,
    pub links: Vec<PageLink>,
}

impl<'a, R> ViewSnapshot<'a, R> {
    /// 1-based position of the last item on the page, 0 when empty
    pub fn last_row(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_row + self.items.len() - 1
        }
    }
}

impl<R> TabularView<R> {
    /// Create a view showing all records in the config's default order
    pub fn new(
        source: impl Into<Arc<[R]>>,
        config: impl Into<Arc<ViewConfig<R>>>,
    ) -> Result<Self, ViewError> {
        let config = config.into();
        let source = source.into();
        ensure_unique_keys(&source, &config)?;

        let criteria = FilterCriteria::new().with_search_mode(config.search_mode());
        let mut view = Self {
            sort: config.default_sort().clone(),
            page: PageSpec::new(config.default_page_size()),
            link_radius: DEFAULT_LINK_RADIUS,
            visible_rows: Vec::new(),
            criteria,
            source,
            config,
        };
        view.refresh()?;
        Ok(view)
    }

    pub fn config(&self) -> &ViewConfig<R> {
        &self.config
    }

    pub fn name(&self) -> &str {
        self.config.name()
    }

    pub fn source(&self) -> &[R] {
        &self.source
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_spec(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page_spec(&self) -> &PageSpec {
        &self.page
    }

    /// Replace the record snapshot and re-derive everything from it
    pub fn set_source(&mut self, source: impl Into<Arc<[R]>>) -> Result<(), ViewError> {
        let source = source.into();
        ensure_unique_keys(&source, &self.config)?;
        self.source = source;
        self.refresh()
    }

    // ---- search ----

    pub fn set_search(&mut self, query: impl Into<String>) -> Result<(), ViewError> {
        let query = query.into();
        self.update_criteria(|c| c.search = query)
    }

    pub fn set_search_mode(&mut self, mode: TextMatchMode) -> Result<(), ViewError> {
        self.update_criteria(|c| c.search_mode = mode)
    }

    // ---- category filters ----

    /// Select or deselect one value of a category filter. Deselecting the last
    /// value leaves an empty selection, which accepts every value.
    pub fn toggle_category(&mut self, field: &str, value: &str) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Category)?;
        self.update_criteria(|c| {
            let selected = c.categories.entry(field.to_string()).or_default();
            if !selected.remove(value) {
                selected.insert(value.to_string());
            }
        })
    }

    pub fn set_categories<I, S>(&mut self, field: &str, values: I) -> Result<(), ViewError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.require_filter(field, FilterKind::Category)?;
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        self.update_criteria(|c| {
            c.categories.insert(field.to_string(), values);
        })
    }

    pub fn clear_category(&mut self, field: &str) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Category)?;
        self.update_criteria(|c| {
            c.categories.remove(field);
        })
    }

    // ---- numeric ranges ----

    pub fn set_range(&mut self, field: &str, min: f64, max: f64) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Range)?;
        self.update_criteria(|c| {
            c.ranges.insert(field.to_string(), NumericRange::new(min, max));
        })
    }

    pub fn clear_range(&mut self, field: &str) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Range)?;
        self.update_criteria(|c| {
            c.ranges.remove(field);
        })
    }

    // ---- dates ----

    pub fn set_date_on(&mut self, field: &str, day: NaiveDate) -> Result<(), ViewError> {
        self.set_date(field, DatePredicate::On(day))
    }

    pub fn set_date_between(
        &mut self,
        field: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), ViewError> {
        self.set_date(field, DatePredicate::Between { from, to })
    }

    pub fn set_date(&mut self, field: &str, predicate: DatePredicate) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Date)?;
        self.update_criteria(|c| {
            c.dates.insert(field.to_string(), predicate);
        })
    }

    pub fn clear_date(&mut self, field: &str) -> Result<(), ViewError> {
        self.config.require_filter(field, FilterKind::Date)?;
        self.update_criteria(|c| {
            c.dates.remove(field);
        })
    }

    /// Drop every predicate, keeping the search mode
    pub fn clear_filters(&mut self) -> Result<(), ViewError> {
        self.update_criteria(|c| *c = FilterCriteria::new().with_search_mode(c.search_mode))
    }

    // ---- sorting ----

    /// Header click: same field flips direction, a new field sorts ascending
    pub fn sort_by(&mut self, field: &str) -> Result<(), ViewError> {
        let next = self.sort.toggled(field);
        self.set_sort(next)
    }

    pub fn set_sort(&mut self, spec: SortSpec) -> Result<(), ViewError> {
        self.config.require_field(&spec.field)?;
        self.sort = spec;
        self.refresh()
    }

    // ---- paging ----

    /// Change the page size and return to page 1
    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), ViewError> {
        if page_size == 0 {
            return Err(ViewError::InvalidPageSize {
                view: self.config.name().to_string(),
            });
        }
        self.page.set_page_size(page_size);
        Ok(())
    }

    /// Number of paginator links kept either side of the current page
    pub fn set_link_radius(&mut self, radius: usize) {
        self.link_radius = radius;
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.page.go_to(page, total);
        trace!(target: "view", "{}: page {}/{}", self.name(), self.page.current_page(), total);
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.total_pages();
        self.page.next(total)
    }

    pub fn previous_page(&mut self) -> bool {
        self.page.previous()
    }

    pub fn first_page(&mut self) {
        self.page.first();
    }

    pub fn last_page(&mut self) {
        let total = self.total_pages();
        self.page.last(total);
    }

    // ---- reads ----

    pub fn total_pages(&self) -> usize {
        total_pages(self.visible_rows.len(), self.page.page_size())
    }

    pub fn current_page(&self) -> usize {
        self.page.current_page()
    }

    /// Number of records passing the filters
    pub fn filtered_count(&self) -> usize {
        self.visible_rows.len()
    }

    /// All filtered records in sort order
    pub fn filtered(&self) -> impl Iterator<Item = &R> + '_ {
        self.visible_rows.iter().map(move |&idx| &self.source[idx])
    }

    /// Source indices of the filtered records in sort order
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    /// Records on the current page
    pub fn page_items(&self) -> Vec<&R> {
        let (start, end) = self.page.bounds(self.visible_rows.len());
        self.visible_rows[start..end]
            .iter()
            .map(|&idx| &self.source[idx])
            .collect()
    }

    pub fn snapshot(&self) -> ViewSnapshot<'_, R> {
        let (start, _) = self.page.bounds(self.visible_rows.len());
        let items = self.page_items();
        let total = self.total_pages();
        ViewSnapshot {
            first_row: if items.is_empty() { 0 } else { start + 1 },
            items,
            current_page: self.page.current_page(),
            total_pages: total,
            page_size: self.page.page_size(),
            filtered_count: self.visible_rows.len(),
            source_count: self.source.len(),
            sort: &self.sort,
            links: page_links(total, self.page.current_page(), self.link_radius),
        }
    }

    /// Find a record by key, whether or not it passes the current filters
    pub fn find(&self, key: &str) -> Option<&R> {
        self.source
            .iter()
            .find(|record| self.config.record_key(record) == key)
    }

    pub fn record_key(&self, record: &R) -> String {
        self.config.record_key(record)
    }

    // Private helper methods

    /// Validate the changed criteria before committing them, so a bad regex or
    /// field name leaves the view exactly as it was.
    fn update_criteria<F>(&mut self, change: F) -> Result<(), ViewError>
    where
        F: FnOnce(&mut FilterCriteria),
    {
        let mut next = self.criteria.clone();
        change(&mut next);
        let plan = FilterPlan::compile(&self.config, &next)?;
        self.criteria = next;
        self.rederive(&plan);
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), ViewError> {
        let plan = FilterPlan::compile(&self.config, &self.criteria)?;
        self.rederive(&plan);
        Ok(())
    }

    fn rederive(&mut self, plan: &FilterPlan<R>) {
        let mut rows = apply_filters(&self.source, plan);
        if let Some(field) = self.config.schema().field(&self.sort.field) {
            apply_sort(&self.source, &mut rows, field, self.sort.direction);
        }
        self.visible_rows = rows;

        let total = self.total_pages();
        self.page.clamp(total);

        debug!(
            target: "view",
            "{}: {} of {} rows visible, sorted by {}, page {}/{}",
            self.config.name(),
            self.visible_rows.len(),
            self.source.len(),
            self.sort,
            self.page.current_page(),
            total
        );
    }
}

fn ensure_unique_keys<R>(records: &[R], config: &ViewConfig<R>) -> Result<(), ViewError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let key = config.record_key(record);
        if !seen.insert(key.clone()) {
            return Err(ViewError::DuplicateKey {
                view: config.name().to_string(),
                key,
            });
        }
    }
    Ok(())
}
