use comfy_table::presets::{ASCII_FULL, UTF8_FULL};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::config::DisplayConfig;
use crate::data::pagination::PageLink;
use crate::data::sort::SortDirection;
use crate::data::summary::DashboardStats;
use crate::data::value::FieldKind;
use crate::data::view::TabularView;

/// How a table is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub use_glyphs: bool,
    pub color: bool,
    pub show_row_numbers: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&DisplayConfig::default())
    }
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            use_glyphs: config.use_glyphs,
            color: config.color,
            show_row_numbers: config.show_row_numbers,
        }
    }
}

impl RenderOptions {
    /// Plain ASCII without colour, for logs and tests
    pub fn plain() -> Self {
        Self {
            use_glyphs: false,
            color: false,
            show_row_numbers: false,
        }
    }

    fn sort_marker(&self, direction: SortDirection) -> &'static str {
        match (self.use_glyphs, direction) {
            (true, SortDirection::Ascending) => "▲",
            (true, SortDirection::Descending) => "▼",
            (false, SortDirection::Ascending) => "^",
            (false, SortDirection::Descending) => "v",
        }
    }

    fn new_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(if self.use_glyphs { UTF8_FULL } else { ASCII_FULL })
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.color {
            table.force_no_tty();
        }
        table
    }

    fn header(&self, text: String) -> Cell {
        let cell = Cell::new(text).add_attribute(Attribute::Bold);
        if self.color {
            cell.fg(Color::Cyan)
        } else {
            cell
        }
    }
}

/// Draw the current page of a view: the table, a "Showing a–b of n" line and
/// the paginator.
pub fn render_snapshot<R>(view: &TabularView<R>, options: &RenderOptions) -> String {
    let snapshot = view.snapshot();
    let fields = view.config().schema().fields();

    let mut table = options.new_table();
    let mut headers = Vec::with_capacity(fields.len() + 1);
    if options.show_row_numbers {
        headers.push(options.header("#".to_string()));
    }
    for field in fields {
        let label = if field.name() == snapshot.sort.field {
            format!("{} {}", field.label(), options.sort_marker(snapshot.sort.direction))
        } else {
            field.label().to_string()
        };
        headers.push(options.header(label));
    }
    table.set_header(headers);

    for (offset, record) in snapshot.items.iter().enumerate() {
        let mut row = Vec::with_capacity(fields.len() + 1);
        if options.show_row_numbers {
            row.push(
                Cell::new(snapshot.first_row + offset).set_alignment(CellAlignment::Right),
            );
        }
        for field in fields {
            let cell = Cell::new(field.value(record).to_string());
            row.push(if field.kind() == FieldKind::Number {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            });
        }
        table.add_row(row);
    }

    let mut out = format!("{table}\n");

    if snapshot.filtered_count == 0 {
        let message = if snapshot.source_count == 0 {
            "No records."
        } else {
            "No records match the current filters."
        };
        if options.color {
            out.push_str(&format!("{}\n", message.yellow()));
        } else {
            out.push_str(message);
            out.push('\n');
        }
    }

    let dash = if options.use_glyphs { "–" } else { "-" };
    let mut footer = format!(
        "Showing {}{}{} of {}",
        snapshot.first_row,
        dash,
        snapshot.last_row(),
        snapshot.filtered_count
    );
    if snapshot.filtered_count < snapshot.source_count {
        footer.push_str(&format!(" (filtered from {})", snapshot.source_count));
    }
    out.push_str(&footer);
    out.push('\n');
    out.push_str(&render_paginator(
        &snapshot.links,
        snapshot.current_page,
        snapshot.total_pages,
        options,
    ));
    out.push('\n');
    out
}

/// The paginator line, e.g. `‹ 1 … 4 [5] 6 … 12 ›`. The current page is
/// bracketed; the arrows only appear when there is a page to move to.
pub fn render_paginator(
    links: &[PageLink],
    current: usize,
    total: usize,
    options: &RenderOptions,
) -> String {
    let (prev, next, gap) = if options.use_glyphs {
        ("‹", "›", "…")
    } else {
        ("<", ">", "...")
    };

    let mut parts: Vec<String> = Vec::with_capacity(links.len() + 2);
    if current > 1 {
        parts.push(prev.to_string());
    }
    for link in links {
        parts.push(match link {
            PageLink::Page(page) if *page == current => format!("[{}]", page),
            PageLink::Page(page) => page.to_string(),
            PageLink::Ellipsis => gap.to_string(),
        });
    }
    if current < total {
        parts.push(next.to_string());
    }
    parts.join(" ")
}

/// Format a currency amount as `$12,345.67`
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Draw the dashboard figures and the revenue split by booking status
pub fn render_dashboard(stats: &DashboardStats, options: &RenderOptions) -> String {
    let mut figures = options.new_table();
    figures.set_header(vec![
        options.header("Metric".to_string()),
        options.header("Value".to_string()),
    ]);
    figures.add_row(vec![
        Cell::new("Total Bookings"),
        Cell::new(stats.total_bookings).set_alignment(CellAlignment::Right),
    ]);
    figures.add_row(vec![
        Cell::new("Booking Revenue"),
        Cell::new(format_money(stats.booking_revenue)).set_alignment(CellAlignment::Right),
    ]);
    figures.add_row(vec![
        Cell::new("Active Agents"),
        Cell::new(format!("{} / {}", stats.active_agents, stats.total_agents))
            .set_alignment(CellAlignment::Right),
    ]);
    figures.add_row(vec![
        Cell::new("Pending Payments"),
        Cell::new(format_money(stats.pending_payments)).set_alignment(CellAlignment::Right),
    ]);

    let mut by_status = options.new_table();
    by_status.set_header(vec![
        options.header("Booking Status".to_string()),
        options.header("Revenue".to_string()),
    ]);
    for (status, revenue) in &stats.revenue_by_status {
        by_status.add_row(vec![
            Cell::new(status),
            Cell::new(format_money(*revenue)).set_alignment(CellAlignment::Right),
        ]);
    }

    format!("{figures}\n{by_status}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Agent, Booking, Entity, Payment};
    use PageLink::{Ellipsis, Page};

    #[test]
    fn test_paginator_glyphs() {
        let links = vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(12)];
        let glyphs = RenderOptions::default();
        assert_eq!(
            render_paginator(&links, 5, 12, &glyphs),
            "‹ 1 … 4 [5] 6 … 12 ›"
        );
        assert_eq!(
            render_paginator(&links, 5, 12, &RenderOptions::plain()),
            "< 1 ... 4 [5] 6 ... 12 >"
        );
    }

    #[test]
    fn test_paginator_single_page_has_no_arrows() {
        assert_eq!(
            render_paginator(&[Page(1)], 1, 1, &RenderOptions::plain()),
            "[1]"
        );
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(780.5), "$780.50");
        assert_eq!(format_money(15350.0), "$15,350.00");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_render_marks_sort_column() {
        let mut view = Agent::sample_view().unwrap();
        let out = render_snapshot(&view, &RenderOptions::plain());
        assert!(out.contains("Name ^"));
        assert!(out.contains("Showing 1-5 of 5"));

        view.sort_by("revenue").unwrap();
        view.sort_by("revenue").unwrap();
        let out = render_snapshot(&view, &RenderOptions::plain());
        assert!(out.contains("Revenue v"));
        assert!(!out.contains("Name ^"));
    }

    #[test]
    fn test_render_filtered_footer() {
        let mut view = Booking::sample_view().unwrap();
        view.set_page_size(2).unwrap();
        view.toggle_category("status", "cancelled").unwrap();
        view.toggle_category("status", "pending").unwrap();
        let out = render_snapshot(&view, &RenderOptions::plain());
        assert!(out.contains("Showing 1-2 of 3 (filtered from 5)"));
        assert!(out.ends_with("[1] 2 >\n"));
    }

    #[test]
    fn test_render_empty_result() {
        let mut view = Booking::sample_view().unwrap();
        view.set_search("atlantis").unwrap();
        let out = render_snapshot(&view, &RenderOptions::plain());
        assert!(out.contains("No records match the current filters."));
        assert!(out.contains("Showing 0-0 of 0 (filtered from 5)"));
    }

    #[test]
    fn test_render_row_numbers() {
        let mut view = Agent::sample_view().unwrap();
        view.set_page_size(2).unwrap();
        view.last_page();
        let options = RenderOptions {
            show_row_numbers: true,
            ..RenderOptions::plain()
        };
        let out = render_snapshot(&view, &options);
        assert!(out.contains("| 5 "));
        assert!(out.contains("Robert Johnson"));
    }

    #[test]
    fn test_render_dashboard() {
        let stats = DashboardStats::from_views(
            &Booking::sample_view().unwrap(),
            &Agent::sample_view().unwrap(),
            &Payment::sample_view().unwrap(),
        )
        .unwrap();
        let out = render_dashboard(&stats, &RenderOptions::plain());
        assert!(out.contains("$15,350.00"));
        assert!(out.contains("4 / 5"));
        assert!(out.contains("pending"));
    }
}
