use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::data::view::TabularView;

/// Which rows of a view an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Only the records on the current page
    #[default]
    CurrentPage,
    /// Every record passing the filters, in sort order
    AllFiltered,
}

/// Write a view as CSV: one header row of field labels, then one row per
/// record in view order. Returns the number of records written.
pub fn export_csv<R, W: Write>(
    view: &TabularView<R>,
    writer: W,
    scope: ExportScope,
) -> Result<usize> {
    let fields = view.config().schema().fields();
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(fields.iter().map(|f| f.label()))?;

    let records: Vec<&R> = match scope {
        ExportScope::CurrentPage => view.page_items(),
        ExportScope::AllFiltered => view.filtered().collect(),
    };

    for record in &records {
        wtr.write_record(fields.iter().map(|f| f.value(record).to_string()))?;
    }

    wtr.flush()?;
    Ok(records.len())
}

/// Export a view to a CSV file
pub fn export_csv_to_path<R>(
    view: &TabularView<R>,
    path: impl AsRef<Path>,
    scope: ExportScope,
) -> Result<usize> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let count = export_csv(view, file, scope)
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    info!(
        target: "export",
        "Exported {} {} rows to {}",
        count,
        view.name(),
        path.display()
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{FieldDef, ViewConfig};
    use crate::data::sort::SortDirection;

    struct Txn {
        id: &'static str,
        payer: &'static str,
        amount: f64,
    }

    fn view(page_size: usize) -> TabularView<Txn> {
        let config = ViewConfig::builder("payments")
            .field(FieldDef::text("id", |t: &Txn| t.id.to_string()).with_label("Transaction ID"))
            .field(FieldDef::text("payer", |t: &Txn| t.payer.to_string()).with_label("Payer"))
            .field(FieldDef::number("amount", |t: &Txn| t.amount).with_label("Amount"))
            .searchable(["payer"])
            .default_sort("amount", SortDirection::Descending)
            .page_size(page_size)
            .build()
            .unwrap();
        let records = vec![
            Txn {
                id: "TX-001",
                payer: "Doe, John",
                amount: 1250.0,
            },
            Txn {
                id: "TX-002",
                payer: "Jane Smith",
                amount: 780.5,
            },
            Txn {
                id: "TX-003",
                payer: "Bob Johnson",
                amount: 325.75,
            },
        ];
        TabularView::new(records, config).unwrap()
    }

    fn export(view: &TabularView<Txn>, scope: ExportScope) -> (usize, String) {
        let mut out = Vec::new();
        let count = export_csv(view, &mut out, scope).unwrap();
        (count, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_export_current_page() {
        let (count, csv) = export(&view(2), ExportScope::CurrentPage);
        assert_eq!(count, 2);
        assert_eq!(
            csv,
            "Transaction ID,Payer,Amount\nTX-001,\"Doe, John\",1250\nTX-002,Jane Smith,780.5\n"
        );
    }

    #[test]
    fn test_export_all_filtered_ignores_paging() {
        let mut v = view(2);
        v.set_search("o").unwrap();
        let (count, csv) = export(&v, ExportScope::AllFiltered);
        assert_eq!(count, 2);
        assert!(csv.ends_with("TX-003,Bob Johnson,325.75\n"));
        assert!(!csv.contains("Jane Smith"));
    }

    #[test]
    fn test_export_empty_view_writes_header() {
        let mut v = view(2);
        v.set_search("nobody").unwrap();
        let (count, csv) = export(&v, ExportScope::AllFiltered);
        assert_eq!(count, 0);
        assert_eq!(csv, "Transaction ID,Payer,Amount\n");
    }
}
