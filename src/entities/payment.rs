use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "payments";

pub const METHODS: &[&str] = &["Credit Card", "Debit Card", "PayPal", "Bank Transfer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Success,
    Failed,
    Pending,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "Success",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment transaction against a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub method: String,
    pub status: PaymentStatus,
    pub payer: String,
}

impl Entity for Payment {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/payments.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(
                FieldDef::text("id", |p: &Payment| p.id.clone()).with_label("Transaction ID"),
            )
            .field(FieldDef::date("date", |p: &Payment| p.date).with_label("Date"))
            .field(FieldDef::number("amount", |p: &Payment| p.amount).with_label("Amount"))
            .field(
                FieldDef::category("method", |p: &Payment| p.method.clone())
                    .with_label("Payment Method"),
            )
            .field(
                FieldDef::category("status", |p: &Payment| p.status.to_string())
                    .with_label("Status"),
            )
            .field(FieldDef::text("payer", |p: &Payment| p.payer.clone()).with_label("Payer"))
            .key("id")
            .searchable(["id", "payer", "method"])
            .category_filter("status", ["Success", "Failed", "Pending"])
            .category_filter("method", METHODS.iter().copied())
            .date_filter("date")
            .range_filter("amount")
            .default_sort("date", SortDirection::Descending)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(view: &crate::data::view::TabularView<Payment>) -> Vec<&str> {
        view.filtered().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_newest_first_with_stable_ties() {
        let view = Payment::sample_view().unwrap();
        // TX-002 and TX-003 share a date and keep their source order
        assert_eq!(ids(&view), vec!["TX-001", "TX-002", "TX-003", "TX-004", "TX-005"]);
    }

    #[test]
    fn test_payments_on_a_day() {
        let mut view = Payment::sample_view().unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 4, 22).unwrap();
        view.set_date_on("date", day).unwrap();
        assert_eq!(ids(&view), vec!["TX-002", "TX-003"]);
    }

    #[test]
    fn test_search_transaction_id() {
        let mut view = Payment::sample_view().unwrap();
        view.set_search("tx-004").unwrap();
        assert_eq!(ids(&view), vec!["TX-004"]);
    }
}
