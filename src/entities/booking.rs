use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "bookings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Pending => "pending",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub reference: String,
    pub passenger_name: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: BookingStatus,
    pub amount: f64,
}

impl Booking {
    /// Length of the trip in nights
    pub fn nights(&self) -> i64 {
        (self.return_date - self.departure_date).num_days()
    }
}

impl Entity for Booking {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/bookings.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::text("id", |b: &Booking| b.id.clone()).with_label("ID"))
            .field(
                FieldDef::text("reference", |b: &Booking| b.reference.clone())
                    .with_label("Reference"),
            )
            .field(
                FieldDef::text("passenger", |b: &Booking| b.passenger_name.clone())
                    .with_label("Passenger"),
            )
            .field(
                FieldDef::text("destination", |b: &Booking| b.destination.clone())
                    .with_label("Destination"),
            )
            .field(
                FieldDef::date("departure", |b: &Booking| b.departure_date)
                    .with_label("Departure"),
            )
            .field(FieldDef::date("return", |b: &Booking| b.return_date).with_label("Return"))
            .field(
                FieldDef::number("nights", |b: &Booking| b.nights() as f64).with_label("Nights"),
            )
            .field(
                FieldDef::category("status", |b: &Booking| b.status.to_string())
                    .with_label("Status"),
            )
            .field(FieldDef::number("amount", |b: &Booking| b.amount).with_label("Amount"))
            .key("id")
            .searchable(["reference", "passenger", "destination"])
            .category_filter("status", ["confirmed", "pending", "cancelled"])
            .date_filter("departure")
            .range_filter("amount")
            .range_filter("nights")
            .default_sort("departure", SortDirection::Ascending)
            .build()
    }
}
