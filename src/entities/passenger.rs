use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "passengers";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoyaltyTier {
    Gold,
    Silver,
    Standard,
}

impl LoyaltyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTier::Gold => "Gold",
            LoyaltyTier::Silver => "Silver",
            LoyaltyTier::Standard => "Standard",
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub loyalty: LoyaltyTier,
    pub last_booking: NaiveDate,
}

impl Entity for Passenger {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/passengers.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::number("id", |p: &Passenger| f64::from(p.id)).with_label("ID"))
            .field(FieldDef::text("name", |p: &Passenger| p.name.clone()).with_label("Name"))
            .field(FieldDef::text("email", |p: &Passenger| p.email.clone()).with_label("Email"))
            .field(FieldDef::text("phone", |p: &Passenger| p.phone.clone()).with_label("Phone"))
            .field(
                FieldDef::category("loyalty", |p: &Passenger| p.loyalty.to_string())
                    .with_label("Loyalty Tier"),
            )
            .field(
                FieldDef::date("last_booking", |p: &Passenger| p.last_booking)
                    .with_label("Last Booking"),
            )
            .key("id")
            .searchable(["name", "email", "phone"])
            .category_filter("loyalty", ["Gold", "Silver", "Standard"])
            .date_filter("last_booking")
            .default_sort("name", SortDirection::Ascending)
            .build()
    }
}
