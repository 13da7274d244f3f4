use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "agents";

/// Offices an agent can be based at
pub const LOCATIONS: &[&str] = &["New York", "London", "Tokyo", "Sydney"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Inactive,
}

impl AgentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Active => "active",
            AgentStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A travel agent selling on behalf of the agency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub status: AgentStatus,
    pub bookings: u32,
    pub revenue: f64,
}

impl Entity for Agent {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/agents.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::text("id", |a: &Agent| a.id.clone()).with_label("ID"))
            .field(FieldDef::text("name", |a: &Agent| a.name.clone()).with_label("Name"))
            .field(FieldDef::text("email", |a: &Agent| a.email.clone()).with_label("Email"))
            .field(
                FieldDef::category("location", |a: &Agent| a.location.clone())
                    .with_label("Location"),
            )
            .field(
                FieldDef::category("status", |a: &Agent| a.status.to_string())
                    .with_label("Status"),
            )
            .field(
                FieldDef::number("bookings", |a: &Agent| f64::from(a.bookings))
                    .with_label("Bookings"),
            )
            .field(FieldDef::number("revenue", |a: &Agent| a.revenue).with_label("Revenue"))
            .key("id")
            .searchable(["name", "email"])
            .category_filter("status", ["active", "inactive"])
            .category_filter("location", LOCATIONS.iter().copied())
            .range_filter("bookings")
            .range_filter("revenue")
            .default_sort("name", SortDirection::Ascending)
            .build()
    }
}
