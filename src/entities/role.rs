use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "roles";

/// A permission role and how many users hold it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub users_count: u32,
    pub last_updated: NaiveDate,
}

impl Entity for Role {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/roles.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::number("id", |r: &Role| f64::from(r.id)).with_label("ID"))
            .field(FieldDef::text("name", |r: &Role| r.name.clone()).with_label("Role Name"))
            .field(
                FieldDef::text("description", |r: &Role| r.description.clone())
                    .with_label("Description"),
            )
            .field(
                FieldDef::number("users", |r: &Role| f64::from(r.users_count)).with_label("Users"),
            )
            .field(
                FieldDef::date("last_updated", |r: &Role| r.last_updated)
                    .with_label("Last Updated"),
            )
            .key("id")
            .searchable(["name", "description"])
            .range_filter("users")
            .date_filter("last_updated")
            .default_sort("name", SortDirection::Ascending)
            .build()
    }
}
