use serde::{Deserialize, Serialize};

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "markup";

/// An agent account with its markup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkupAgent {
    pub id: String,
    pub agent_id: String,
    pub name: String,
    pub user_id: String,
    pub username: String,
    pub settings_count: u32,
}

impl Entity for MarkupAgent {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/markup.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::text("id", |m: &MarkupAgent| m.id.clone()).with_label("No"))
            .field(
                FieldDef::text("agent_id", |m: &MarkupAgent| m.agent_id.clone())
                    .with_label("Agent ID"),
            )
            .field(FieldDef::text("name", |m: &MarkupAgent| m.name.clone()).with_label("Name"))
            .field(
                FieldDef::text("user_id", |m: &MarkupAgent| m.user_id.clone())
                    .with_label("User ID"),
            )
            .field(
                FieldDef::text("username", |m: &MarkupAgent| m.username.clone())
                    .with_label("Username"),
            )
            .field(
                FieldDef::number("settings", |m: &MarkupAgent| f64::from(m.settings_count))
                    .with_label("Settings"),
            )
            .key("id")
            .searchable(["name", "username", "agent_id", "user_id"])
            .range_filter("settings")
            .default_sort("agent_id", SortDirection::Ascending)
            .build()
    }
}
