use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::schema::{FieldDef, ViewConfig};
use crate::data::sort::SortDirection;
use crate::data::value::flexible_datetime;
use crate::entities::Entity;
use crate::error::ViewError;

pub const VIEW_NAME: &str = "users";

pub const ROLES: &[&str] = &["Admin", "Finance", "Support Agent", "Agent Manager"];

/// A back-office staff account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(with = "flexible_datetime")]
    pub last_login: NaiveDateTime,
}

impl Entity for User {
    const VIEW_NAME: &'static str = VIEW_NAME;
    const SAMPLE_JSON: &'static str = include_str!("../../data/users.json");

    fn view_config() -> Result<ViewConfig<Self>, ViewError> {
        ViewConfig::builder(VIEW_NAME)
            .field(FieldDef::number("id", |u: &User| f64::from(u.id)).with_label("ID"))
            .field(FieldDef::text("name", |u: &User| u.name.clone()).with_label("Name"))
            .field(FieldDef::text("email", |u: &User| u.email.clone()).with_label("Email"))
            .field(FieldDef::category("role", |u: &User| u.role.clone()).with_label("Role"))
            .field(
                FieldDef::date("last_login", |u: &User| u.last_login).with_label("Last Login"),
            )
            .key("id")
            .searchable(["name", "email"])
            .category_filter("role", ROLES.iter().copied())
            .date_filter("last_login")
            .default_sort("name", SortDirection::Ascending)
            .build()
    }
}
