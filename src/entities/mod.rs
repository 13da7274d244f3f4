//! Record types of the back office and the view each one is shown in.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::data::loader::parse_records;
use crate::data::schema::ViewConfig;
use crate::data::view::TabularView;
use crate::error::ViewError;

pub mod agent;
pub mod booking;
pub mod markup;
pub mod passenger;
pub mod payment;
pub mod role;
pub mod user;

pub use agent::{Agent, AgentStatus};
pub use booking::{Booking, BookingStatus};
pub use markup::MarkupAgent;
pub use passenger::{LoyaltyTier, Passenger};
pub use payment::{Payment, PaymentStatus};
pub use role::Role;
pub use user::User;

/// Names accepted wherever a view is chosen by name
pub const VIEW_NAMES: &[&str] = &[
    agent::VIEW_NAME,
    booking::VIEW_NAME,
    passenger::VIEW_NAME,
    payment::VIEW_NAME,
    user::VIEW_NAME,
    role::VIEW_NAME,
    markup::VIEW_NAME,
];

/// A record type with a table view of its own
pub trait Entity: DeserializeOwned + Sized + 'static {
    /// Name of the view, also the stem of its data file
    const VIEW_NAME: &'static str;

    /// Built-in records as a JSON array
    const SAMPLE_JSON: &'static str;

    fn view_config() -> Result<ViewConfig<Self>, ViewError>;

    fn sample_records() -> Result<Vec<Self>> {
        parse_records(Self::SAMPLE_JSON)
            .with_context(|| format!("Built-in {} records are invalid", Self::VIEW_NAME))
    }

    /// A view over the built-in records
    fn sample_view() -> Result<TabularView<Self>> {
        let view = TabularView::new(Self::sample_records()?, Self::view_config()?)?;
        Ok(view)
    }
}
