//! Aggregates over a view's filtered records, used by the dashboard.

use serde::Serialize;

use crate::data::schema::FieldDef;
use crate::data::view::TabularView;
use crate::entities::{Agent, AgentStatus, Booking, Payment, PaymentStatus};
use crate::error::ViewError;

/// Sum a numeric field. Nulls and non-numeric values count as zero.
pub fn sum<'a, R: 'a>(records: impl IntoIterator<Item = &'a R>, field: &FieldDef<R>) -> f64 {
    records
        .into_iter()
        .filter_map(|r| field.value(r).as_number())
        .sum()
}

/// Count records per value of a field, in first-seen order
pub fn count_by<'a, R: 'a>(
    records: impl IntoIterator<Item = &'a R>,
    field: &FieldDef<R>,
) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let key = field.value(record).to_string();
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
}

/// Sum `value_field` per value of `group_field`, in first-seen order
pub fn sum_by<'a, R: 'a>(
    records: impl IntoIterator<Item = &'a R>,
    group_field: &FieldDef<R>,
    value_field: &FieldDef<R>,
) -> Vec<(String, f64)> {
    let mut sums: Vec<(String, f64)> = Vec::new();
    for record in records {
        let key = group_field.value(record).to_string();
        let amount = value_field.value(record).as_number().unwrap_or(0.0);
        match sums.iter_mut().find(|(k, _)| *k == key) {
            Some((_, total)) => *total += amount,
            None => sums.push((key, amount)),
        }
    }
    sums
}

/// Headline figures for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_bookings: usize,
    pub booking_revenue: f64,
    pub active_agents: usize,
    pub total_agents: usize,
    pub pending_payments: f64,
    pub revenue_by_status: Vec<(String, f64)>,
}

impl DashboardStats {
    /// Compute the figures over each view's filtered records, so narrowing a
    /// view narrows the dashboard with it.
    pub fn from_views(
        bookings: &TabularView<Booking>,
        agents: &TabularView<Agent>,
        payments: &TabularView<Payment>,
    ) -> Result<Self, ViewError> {
        let booking_config = bookings.config();
        let amount = booking_config.require_field("amount")?;
        let status = booking_config.require_field("status")?;

        let pending_payments = payments
            .filtered()
            .filter(|p| p.status == PaymentStatus::Pending)
            .map(|p| p.amount)
            .sum();

        Ok(Self {
            total_bookings: bookings.filtered_count(),
            booking_revenue: sum(bookings.filtered(), amount),
            active_agents: agents
                .filtered()
                .filter(|a| a.status == AgentStatus::Active)
                .count(),
            total_agents: agents.filtered_count(),
            pending_payments,
            revenue_by_status: sum_by(bookings.filtered(), status, amount),
        })
    }
}
