use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Cancelled,
    Completed,
}

/// A race day runners register for. Ticket types reference it by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarathonEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: Decimal,
    pub status: EventStatus,
}

impl MarathonEvent {
    /// Registration is only offered for published events that have not started yet.
    pub fn is_open_for_registration(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published && self.start_time > now
    }
}
