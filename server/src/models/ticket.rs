use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchasable category of admission to a [`MarathonEvent`](super::MarathonEvent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub quantity_total: u32,
    /// Bumped by the purchase flow after a successful checkout.
    #[serde(default)]
    pub quantity_sold: u32,
    /// Kept in the order the organizer defined them.
    #[serde(default)]
    pub pricing_rules: Vec<PricingRule>,
    #[serde(default)]
    pub visibility_rules: Option<VisibilityRules>,
}

/// Conditional override of a ticket's base price. All bounds are inclusive
/// and an absent bound leaves that side open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub price: Decimal,
    #[serde(default)]
    pub min_purchase: Option<u32>,
    #[serde(default)]
    pub max_purchase: Option<u32>,
    /// The rule stops applying once the parent ticket has sold this many.
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityRules {
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub access_codes: Vec<String>,
    /// Role names allowed to see the ticket. Empty means everyone.
    #[serde(default)]
    pub restricted_to: Vec<String>,
}
