//! Ticket price resolution.
//!
//! A ticket has a base price and an ordered list of [`PricingRule`]s. At most
//! one rule applies to a purchase: among the rules whose date window, quantity
//! window and sales cap all admit the purchase, the cheapest one wins. Ties go
//! to the rule defined first.

pub mod visibility;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::{PricingRule, TicketType};

pub use visibility::{
    is_sold_out, is_visible, is_visible_to, remaining_quantity, requires_access_code,
    validate_access_code,
};

/// Unit price for a purchase and the rule that produced it, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub unit_price: Decimal,
    pub applied_rule: Option<PricingRule>,
}

/// Price breakdown for displaying a purchase of `quantity` tickets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub applied_rule: Option<PricingRule>,
}

pub fn resolve_price(ticket: &TicketType, quantity: u32, now: DateTime<Utc>) -> ResolvedPrice {
    let best = ticket
        .pricing_rules
        .iter()
        .filter(|rule| rule_applies(rule, ticket.quantity_sold, quantity, now))
        // min_by keeps the first of equal elements
        .min_by(|a, b| a.price.cmp(&b.price));

    match best {
        Some(rule) => {
            debug!(
                ticket_id = %ticket.id,
                quantity,
                price = %rule.price,
                rule = rule.name.as_deref().unwrap_or("unnamed"),
                "Pricing rule applied"
            );
            ResolvedPrice {
                unit_price: rule.price,
                applied_rule: Some(rule.clone()),
            }
        }
        None => ResolvedPrice {
            unit_price: ticket.base_price,
            applied_rule: None,
        },
    }
}

/// `None` when the total does not fit in a [`Decimal`].
pub fn resolve_total(
    ticket: &TicketType,
    quantity: u32,
    now: DateTime<Utc>,
) -> Option<PriceQuote> {
    let ResolvedPrice {
        unit_price,
        applied_rule,
    } = resolve_price(ticket, quantity, now);

    let total_price = unit_price.checked_mul(Decimal::from(quantity))?;

    Some(PriceQuote {
        quantity,
        unit_price,
        total_price,
        applied_rule,
    })
}

fn rule_applies(rule: &PricingRule, quantity_sold: u32, quantity: u32, now: DateTime<Utc>) -> bool {
    within_dates(rule.start_date, rule.end_date, now)
        && rule.min_purchase.map_or(true, |min| quantity >= min)
        && rule.max_purchase.map_or(true, |max| quantity <= max)
        && rule.quantity.map_or(true, |cap| quantity_sold < cap)
}

/// Inclusive on both ends; a missing bound is unbounded.
pub(crate) fn within_dates(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    start.map_or(true, |start| now >= start) && end.map_or(true, |end| now <= end)
}
