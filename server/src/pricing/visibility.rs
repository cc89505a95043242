//! Gating rules deciding whether a ticket is offered to a viewer.

use chrono::{DateTime, Utc};

use super::within_dates;
use crate::models::TicketType;

/// Visibility for an anonymous viewer. Role-restricted tickets are reported
/// as hidden since no role is known; use [`is_visible_to`] when it is.
pub fn is_visible(ticket: &TicketType, now: DateTime<Utc>) -> bool {
    is_visible_to(ticket, now, None)
}

pub fn is_visible_to(ticket: &TicketType, now: DateTime<Utc>, role: Option<&str>) -> bool {
    let Some(rules) = &ticket.visibility_rules else {
        return true;
    };

    if !within_dates(rules.start_date, rules.end_date, now) {
        return false;
    }

    if rules.restricted_to.is_empty() {
        return true;
    }

    match role.map(str::trim) {
        Some(role) => rules
            .restricted_to
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(role)),
        None => false,
    }
}

pub fn requires_access_code(ticket: &TicketType) -> bool {
    ticket
        .visibility_rules
        .as_ref()
        .is_some_and(|rules| !rules.access_codes.is_empty())
}

/// Case-insensitive, whitespace-trimmed match against the configured codes.
/// Always true when the ticket has no codes.
pub fn validate_access_code(ticket: &TicketType, code: &str) -> bool {
    let Some(rules) = &ticket.visibility_rules else {
        return true;
    };
    if rules.access_codes.is_empty() {
        return true;
    }

    let candidate = code.trim().to_lowercase();
    rules
        .access_codes
        .iter()
        .any(|configured| configured.trim().to_lowercase() == candidate)
}

pub fn remaining_quantity(ticket: &TicketType) -> u32 {
    ticket.quantity_total.saturating_sub(ticket.quantity_sold)
}

pub fn is_sold_out(ticket: &TicketType) -> bool {
    remaining_quantity(ticket) == 0
}
