use axum::extract::rejection::JsonRejection;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::TicketType;
use crate::pricing::{
    is_sold_out, is_visible_to, remaining_quantity, requires_access_code, resolve_total,
    validate_access_code,
};
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub ticket_type: TicketType,
    pub quantity: i64,
    /// Defaults to the server clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct AccessRequest {
    pub ticket_type: TicketType,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub access_code: Option<String>,
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AccessView {
    pub visible: bool,
    pub requires_access_code: bool,
    pub access_code_valid: bool,
    pub remaining: u32,
    pub sold_out: bool,
}

/// POST /tickets/quote
pub async fn quote_ticket(
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let ticket = &request.ticket_type;

    let quantity = u32::try_from(request.quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or_else(|| AppError::ValidationError("Quantity must be at least 1".to_string()))?;

    let remaining = remaining_quantity(ticket);
    if quantity > remaining {
        return Err(AppError::ValidationError(format!(
            "Only {} ticket(s) remaining for '{}'",
            remaining, ticket.name
        )));
    }

    let quote = resolve_total(ticket, quantity, request.now.unwrap_or_else(Utc::now))
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "Total price for {} x '{}' is too large",
                quantity, ticket.name
            ))
        })?;
    info!(
        ticket_id = %ticket.id,
        quantity,
        total = %quote.total_price,
        "Ticket quote computed"
    );

    Ok(success(quote, "Price resolved"))
}

/// POST /tickets/access
pub async fn check_access(
    payload: Result<Json<AccessRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    let ticket = &request.ticket_type;
    let now = request.now.unwrap_or_else(Utc::now);

    let view = AccessView {
        visible: is_visible_to(ticket, now, request.role.as_deref()),
        requires_access_code: requires_access_code(ticket),
        access_code_valid: validate_access_code(
            ticket,
            request.access_code.as_deref().unwrap_or_default(),
        ),
        remaining: remaining_quantity(ticket),
        sold_out: is_sold_out(ticket),
    };

    Ok(success(view, "Ticket access evaluated"))
}
