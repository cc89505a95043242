use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::present;
use crate::models::MarathonEvent;
use crate::registration::{RegistrationState, Step, StepFlow};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub flow: Option<StepFlow>,
    /// When given, the event must be open and the session starts with it
    /// selected.
    #[serde(default)]
    pub event: Option<MarathonEvent>,
}

#[derive(Debug, Deserialize)]
pub struct GoToStepRequest {
    pub step: String,
}

/// Fields left out are untouched; an explicit `null` clears the value.
#[derive(Debug, Default, Deserialize)]
pub struct SelectionRequest {
    #[serde(default, deserialize_with = "present")]
    pub registration_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub event_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "present")]
    pub ticket_id: Option<Option<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct FormResponsesRequest {
    pub form_responses: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub flow: StepFlow,
    pub steps: &'static [Step],
    pub current_step: Step,
    pub step_index: usize,
    pub total_steps: usize,
    pub is_first_step: bool,
    pub is_last_step: bool,
    pub registration_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub ticket_id: Option<Uuid>,
    pub form_responses: HashMap<String, Value>,
}

impl SessionView {
    fn new(id: Uuid, state: &RegistrationState) -> Self {
        Self {
            id,
            flow: state.flow(),
            steps: state.flow().steps(),
            current_step: state.current_step(),
            step_index: state.step_index(),
            total_steps: state.total_steps(),
            is_first_step: state.is_first_step(),
            is_last_step: state.is_last_step(),
            registration_id: state.registration_id(),
            event_id: state.event_id(),
            ticket_id: state.ticket_id(),
            form_responses: state.form_responses().clone(),
        }
    }
}

async fn apply<F>(state: &AppState, id: Uuid, f: F, message: &str) -> Result<Response, AppError>
where
    F: FnOnce(&mut RegistrationState),
{
    let updated = state
        .sessions
        .update(id, f)
        .await
        .ok_or(AppError::SessionNotFound(id))?;
    Ok(success(SessionView::new(id, &updated), message))
}

/// POST /registrations
///
/// The body is optional; an empty request starts a session on the
/// configured default flow. Events that are not open for registration are
/// rejected.
pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request: CreateSessionRequest = if body.is_empty() {
        CreateSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::ValidationError(format!("Invalid session request: {}", e)))?
    };

    if let Some(event) = &request.event {
        if !event.is_open_for_registration(Utc::now()) {
            return Err(AppError::ValidationError(format!(
                "Event '{}' is not open for registration",
                event.title
            )));
        }
    }

    let flow = request.flow.unwrap_or(state.default_flow);
    let (id, mut session) = state.sessions.create(flow).await;

    if let Some(event) = request.event {
        let event_id = event.id;
        session = state
            .sessions
            .update(id, |session| session.set_event_id(Some(event_id)))
            .await
            .ok_or(AppError::SessionNotFound(id))?;
    }

    Ok(created(
        SessionView::new(id, &session),
        "Registration session started",
    ))
}

/// GET /registrations/:id
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or(AppError::SessionNotFound(id))?;
    Ok(success(SessionView::new(id, &session), "Registration session"))
}

/// DELETE /registrations/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state
        .sessions
        .remove(id)
        .await
        .ok_or(AppError::SessionNotFound(id))?;
    Ok(empty_success("Registration session closed"))
}

/// POST /registrations/:id/next
pub async fn next_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    apply(&state, id, RegistrationState::next_step, "Moved to next step").await
}

/// POST /registrations/:id/prev
pub async fn prev_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    apply(&state, id, RegistrationState::prev_step, "Moved to previous step").await
}

/// POST /registrations/:id/goto
///
/// Unknown step names, and steps outside the session's flow, leave the
/// session where it is.
pub async fn go_to_step(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<GoToStepRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    apply(
        &state,
        id,
        |session| session.go_to_step_named(&request.step),
        "Step change applied",
    )
    .await
}

/// POST /registrations/:id/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    apply(&state, id, RegistrationState::reset, "Registration session reset").await
}

/// PUT /registrations/:id/selection
pub async fn update_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    apply(
        &state,
        id,
        |session| {
            if let Some(registration_id) = request.registration_id {
                session.set_registration_id(registration_id);
            }
            if let Some(event_id) = request.event_id {
                session.set_event_id(event_id);
            }
            if let Some(ticket_id) = request.ticket_id {
                session.set_ticket_id(ticket_id);
            }
        },
        "Selection updated",
    )
    .await
}

/// PUT /registrations/:id/responses
pub async fn replace_form_responses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FormResponsesRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    apply(
        &state,
        id,
        |session| session.set_form_responses(request.form_responses),
        "Form responses saved",
    )
    .await
}

/// PATCH /registrations/:id/responses
pub async fn merge_form_responses(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<FormResponsesRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload?;
    apply(
        &state,
        id,
        |session| {
            for (key, value) in request.form_responses {
                session.set_form_response(key, value);
            }
        },
        "Form responses saved",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selection_distinguishes_absent_from_null() {
        let request: SelectionRequest = serde_json::from_value(json!({
            "event_id": "0c9b3e71-2f0a-4e8d-8b6e-93c1d4a5f7b2",
            "ticket_id": null
        }))
        .unwrap();

        assert!(request.registration_id.is_none());
        assert!(matches!(request.event_id, Some(Some(_))));
        assert_eq!(request.ticket_id, Some(None));
    }

    #[test]
    fn test_session_view_reports_progress() {
        let mut session = RegistrationState::new(StepFlow::WithPayment);
        session.go_to_step(Step::Payment);

        let view = SessionView::new(Uuid::nil(), &session);
        assert_eq!(view.step_index, 3);
        assert_eq!(view.total_steps, 5);
        assert!(!view.is_first_step);
        assert!(!view.is_last_step);
        assert_eq!(view.steps.len(), 5);
    }
}
