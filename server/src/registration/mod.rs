//! Registration wizard state.
//!
//! A [`RegistrationState`] walks a runner through one of the [`StepFlow`]s and
//! keeps whatever they selected along the way. Navigation never fails: moving
//! past either end or jumping to a step outside the flow leaves the state as
//! it was.

pub mod sessions;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub use sessions::RegistrationSessions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    SelectTicket,
    RegistrationForm,
    Review,
    Payment,
    Confirmation,
}

impl Step {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelectTicket => "select-ticket",
            Self::RegistrationForm => "registration-form",
            Self::Review => "review",
            Self::Payment => "payment",
            Self::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown registration step '{0}'")]
    UnknownStep(String),

    #[error("unknown registration flow '{0}'")]
    UnknownFlow(String),
}

impl FromStr for Step {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select-ticket" => Ok(Self::SelectTicket),
            "registration-form" => Ok(Self::RegistrationForm),
            "review" => Ok(Self::Review),
            "payment" => Ok(Self::Payment),
            "confirmation" => Ok(Self::Confirmation),
            other => Err(ParseError::UnknownStep(other.to_string())),
        }
    }
}

const STANDARD_STEPS: [Step; 4] = [
    Step::SelectTicket,
    Step::RegistrationForm,
    Step::Review,
    Step::Confirmation,
];

const WITH_PAYMENT_STEPS: [Step; 5] = [
    Step::SelectTicket,
    Step::RegistrationForm,
    Step::Review,
    Step::Payment,
    Step::Confirmation,
];

/// The step orderings a registration can follow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepFlow {
    /// Free or externally paid registrations.
    #[default]
    Standard,
    /// Inserts an in-flow payment step before confirmation.
    WithPayment,
}

impl StepFlow {
    pub fn steps(self) -> &'static [Step] {
        match self {
            Self::Standard => &STANDARD_STEPS,
            Self::WithPayment => &WITH_PAYMENT_STEPS,
        }
    }

    pub fn first(self) -> Step {
        self.steps()[0]
    }

    pub fn position(self, step: Step) -> Option<usize> {
        self.steps().iter().position(|s| *s == step)
    }

    pub fn contains(self, step: Step) -> bool {
        self.position(step).is_some()
    }
}

impl FromStr for StepFlow {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "with-payment" => Ok(Self::WithPayment),
            other => Err(ParseError::UnknownFlow(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationState {
    flow: StepFlow,
    registration_id: Option<Uuid>,
    event_id: Option<Uuid>,
    ticket_id: Option<Uuid>,
    current_step: Step,
    form_responses: HashMap<String, Value>,
}

impl RegistrationState {
    pub fn new(flow: StepFlow) -> Self {
        Self {
            flow,
            registration_id: None,
            event_id: None,
            ticket_id: None,
            current_step: flow.first(),
            form_responses: HashMap::new(),
        }
    }

    pub fn flow(&self) -> StepFlow {
        self.flow
    }

    pub fn current_step(&self) -> Step {
        self.current_step
    }

    pub fn registration_id(&self) -> Option<Uuid> {
        self.registration_id
    }

    pub fn event_id(&self) -> Option<Uuid> {
        self.event_id
    }

    pub fn ticket_id(&self) -> Option<Uuid> {
        self.ticket_id
    }

    pub fn form_responses(&self) -> &HashMap<String, Value> {
        &self.form_responses
    }

    pub fn total_steps(&self) -> usize {
        self.flow.steps().len()
    }

    pub fn step_index(&self) -> usize {
        // current_step only ever holds members of the flow
        self.flow.position(self.current_step).unwrap_or(0)
    }

    pub fn is_first_step(&self) -> bool {
        self.step_index() == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index() + 1 == self.total_steps()
    }

    pub fn next_step(&mut self) {
        if let Some(next) = self.flow.steps().get(self.step_index() + 1) {
            self.current_step = *next;
        }
    }

    pub fn prev_step(&mut self) {
        if let Some(index) = self.step_index().checked_sub(1) {
            self.current_step = self.flow.steps()[index];
        }
    }

    /// Jumps to `target` when it belongs to this flow; otherwise does nothing.
    pub fn go_to_step(&mut self, target: Step) {
        if self.flow.contains(target) {
            self.current_step = target;
        }
    }

    /// Like [`go_to_step`](Self::go_to_step) for a step name coming off the
    /// wire. Names that are not steps at all are ignored the same way.
    pub fn go_to_step_named(&mut self, target: &str) {
        if let Ok(step) = target.parse() {
            self.go_to_step(step);
        }
    }

    pub fn set_registration_id(&mut self, registration_id: Option<Uuid>) {
        self.registration_id = registration_id;
    }

    pub fn set_event_id(&mut self, event_id: Option<Uuid>) {
        self.event_id = event_id;
    }

    pub fn set_ticket_id(&mut self, ticket_id: Option<Uuid>) {
        self.ticket_id = ticket_id;
    }

    pub fn set_form_responses(&mut self, form_responses: HashMap<String, Value>) {
        self.form_responses = form_responses;
    }

    pub fn set_form_response(&mut self, key: impl Into<String>, value: Value) {
        self.form_responses.insert(key.into(), value);
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.flow);
    }
}

impl Default for RegistrationState {
    fn default() -> Self {
        Self::new(StepFlow::default())
    }
}
