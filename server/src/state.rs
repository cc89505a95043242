use crate::config::Config;
use crate::registration::{RegistrationSessions, StepFlow};

/// Shared state handed to every request handler.
#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: RegistrationSessions,
    /// Flow used when a new session does not name one.
    pub default_flow: StepFlow,
}

impl AppState {
    pub fn new(default_flow: StepFlow) -> Self {
        Self {
            sessions: RegistrationSessions::new(),
            default_flow,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.registration_flow)
    }
}
