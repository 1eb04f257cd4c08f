use log::{ info, warn };
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use thiserror::Error;

use crate::api::DashboardApi;
use crate::models::api::{ ApiResponse, WebhookRequest };

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Email should be valid")]
    InvalidEmail,
    #[error("Additional data must be valid JSON: {0}")]
    InvalidJson(String),
    #[error("A submission is already in progress")]
    SubmissionInFlight,
}

/// Raw text of the four form fields, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookFormData {
    pub name: String,
    pub email: String,
    pub message: String,
    pub additional_data: String,
}

impl WebhookFormData {
    /// Validates the fields and parses the additional data. Blank optional
    /// fields are left out of the request entirely.
    pub fn to_request(&self) -> Result<WebhookRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::MissingEmail);
        }
        if !looks_like_email(email) {
            return Err(FormError::InvalidEmail);
        }

        let data = if self.additional_data.trim().is_empty() {
            None
        } else {
            let value: JsonValue = serde_json
                ::from_str(&self.additional_data)
                .map_err(|e| FormError::InvalidJson(e.to_string()))?;
            Some(value)
        };

        Ok(WebhookRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: Some(self.message.clone()).filter(|m| !m.trim().is_empty()),
            data,
        })
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) =>
            !local.is_empty() &&
            !domain.is_empty() &&
            !domain.contains('@') &&
            !email.chars().any(char::is_whitespace),
        None => false,
    }
}

/// What the form shows after a submit. A new submit or a reset replaces it.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Success(ApiResponse),
    Error(String),
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitOutcome::Success(resp) => {
                writeln!(f, "Success!")?;
                writeln!(f, "{}", resp.message)?;
                writeln!(f, "Response Data:")?;
                let echo = serde_json::to_string_pretty(resp).map_err(|_| fmt::Error)?;
                write!(f, "{}", echo)
            }
            SubmitOutcome::Error(message) => {
                writeln!(f, "Error")?;
                write!(f, "{}", message)
            }
        }
    }
}

#[derive(Debug, Default)]
struct FormState {
    data: WebhookFormData,
    submitting: bool,
    outcome: Option<SubmitOutcome>,
}

pub struct WebhookForm {
    api: Arc<dyn DashboardApi>,
    api_key: Option<String>,
    state: Mutex<FormState>,
}

impl WebhookForm {
    pub fn new(api: Arc<dyn DashboardApi>, api_key: Option<String>) -> Self {
        Self {
            api,
            api_key,
            state: Mutex::new(FormState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn edit(&self, apply: impl FnOnce(&mut WebhookFormData)) {
        apply(&mut self.state().data);
    }

    pub fn data(&self) -> WebhookFormData {
        self.state().data.clone()
    }

    /// True while a request is in flight; the submit control is disabled.
    pub fn is_submitting(&self) -> bool {
        self.state().submitting
    }

    pub fn outcome(&self) -> Option<SubmitOutcome> {
        self.state().outcome.clone()
    }

    /// Issues exactly one trigger request. Local validation failures never
    /// reach the network: they are shown as the error view and returned.
    pub async fn submit(&self) -> Result<SubmitOutcome, FormError> {
        let request = {
            let mut state = self.state();
            if state.submitting {
                return Err(FormError::SubmissionInFlight);
            }
            state.outcome = None;
            match state.data.to_request() {
                Ok(request) => {
                    state.submitting = true;
                    request
                }
                Err(e) => {
                    warn!("Webhook form rejected before sending: {}", e);
                    state.outcome = Some(SubmitOutcome::Error(e.to_string()));
                    return Err(e);
                }
            }
        };

        let result = self.api.trigger_webhook(&request, self.api_key.as_deref()).await;

        let outcome = match result {
            Ok(resp) => {
                info!("Webhook triggered (request id {:?})", resp.request_id);
                SubmitOutcome::Success(resp)
            }
            Err(e) => SubmitOutcome::Error(e.message),
        };

        let mut state = self.state();
        state.submitting = false;
        state.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Clears every field and any shown result. Never touches the network.
    pub fn reset(&self) {
        let mut state = self.state();
        state.data = WebhookFormData::default();
        state.outcome = None;
    }
}
