#![forbid(unsafe_code)]

//! Registration submission: payload, lifecycle, and the backend trait.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::field::FieldId;
use crate::state::FormState;

/// Flat `field id → value` map sent to the registration backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationPayload(BTreeMap<String, String>);

impl RegistrationPayload {
    /// Build from the fields the validator accepted.
    ///
    /// Only valid fields are included. The confirm-password never leaves the
    /// form; guardian fields go out only for minors.
    #[must_use]
    pub fn from_state(state: &FormState) -> Self {
        let mut map = BTreeMap::new();
        for id in state.gating_fields() {
            if id == FieldId::ConfirmPassword || !state.is_valid(id) {
                continue;
            }
            map.insert(id.as_str().to_string(), state.field(id).trimmed_value.clone());
        }
        if let Some(gender) = &state.gender {
            map.insert("gender".to_string(), gender.clone());
        }
        if let Some(photo) = &state.photo {
            map.insert("profilePhoto".to_string(), photo.clone());
        }
        Self(map)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Backend reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
}

/// Why a submission did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SubmitError {
    /// The backend answered and refused.
    Rejected(String),
    /// The backend could not be reached.
    Transport(String),
}

impl SubmitError {
    /// Text shown to the user.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            SubmitError::Rejected(msg) => msg,
            SubmitError::Transport(_) => "Network error. Please try again.",
        }
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Rejected(msg) => write!(f, "registration rejected: {msg}"),
            SubmitError::Transport(msg) => write!(f, "registration transport error: {msg}"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum SubmitPhase {
    #[default]
    Idle,
    InFlight,
    Succeeded { message: String },
    Failed { message: String },
}

impl SubmitPhase {
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }
}

/// Backend that accepts registrations.
pub trait RegistrationService {
    fn register(&self, payload: &RegistrationPayload) -> Result<RegistrationResponse, SubmitError>;
}

impl<F> RegistrationService for F
where
    F: Fn(&RegistrationPayload) -> Result<RegistrationResponse, SubmitError>,
{
    fn register(&self, payload: &RegistrationPayload) -> Result<RegistrationResponse, SubmitError> {
        self(payload)
    }
}

/// Fold a backend reply into a lifecycle outcome: `success: false` is a
/// rejection.
pub fn outcome(
    reply: Result<RegistrationResponse, SubmitError>,
) -> Result<String, SubmitError> {
    match reply {
        Ok(resp) if resp.success => Ok(resp.message),
        Ok(resp) => Err(SubmitError::Rejected(resp.message)),
        Err(e) => Err(e),
    }
}
