#![forbid(unsafe_code)]

//! Per-field and whole-form state.
//!
//! [`FormState`] is the single owner of everything the form shows: field
//! values and messages, the age and minor flag, the form-level toggles, the
//! focus gate, advisory notes, and the submission phase. It lives for one
//! form lifecycle and is cleared by [`FormState::reset`].

use std::collections::BTreeMap;
use std::time::Instant;

use fguard_core::{ErrorCode, FieldKind, ValidationResult};
use serde::Serialize;

use crate::advisory::AdvisoryNote;
use crate::field::FieldId;
use crate::focus::FocusGate;
use crate::submit::SubmitPhase;

// ---------------------------------------------------------------------------
// FieldState
// ---------------------------------------------------------------------------

/// Current value and verdict of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub id: FieldId,
    pub kind: FieldKind,
    /// Value after input filtering, untrimmed.
    pub raw_value: String,
    pub trimmed_value: String,
    pub is_valid: bool,
    /// Inline message; empty when valid or never validated.
    pub message: String,
    pub code: Option<ErrorCode>,
    /// Set once the field has lost focus.
    pub touched: bool,
}

impl FieldState {
    #[must_use]
    pub fn new(id: FieldId) -> Self {
        Self {
            id,
            kind: id.kind(),
            raw_value: String::new(),
            trimmed_value: String::new(),
            is_valid: false,
            message: String::new(),
            code: None,
            touched: false,
        }
    }

    /// Store a new value; the verdict is left to [`apply`](Self::apply).
    pub fn set_value(&mut self, raw: impl Into<String>) {
        self.raw_value = raw.into();
        self.trimmed_value = self.raw_value.trim().to_string();
    }

    /// Record a validation outcome.
    pub fn apply(&mut self, result: &ValidationResult) {
        self.is_valid = result.is_valid();
        self.message = result.message();
        self.code = result.code();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trimmed_value.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Form toggles
// ---------------------------------------------------------------------------

/// Form-level inputs that are not text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormToggle {
    Gender,
    Terms,
    GuardianConsent,
    Photo,
}

impl FormToggle {
    /// Message shown while the toggle is unsatisfied.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Gender => "Gender required",
            Self::Terms => "Must agree",
            Self::GuardianConsent => "Consent required",
            Self::Photo => "Photo required",
        }
    }
}

// ---------------------------------------------------------------------------
// FormState
// ---------------------------------------------------------------------------

/// Everything one form instance displays.
#[derive(Debug, Clone)]
pub struct FormState {
    fields: BTreeMap<FieldId, FieldState>,
    /// Age in `[min_age, adult_age)`: guardian fields and consent apply.
    pub is_minor: bool,
    /// Age shown next to an accepted date of birth.
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub terms_accepted: bool,
    pub guardian_consent: bool,
    /// Opaque accepted photo payload.
    pub photo: Option<String>,
    /// Messages for toggles the user has interacted with.
    pub toggle_messages: BTreeMap<FormToggle, &'static str>,
    pub focus: FocusGate,
    pub advisory_notes: BTreeMap<FieldId, AdvisoryNote>,
    pub submit_enabled: bool,
    pub submission: SubmitPhase,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: FieldId::TAB_ORDER
                .into_iter()
                .map(|id| (id, FieldState::new(id)))
                .collect(),
            is_minor: false,
            age: None,
            gender: None,
            terms_accepted: false,
            guardian_consent: false,
            photo: None,
            toggle_messages: BTreeMap::new(),
            focus: FocusGate::Unblocked,
            advisory_notes: BTreeMap::new(),
            submit_enabled: false,
            submission: SubmitPhase::Idle,
        }
    }

    /// Back to a blank form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> &FieldState {
        &self.fields[&id]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut FieldState {
        self.fields
            .entry(id)
            .or_insert_with(|| FieldState::new(id))
    }

    /// Every field, in id order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldState> {
        self.fields.values()
    }

    /// Untrimmed value of a field.
    #[must_use]
    pub fn value(&self, id: FieldId) -> &str {
        &self.field(id).raw_value
    }

    #[must_use]
    pub fn is_valid(&self, id: FieldId) -> bool {
        self.field(id).is_valid
    }

    /// Fields whose validity currently gates submission.
    pub fn gating_fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        let guardian: &[FieldId] = if self.is_minor { &FieldId::GUARDIAN } else { &[] };
        FieldId::REQUIRED.iter().chain(guardian).copied()
    }

    /// Drop advisory notes that have expired by `now`; returns how many.
    pub fn expire_notes(&mut self, now: Instant) -> usize {
        let before = self.advisory_notes.len();
        self.advisory_notes.retain(|_, note| note.expires_at > now);
        before - self.advisory_notes.len()
    }
}
