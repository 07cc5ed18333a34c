#![forbid(unsafe_code)]

//! Focus gating.
//!
//! Once a field is left in an invalid state the user cannot move to any
//! other field or control until it is fixed. The gate is a two-state
//! machine:
//!
//! ```text
//!              blur(non-empty, invalid) / enter(invalid)
//!   Unblocked ───────────────────────────────────────────▶ Blocked(f)
//!       ▲                                                    │
//!       └──── f validated OK / enter(f, valid) / reset ──────┘
//! ```
//!
//! While `Blocked(f)`, any focus request for another field or control is
//! redirected back to `f`. Focus returning to the page body is allowed.
//! Blur and Enter arriving from any other field are answered with the same
//! redirect and never move or replace the block.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::field::FieldId;

/// Non-field controls that can take focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Control {
    Gender,
    Terms,
    GuardianConsent,
    Photo,
    Submit,
}

/// Where focus is being moved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusTarget {
    Field(FieldId),
    Control(Control),
    /// The page itself (focus cleared).
    Body,
}

/// Whether a focus move may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDecision {
    Allow,
    /// Intercept and return focus to this field.
    Redirect(FieldId),
}

/// Result of pressing Enter in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterOutcome {
    /// Field was valid: move on.
    Advance(FocusTarget),
    /// Field was invalid and is now the blocked field.
    Blocked(FieldId),
    /// Another field is blocked; focus goes back to it.
    Held(FieldId),
    /// Multiline fields keep Enter for themselves.
    Ignored,
}

/// The focus-gating state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "field", rename_all = "snake_case")]
pub enum FocusGate {
    #[default]
    Unblocked,
    Blocked(FieldId),
}

impl FocusGate {
    /// The field holding focus hostage, if any.
    #[must_use]
    pub const fn blocked(&self) -> Option<FieldId> {
        match self {
            Self::Unblocked => None,
            Self::Blocked(field) => Some(*field),
        }
    }

    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked(_))
    }

    /// Field lost focus after local validation.
    ///
    /// Only non-empty invalid values block; an untouched empty field can be
    /// skipped and is caught by the submit gate instead. Returns a redirect
    /// when a different field already holds the block.
    pub fn on_blur(&mut self, field: FieldId, is_empty: bool, is_valid: bool) -> FocusDecision {
        if let Some(blocked) = self.held_by_other(field) {
            return FocusDecision::Redirect(blocked);
        }
        if !is_valid && !is_empty {
            self.block(field);
        }
        FocusDecision::Allow
    }

    /// Enter pressed in `field` after local validation.
    pub fn on_enter(&mut self, field: FieldId, is_valid: bool, is_minor: bool) -> EnterOutcome {
        if let Some(blocked) = self.held_by_other(field) {
            return EnterOutcome::Held(blocked);
        }
        if field.is_multiline() {
            return EnterOutcome::Ignored;
        }
        if !is_valid {
            self.block(field);
            return EnterOutcome::Blocked(field);
        }
        self.unblock(field);
        let next = field
            .next(is_minor)
            .map_or(FocusTarget::Control(Control::Submit), FocusTarget::Field);
        EnterOutcome::Advance(next)
    }

    /// A field was re-validated (on every input).
    pub fn on_validated(&mut self, field: FieldId, is_valid: bool) {
        if is_valid {
            self.unblock(field);
        }
    }

    /// Decide whether focus may move to `target`.
    #[must_use]
    pub fn on_focus_request(&self, target: FocusTarget) -> FocusDecision {
        match (self, target) {
            (Self::Unblocked, _) | (Self::Blocked(_), FocusTarget::Body) => FocusDecision::Allow,
            (Self::Blocked(blocked), FocusTarget::Field(f)) if f == *blocked => FocusDecision::Allow,
            (Self::Blocked(blocked), _) => {
                debug!(blocked = %blocked, ?target, "focus redirected to blocked field");
                FocusDecision::Redirect(*blocked)
            }
        }
    }

    /// Back to `Unblocked` regardless of which field was blocked.
    pub fn reset(&mut self) {
        *self = Self::Unblocked;
    }

    fn held_by_other(&self, field: FieldId) -> Option<FieldId> {
        match *self {
            Self::Blocked(blocked) if blocked != field => {
                debug!(blocked = %blocked, field = %field, "event from non-blocked field redirected");
                Some(blocked)
            }
            _ => None,
        }
    }

    fn block(&mut self, field: FieldId) {
        if *self != Self::Blocked(field) {
            debug!(field = %field, "focus blocked");
        }
        *self = Self::Blocked(field);
    }

    fn unblock(&mut self, field: FieldId) {
        if *self == Self::Blocked(field) {
            debug!(field = %field, "focus unblocked");
            *self = Self::Unblocked;
        }
    }
}
