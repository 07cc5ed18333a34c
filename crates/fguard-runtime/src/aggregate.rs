#![forbid(unsafe_code)]

//! Whole-form validity.
//!
//! Submission is enabled iff every gating field is valid, a gender is
//! selected, the terms are accepted, and a photo has been accepted; for
//! minors the guardian fields must also be valid and consent given.
//! [`evaluate`] is the pure check; [`FormValidityAggregator`] debounces it
//! so a burst of keystrokes settles into one decision.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::debounce::{DebounceTicket, Debouncer};
use crate::field::FieldId;
use crate::state::FormState;

/// One reason submission is disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "blocker", content = "field", rename_all = "snake_case")]
pub enum Blocker {
    InvalidField(FieldId),
    GenderMissing,
    TermsNotAccepted,
    PhotoMissing,
    GuardianConsentMissing,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidityReport {
    pub blockers: Vec<Blocker>,
}

impl ValidityReport {
    /// `true` when nothing blocks submission.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.blockers.is_empty()
    }
}

/// Evaluate `state` immediately.
#[must_use]
pub fn evaluate(state: &FormState) -> ValidityReport {
    let mut blockers: Vec<Blocker> = state
        .gating_fields()
        .filter(|&id| !state.is_valid(id))
        .map(Blocker::InvalidField)
        .collect();

    if state.gender.is_none() {
        blockers.push(Blocker::GenderMissing);
    }
    if !state.terms_accepted {
        blockers.push(Blocker::TermsNotAccepted);
    }
    if state.photo.is_none() {
        blockers.push(Blocker::PhotoMissing);
    }
    if state.is_minor && !state.guardian_consent {
        blockers.push(Blocker::GuardianConsentMissing);
    }
    ValidityReport { blockers }
}

/// Debounced evaluator that owns the submit-enabled decision.
#[derive(Debug, Clone)]
pub struct FormValidityAggregator {
    debouncer: Debouncer,
}

impl FormValidityAggregator {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.debouncer.delay()
    }

    /// Something changed: (re)start the debounce window.
    pub fn schedule(&mut self, now: Instant) -> DebounceTicket {
        self.debouncer.trigger(now)
    }

    /// The debounce timer for `ticket` expired. Re-evaluates and stores the
    /// decision in `state` when the ticket is current; returns the report.
    pub fn settle(
        &mut self,
        ticket: DebounceTicket,
        now: Instant,
        state: &mut FormState,
    ) -> Option<ValidityReport> {
        if !self.debouncer.fire(ticket, now) {
            debug!(%ticket, "superseded validity check skipped");
            return None;
        }
        let report = evaluate(state);
        if state.submit_enabled != report.is_ready() {
            debug!(
                enabled = report.is_ready(),
                blockers = report.blockers.len(),
                "submit enablement changed"
            );
        }
        state.submit_enabled = report.is_ready();
        Some(report)
    }

    /// Drop any pending evaluation.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
