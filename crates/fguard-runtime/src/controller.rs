#![forbid(unsafe_code)]

//! The form event loop.
//!
//! [`FormController`] owns one [`FormState`] and turns every [`FormEvent`]
//! into state changes plus a [`Cmd`] describing what the host must do next:
//! move focus, arm a timer, call the advisory backend, or submit. Nothing in
//! here blocks or reads a clock; time arrives with each event as a [`Now`].
//!
//! [`Dispatcher`] is the FIFO queue in front of the controller.
//!
//! # Event flow
//!
//! ```text
//! Input ─▶ filter ─▶ validate ─▶ bump generation ─▶ gate.on_validated
//!                                                  └─▶ ScheduleValidity
//! Blur  ─▶ validate ─▶ gate.on_blur ─▶ Advisory (non-empty only)
//!                              └─▶ Focus(blocked) when another field holds the gate
//! Enter ─▶ validate ─▶ gate.on_enter ─▶ Focus(next | self | blocked)
//! TimerFired ─▶ aggregator.settle ─▶ submit_enabled
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use fguard_core::filters::filter_input;
use fguard_core::{FieldContext, FieldValidatorRegistry};
use time::PrimitiveDateTime;
use tracing::{debug, info, warn};

use crate::advisory::{
    AdvisoryCoordinator, AdvisoryError, AdvisoryNote, AdvisoryRequest, AdvisoryResponse,
    AdvisoryTicket,
};
use crate::aggregate::{FormValidityAggregator, evaluate};
use crate::clock::{Clock, Now};
use crate::debounce::DebounceTicket;
use crate::field::FieldId;
use crate::focus::{EnterOutcome, FocusDecision, FocusTarget};
use crate::state::{FormState, FormToggle};
use crate::submit::{
    RegistrationPayload, RegistrationResponse, SubmitError, SubmitPhase, outcome,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing knobs for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Trailing debounce before whole-form validity is re-evaluated.
    pub debounce: Duration,
    /// How long an advisory note stays visible.
    pub advisory_note_ttl: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            advisory_note_ttl: Duration::from_secs(3),
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_advisory_note_ttl(mut self, ttl: Duration) -> Self {
        self.advisory_note_ttl = ttl;
        self
    }
}

// ---------------------------------------------------------------------------
// Events and commands
// ---------------------------------------------------------------------------

/// Everything that can happen to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The user edited a field; `value` is the raw, unfiltered text.
    Input { field: FieldId, value: String },
    Blur(FieldId),
    Enter(FieldId),
    /// Focus is about to move to `target`.
    FocusRequest(FocusTarget),
    GenderSelected(String),
    TermsToggled(bool),
    GuardianConsentToggled(bool),
    /// A photo passed the host's checks; the payload is opaque here.
    PhotoAccepted(String),
    PhotoCleared,
    /// A [`Cmd::ScheduleValidity`] timer expired.
    TimerFired(DebounceTicket),
    AdvisoryCompleted {
        ticket: AdvisoryTicket,
        result: Result<AdvisoryResponse, AdvisoryError>,
    },
    /// A [`Cmd::Tick`] timer expired.
    Tick,
    SubmitRequested,
    SubmitCompleted(Result<RegistrationResponse, SubmitError>),
    Reset,
}

impl FormEvent {
    /// Event name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Input { .. } => "input",
            Self::Blur(_) => "blur",
            Self::Enter(_) => "enter",
            Self::FocusRequest(_) => "focus_request",
            Self::GenderSelected(_) => "gender_selected",
            Self::TermsToggled(_) => "terms_toggled",
            Self::GuardianConsentToggled(_) => "guardian_consent_toggled",
            Self::PhotoAccepted(_) => "photo_accepted",
            Self::PhotoCleared => "photo_cleared",
            Self::TimerFired(_) => "timer_fired",
            Self::AdvisoryCompleted { .. } => "advisory_completed",
            Self::Tick => "tick",
            Self::SubmitRequested => "submit_requested",
            Self::SubmitCompleted(_) => "submit_completed",
            Self::Reset => "reset",
        }
    }
}

/// Work for the host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cmd {
    #[default]
    None,
    Batch(Vec<Cmd>),
    /// Move focus.
    Focus(FocusTarget),
    /// Deliver [`FormEvent::TimerFired`] with `ticket` after `after`.
    ScheduleValidity {
        ticket: DebounceTicket,
        after: Duration,
    },
    /// Deliver [`FormEvent::Tick`] after the duration.
    Tick(Duration),
    /// Call the advisory backend and deliver [`FormEvent::AdvisoryCompleted`].
    Advisory {
        ticket: AdvisoryTicket,
        request: AdvisoryRequest,
    },
    /// Call the registration backend and deliver [`FormEvent::SubmitCompleted`].
    Submit(RegistrationPayload),
}

impl Cmd {
    /// Combine commands, dropping no-ops.
    #[must_use]
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or_default(),
            _ => Self::Batch(cmds),
        }
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

// ---------------------------------------------------------------------------
// FormController
// ---------------------------------------------------------------------------

/// Owns the form and processes its events.
#[derive(Debug, Clone)]
pub struct FormController {
    registry: FieldValidatorRegistry,
    config: ControllerConfig,
    state: FormState,
    aggregator: FormValidityAggregator,
    advisory: AdvisoryCoordinator,
}

impl Default for FormController {
    fn default() -> Self {
        Self::new(FieldValidatorRegistry::default(), ControllerConfig::default())
    }
}

impl FormController {
    #[must_use]
    pub fn new(registry: FieldValidatorRegistry, config: ControllerConfig) -> Self {
        Self {
            registry,
            config,
            state: FormState::new(),
            aggregator: FormValidityAggregator::new(config.debounce),
            advisory: AdvisoryCoordinator::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    #[must_use]
    pub fn registry(&self) -> &FieldValidatorRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn advisory(&self) -> &AdvisoryCoordinator {
        &self.advisory
    }

    /// Handle one event at `now`.
    pub fn update(&mut self, event: FormEvent, now: Now) -> Cmd {
        debug!(event = event.name(), "form event");
        match event {
            FormEvent::Input { field, value } => self.on_input(field, &value, now),
            FormEvent::Blur(field) => self.on_blur(field, now),
            FormEvent::Enter(field) => self.on_enter(field, now),
            FormEvent::FocusRequest(target) => match self.state.focus.on_focus_request(target) {
                FocusDecision::Allow => Cmd::None,
                FocusDecision::Redirect(field) => Cmd::Focus(FocusTarget::Field(field)),
            },
            FormEvent::GenderSelected(gender) => {
                let gender = gender.trim();
                self.state.gender = (!gender.is_empty()).then(|| gender.to_string());
                self.set_toggle(FormToggle::Gender, self.state.gender.is_some());
                self.schedule_validity(now)
            }
            FormEvent::TermsToggled(accepted) => {
                self.state.terms_accepted = accepted;
                self.set_toggle(FormToggle::Terms, accepted);
                self.schedule_validity(now)
            }
            FormEvent::GuardianConsentToggled(given) => {
                self.state.guardian_consent = given;
                self.set_toggle(FormToggle::GuardianConsent, given);
                self.schedule_validity(now)
            }
            FormEvent::PhotoAccepted(photo) => {
                self.state.photo = Some(photo);
                self.set_toggle(FormToggle::Photo, true);
                self.schedule_validity(now)
            }
            FormEvent::PhotoCleared => {
                self.state.photo = None;
                self.set_toggle(FormToggle::Photo, false);
                self.schedule_validity(now)
            }
            FormEvent::TimerFired(ticket) => {
                self.aggregator.settle(ticket, now.instant, &mut self.state);
                if self.state.submission.is_in_flight() {
                    self.state.submit_enabled = false;
                }
                Cmd::None
            }
            FormEvent::AdvisoryCompleted { ticket, result } => {
                self.on_advisory(ticket, result, now)
            }
            FormEvent::Tick => {
                let expired = self.state.expire_notes(now.instant);
                if expired > 0 {
                    debug!(expired, "advisory notes expired");
                }
                Cmd::None
            }
            FormEvent::SubmitRequested => self.on_submit(),
            FormEvent::SubmitCompleted(reply) => {
                self.on_submit_completed(reply);
                Cmd::None
            }
            FormEvent::Reset => {
                self.state.reset();
                self.advisory.invalidate_all();
                self.advisory.trace_mut().clear();
                self.aggregator.cancel();
                Cmd::Focus(FocusTarget::Field(FieldId::FirstName))
            }
        }
    }

    fn on_input(&mut self, field: FieldId, raw: &str, now: Now) -> Cmd {
        let filtered = filter_input(field.kind(), raw).into_owned();
        self.state.field_mut(field).set_value(filtered);
        self.state.advisory_notes.remove(&field);
        self.revalidate(field, now.wall);

        let confirm = FieldId::ConfirmPassword;
        if field == FieldId::Password && !self.state.field(confirm).is_empty() {
            self.revalidate(confirm, now.wall);
        }
        self.schedule_validity(now)
    }

    fn on_blur(&mut self, field: FieldId, now: Now) -> Cmd {
        self.revalidate(field, now.wall);
        let fs = self.state.field_mut(field);
        fs.touched = true;
        let (is_empty, is_valid) = (fs.is_empty(), fs.is_valid);

        let was_blocked = self.state.focus.blocked();
        if let FocusDecision::Redirect(blocked) = self.state.focus.on_blur(field, is_empty, is_valid)
        {
            return Cmd::Focus(FocusTarget::Field(blocked));
        }

        let mut cmds = Vec::new();
        if self.state.focus.blocked() == Some(field) && was_blocked != Some(field) {
            cmds.push(Cmd::Focus(FocusTarget::Field(field)));
        }
        if !is_empty {
            cmds.push(self.request_advisory(field));
        }
        Cmd::batch(cmds)
    }

    fn on_enter(&mut self, field: FieldId, now: Now) -> Cmd {
        self.revalidate(field, now.wall);
        let is_valid = self.state.is_valid(field);
        match self.state.focus.on_enter(field, is_valid, self.state.is_minor) {
            EnterOutcome::Advance(target) => Cmd::Focus(target),
            EnterOutcome::Blocked(field) => {
                self.state.field_mut(field).touched = true;
                Cmd::Focus(FocusTarget::Field(field))
            }
            EnterOutcome::Held(blocked) => Cmd::Focus(FocusTarget::Field(blocked)),
            EnterOutcome::Ignored => Cmd::None,
        }
    }

    fn on_advisory(
        &mut self,
        ticket: AdvisoryTicket,
        result: Result<AdvisoryResponse, AdvisoryError>,
        now: Now,
    ) -> Cmd {
        match result {
            Ok(response) => {
                if !self.advisory.accept(ticket, &response) {
                    return Cmd::None;
                }
                let ttl = self.config.advisory_note_ttl;
                self.state.advisory_notes.insert(
                    ticket.field,
                    AdvisoryNote {
                        valid: response.valid,
                        message: response.message,
                        expires_at: now.instant + ttl,
                    },
                );
                Cmd::Tick(ttl)
            }
            Err(error) => {
                self.advisory.fail(ticket, &error);
                Cmd::None
            }
        }
    }

    fn on_submit(&mut self) -> Cmd {
        if self.state.submission.is_in_flight() {
            debug!("submit ignored: already in flight");
            return Cmd::None;
        }
        let report = evaluate(&self.state);
        if !self.state.submit_enabled || !report.is_ready() {
            debug!(blockers = report.blockers.len(), "submit ignored: form not ready");
            return Cmd::None;
        }
        let payload = RegistrationPayload::from_state(&self.state);
        info!(fields = payload.len(), "submitting registration");
        self.state.submission = SubmitPhase::InFlight;
        self.state.submit_enabled = false;
        Cmd::Submit(payload)
    }

    fn on_submit_completed(&mut self, reply: Result<RegistrationResponse, SubmitError>) {
        if !self.state.submission.is_in_flight() {
            debug!("submission reply without a request in flight");
            return;
        }
        match outcome(reply) {
            Ok(message) => {
                info!(%message, "registration succeeded");
                self.state.submission = SubmitPhase::Succeeded { message };
            }
            Err(error) => {
                warn!(%error, "registration failed");
                self.state.submission = SubmitPhase::Failed {
                    message: error.user_message().to_string(),
                };
                self.state.submit_enabled = evaluate(&self.state).is_ready();
            }
        }
    }

    /// Validate `field` against its current value and record the verdict.
    fn revalidate(&mut self, field: FieldId, wall: PrimitiveDateTime) {
        let (result, dob) = {
            let ctx = FieldContext::default()
                .with_password(&self.state.field(FieldId::Password).trimmed_value)
                .with_now(wall);
            let value = &self.state.field(field).raw_value;
            let dob = (field == FieldId::Dob).then(|| self.registry.assess_dob(value, &ctx));
            let result = match &dob {
                Some(assessment) => assessment.to_result(),
                None => self.registry.validate_with(field.kind(), value, &ctx),
            };
            (result, dob)
        };

        if let Some(assessment) = dob {
            if self.state.is_minor != assessment.is_minor() {
                debug!(minor = assessment.is_minor(), "minor-consent flow toggled");
            }
            self.state.is_minor = assessment.is_minor();
            self.state.age = assessment.display_age();
        }

        self.state.field_mut(field).apply(&result);
        self.advisory.bump(field);
        self.state.focus.on_validated(field, result.is_valid());
    }

    fn request_advisory(&mut self, field: FieldId) -> Cmd {
        let ticket = self.advisory.issue(field);
        let password_value = (field == FieldId::ConfirmPassword)
            .then(|| self.state.field(FieldId::Password).trimmed_value.clone());
        Cmd::Advisory {
            ticket,
            request: AdvisoryRequest {
                field,
                value: self.state.field(field).trimmed_value.clone(),
                password_value,
            },
        }
    }

    fn set_toggle(&mut self, toggle: FormToggle, satisfied: bool) {
        if satisfied {
            self.state.toggle_messages.remove(&toggle);
        } else {
            self.state.toggle_messages.insert(toggle, toggle.message());
        }
    }

    fn schedule_validity(&mut self, now: Now) -> Cmd {
        let ticket = self.aggregator.schedule(now.instant);
        Cmd::ScheduleValidity {
            ticket,
            after: self.aggregator.delay(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// FIFO event queue in front of a [`FormController`].
#[derive(Debug, Default)]
pub struct Dispatcher {
    controller: FormController,
    queue: VecDeque<FormEvent>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(controller: FormController) -> Self {
        Self {
            controller,
            queue: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: FormEvent) {
        self.queue.push_back(event);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue in arrival order, reading `clock` once per event.
    pub fn run_pending(&mut self, clock: &dyn Clock) -> Vec<Cmd> {
        let mut out = Vec::with_capacity(self.queue.len());
        while let Some(event) = self.queue.pop_front() {
            let cmd = self.controller.update(event, clock.now());
            if !cmd.is_none() {
                out.push(cmd);
            }
        }
        out
    }

    #[must_use]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FormController {
        &mut self.controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::focus::{Control, FocusGate};
    use fguard_core::ErrorCode;
    use time::macros::datetime;

    fn clock() -> ManualClock {
        ManualClock::starting_at(datetime!(2026-10-18 12:00))
    }

    fn input(field: FieldId, value: &str) -> FormEvent {
        FormEvent::Input {
            field,
            value: value.to_string(),
        }
    }

    #[test]
    fn batch_collapses() {
        assert_eq!(Cmd::batch(vec![]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::Tick(Duration::from_secs(1))]), Cmd::Tick(Duration::from_secs(1)));
        assert!(matches!(
            Cmd::batch(vec![Cmd::Tick(Duration::ZERO), Cmd::Tick(Duration::ZERO)]),
            Cmd::Batch(v) if v.len() == 2
        ));
    }

    #[test]
    fn input_is_filtered_and_validated() {
        let clock = clock();
        let mut ctl = FormController::default();
        let cmd = ctl.update(input(FieldId::FirstName, "mary-jane3"), clock.now());
        assert!(matches!(cmd, Cmd::ScheduleValidity { .. }));
        let field = ctl.state().field(FieldId::FirstName);
        assert_eq!(field.raw_value, "Mary-Jane");
        assert!(field.is_valid);
    }

    #[test]
    fn blur_on_invalid_value_blocks_and_requests_advisory() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::PostalCode, "4110"), clock.now());
        let cmd = ctl.update(FormEvent::Blur(FieldId::PostalCode), clock.now());
        assert_eq!(ctl.state().focus, FocusGate::Blocked(FieldId::PostalCode));
        let Cmd::Batch(cmds) = cmd else {
            panic!("expected batch, got {cmd:?}");
        };
        assert_eq!(cmds[0], Cmd::Focus(FocusTarget::Field(FieldId::PostalCode)));
        assert!(matches!(&cmds[1], Cmd::Advisory { request, .. } if request.value == "4110"));
    }

    #[test]
    fn blur_on_empty_field_neither_blocks_nor_requests() {
        let clock = clock();
        let mut ctl = FormController::default();
        let cmd = ctl.update(FormEvent::Blur(FieldId::Email), clock.now());
        assert_eq!(cmd, Cmd::None);
        assert_eq!(ctl.state().focus, FocusGate::Unblocked);
        assert!(ctl.state().field(FieldId::Email).touched);
    }

    #[test]
    fn redirect_while_blocked() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::Mobile, "12345"), clock.now());
        ctl.update(FormEvent::Blur(FieldId::Mobile), clock.now());
        assert_eq!(
            ctl.update(FormEvent::FocusRequest(FocusTarget::Control(Control::Terms)), clock.now()),
            Cmd::Focus(FocusTarget::Field(FieldId::Mobile))
        );
        ctl.update(input(FieldId::Mobile, "9845012376"), clock.now());
        assert_eq!(
            ctl.update(FormEvent::FocusRequest(FocusTarget::Control(Control::Terms)), clock.now()),
            Cmd::None
        );
    }

    #[test]
    fn changing_password_revalidates_confirmation() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::Password, "Blue!Ocean42"), clock.now());
        ctl.update(input(FieldId::ConfirmPassword, "Blue!Ocean42"), clock.now());
        assert!(ctl.state().is_valid(FieldId::ConfirmPassword));

        ctl.update(input(FieldId::Password, "Blue!Ocean43"), clock.now());
        let confirm = ctl.state().field(FieldId::ConfirmPassword);
        assert!(!confirm.is_valid);
        assert_eq!(confirm.code, Some(ErrorCode::Mismatch));
    }

    #[test]
    fn dob_drives_minor_flag_and_age() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::Dob, "2011-05-01"), clock.now());
        assert!(ctl.state().is_minor);
        assert_eq!(ctl.state().age, Some(15));
        ctl.update(input(FieldId::Dob, "1990-05-01"), clock.now());
        assert!(!ctl.state().is_minor);
        assert_eq!(ctl.state().age, Some(36));
        ctl.update(input(FieldId::Dob, "2020-01-01"), clock.now());
        assert_eq!(ctl.state().age, None);
        assert_eq!(ctl.state().field(FieldId::Dob).message, "Must be 13+ years old");
    }

    #[test]
    fn enter_advances_or_blocks() {
        let clock = clock();
        let mut ctl = FormController::default();
        assert_eq!(
            ctl.update(FormEvent::Enter(FieldId::Username), clock.now()),
            Cmd::Focus(FocusTarget::Field(FieldId::Username))
        );
        assert!(ctl.state().focus.is_blocked());
        ctl.update(input(FieldId::Username, "jane_doe"), clock.now());
        assert_eq!(
            ctl.update(FormEvent::Enter(FieldId::Username), clock.now()),
            Cmd::Focus(FocusTarget::Field(FieldId::Email))
        );
    }

    #[test]
    fn toggles_set_messages() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(FormEvent::TermsToggled(false), clock.now());
        assert_eq!(ctl.state().toggle_messages.get(&FormToggle::Terms), Some(&"Must agree"));
        ctl.update(FormEvent::TermsToggled(true), clock.now());
        assert!(ctl.state().toggle_messages.is_empty());
        ctl.update(FormEvent::GenderSelected("  ".into()), clock.now());
        assert_eq!(ctl.state().gender, None);
        assert_eq!(
            ctl.state().toggle_messages.get(&FormToggle::Gender),
            Some(&"Gender required")
        );
    }

    #[test]
    fn stale_advisory_response_is_not_shown() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::Username, "jane_doe"), clock.now());
        let Cmd::Advisory { ticket, .. } = ctl.update(FormEvent::Blur(FieldId::Username), clock.now())
        else {
            panic!("expected advisory request");
        };
        ctl.update(input(FieldId::Username, "jane_doe2"), clock.now());
        let cmd = ctl.update(
            FormEvent::AdvisoryCompleted {
                ticket,
                result: Ok(AdvisoryResponse {
                    valid: false,
                    message: "Taken".into(),
                }),
            },
            clock.now(),
        );
        assert_eq!(cmd, Cmd::None);
        assert!(ctl.state().advisory_notes.is_empty());
    }

    #[test]
    fn submit_ignored_until_enabled() {
        let clock = clock();
        let mut ctl = FormController::default();
        assert_eq!(ctl.update(FormEvent::SubmitRequested, clock.now()), Cmd::None);
        assert_eq!(ctl.state().submission, SubmitPhase::Idle);
    }

    #[test]
    fn enter_and_blur_elsewhere_return_to_blocked_field() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::PostalCode, "4110"), clock.now());
        ctl.update(FormEvent::Blur(FieldId::PostalCode), clock.now());
        ctl.update(input(FieldId::City, "Pune"), clock.now());

        let back = Cmd::Focus(FocusTarget::Field(FieldId::PostalCode));
        assert_eq!(ctl.update(FormEvent::Enter(FieldId::City), clock.now()), back);
        assert_eq!(ctl.update(FormEvent::Enter(FieldId::Mobile), clock.now()), back);
        assert_eq!(ctl.update(FormEvent::Blur(FieldId::City), clock.now()), back);
        assert_eq!(ctl.state().focus, FocusGate::Blocked(FieldId::PostalCode));
        assert!(!ctl.state().is_valid(FieldId::PostalCode));
    }

    #[test]
    fn reset_clears_the_advisory_trace() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::City, "Pune"), clock.now());
        ctl.update(FormEvent::Blur(FieldId::City), clock.now());
        assert!(!ctl.advisory().trace().is_empty());
        ctl.update(FormEvent::Reset, clock.now());
        assert!(ctl.advisory().trace().is_empty());
    }

    #[test]
    fn reset_returns_focus_to_first_field() {
        let clock = clock();
        let mut ctl = FormController::default();
        ctl.update(input(FieldId::Email, "jane@example.com"), clock.now());
        assert_eq!(
            ctl.update(FormEvent::Reset, clock.now()),
            Cmd::Focus(FocusTarget::Field(FieldId::FirstName))
        );
        assert_eq!(ctl.state().value(FieldId::Email), "");
    }

    #[test]
    fn dispatcher_drains_in_order() {
        let clock = clock();
        let mut dispatcher = Dispatcher::default();
        dispatcher.push(input(FieldId::City, "Pune"));
        dispatcher.push(FormEvent::Blur(FieldId::City));
        dispatcher.push(FormEvent::Tick);
        assert_eq!(dispatcher.pending(), 3);
        let cmds = dispatcher.run_pending(&clock);
        assert_eq!(dispatcher.pending(), 0);
        assert_eq!(cmds.len(), 2);
        assert!(matches!(cmds[0], Cmd::ScheduleValidity { .. }));
        assert!(matches!(cmds[1], Cmd::Advisory { .. }));
        assert!(dispatcher.controller().state().is_valid(FieldId::City));
    }
}
