#![forbid(unsafe_code)]

//! Deterministic form simulator for testing.
//!
//! `FormSimulator` runs a [`FormController`] against a [`ManualClock`] and
//! scripted backends. Commands are executed in-process: timers go on a
//! virtual timeline that only [`advance`](FormSimulator::advance) moves,
//! advisory calls are answered immediately or held until resolved, and
//! submissions call the registration service synchronously.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use fguard_runtime::simulator::FormSimulator;
//! use fguard_runtime::{FieldId, FormEvent};
//! use time::macros::datetime;
//!
//! let mut sim = FormSimulator::new(datetime!(2026-10-18 12:00));
//! sim.send(FormEvent::Input { field: FieldId::City, value: "Pune".into() });
//! sim.advance(Duration::from_millis(50));
//! assert!(sim.state().is_valid(FieldId::City));
//! assert!(!sim.state().submit_enabled);
//! ```

use std::time::Duration;

use time::PrimitiveDateTime;

use crate::advisory::{
    AdvisoryError, AdvisoryRequest, AdvisoryResponse, AdvisoryService, AdvisoryTicket,
};
use crate::clock::{Clock, ManualClock};
use crate::controller::{Cmd, FormController, FormEvent};
use crate::field::FieldId;
use crate::focus::FocusTarget;
use crate::state::FormState;
use crate::submit::{RegistrationPayload, RegistrationResponse, RegistrationService, SubmitError};

/// Record of a command that was executed during simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Batch(usize),
    Focus(FocusTarget),
    /// Validity check armed for this delay.
    ScheduleValidity(Duration),
    Tick(Duration),
    Advisory(AdvisoryTicket),
    /// Submission with this many payload entries.
    Submit(usize),
}

/// How advisory commands are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AdvisoryMode {
    /// Call the service as soon as the command is executed.
    #[default]
    Immediate,
    /// Hold requests until [`FormSimulator::resolve_advisories`].
    Deferred,
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    seq: u64,
    event: FormEvent,
}

/// Deterministic simulator for [`FormController`] testing.
pub struct FormSimulator {
    controller: FormController,
    clock: ManualClock,
    advisory_service: Box<dyn AdvisoryService>,
    registration_service: Box<dyn RegistrationService>,
    advisory_mode: AdvisoryMode,
    deferred: Vec<(AdvisoryTicket, AdvisoryRequest)>,
    timers: Vec<Timer>,
    next_seq: u64,
    focused: Option<FocusTarget>,
    command_log: Vec<CmdRecord>,
    submissions: Vec<RegistrationPayload>,
}

impl FormSimulator {
    /// Default controller, an advisory service that approves everything, and
    /// a registration service that accepts everything.
    #[must_use]
    pub fn new(wall: PrimitiveDateTime) -> Self {
        Self::with_controller(FormController::default(), wall)
    }

    #[must_use]
    pub fn with_controller(controller: FormController, wall: PrimitiveDateTime) -> Self {
        Self {
            controller,
            clock: ManualClock::starting_at(wall),
            advisory_service: Box::new(approve_all),
            registration_service: Box::new(accept_all),
            advisory_mode: AdvisoryMode::Immediate,
            deferred: Vec::new(),
            timers: Vec::new(),
            next_seq: 0,
            focused: None,
            command_log: Vec::new(),
            submissions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_advisory_service(mut self, service: impl AdvisoryService + 'static) -> Self {
        self.advisory_service = Box::new(service);
        self
    }

    #[must_use]
    pub fn with_registration_service(
        mut self,
        service: impl RegistrationService + 'static,
    ) -> Self {
        self.registration_service = Box::new(service);
        self
    }

    #[must_use]
    pub fn with_advisory_mode(mut self, mode: AdvisoryMode) -> Self {
        self.advisory_mode = mode;
        self
    }

    /// Change how later advisory requests are answered. Already deferred
    /// requests stay queued.
    pub fn set_advisory_mode(&mut self, mode: AdvisoryMode) {
        self.advisory_mode = mode;
    }

    /// Dispatch one event at the current simulated time.
    pub fn send(&mut self, event: FormEvent) {
        let cmd = self.controller.update(event, self.clock.now());
        self.execute_cmd(cmd);
    }

    /// Ask to move focus to `target`. A redirect overrides the move.
    pub fn focus(&mut self, target: FocusTarget) {
        self.focused = Some(target);
        self.send(FormEvent::FocusRequest(target));
    }

    /// Focus `field` and replace its value.
    pub fn type_into(&mut self, field: FieldId, value: &str) {
        self.focus(FocusTarget::Field(field));
        if self.focused == Some(FocusTarget::Field(field)) {
            self.send(FormEvent::Input {
                field,
                value: value.to_string(),
            });
        }
    }

    /// Type into `field`, then leave it.
    pub fn fill(&mut self, field: FieldId, value: &str) {
        self.type_into(field, value);
        self.send(FormEvent::Blur(field));
    }

    /// Move the clock forward, firing due timers in order.
    pub fn advance(&mut self, by: Duration) {
        let target = self.clock.elapsed() + by;
        while let Some(idx) = self.next_due(target) {
            let timer = self.timers.swap_remove(idx);
            let now = self.clock.elapsed();
            if timer.due > now {
                self.clock.advance(timer.due - now);
            }
            self.send(timer.event);
        }
        let now = self.clock.elapsed();
        if target > now {
            self.clock.advance(target - now);
        }
    }

    /// Answer every held advisory request, oldest first.
    pub fn resolve_advisories(&mut self) {
        let pending = std::mem::take(&mut self.deferred);
        for (ticket, request) in pending {
            self.answer_advisory(ticket, &request);
        }
    }

    /// Answer held advisory requests newest first.
    pub fn resolve_advisories_reversed(&mut self) {
        let mut pending = std::mem::take(&mut self.deferred);
        pending.reverse();
        for (ticket, request) in pending {
            self.answer_advisory(ticket, &request);
        }
    }

    #[must_use]
    pub fn pending_advisories(&self) -> usize {
        self.deferred.len()
    }

    #[must_use]
    pub fn focused(&self) -> Option<FocusTarget> {
        self.focused
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        self.controller.state()
    }

    #[must_use]
    pub fn controller(&self) -> &FormController {
        &self.controller
    }

    #[must_use]
    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    /// Payloads handed to the registration service.
    #[must_use]
    pub fn submissions(&self) -> &[RegistrationPayload] {
        &self.submissions
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    pub fn clear_log(&mut self) {
        self.command_log.clear();
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(idx, _)| idx)
    }

    fn schedule(&mut self, after: Duration, event: FormEvent) {
        self.timers.push(Timer {
            due: self.clock.elapsed() + after,
            seq: self.next_seq,
            event,
        });
        self.next_seq += 1;
    }

    fn answer_advisory(&mut self, ticket: AdvisoryTicket, request: &AdvisoryRequest) {
        let result = self.advisory_service.validate(request);
        self.send(FormEvent::AdvisoryCompleted { ticket, result });
    }

    /// Execute a command without IO.
    fn execute_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                }
            }
            Cmd::Focus(target) => {
                self.focused = Some(target);
                self.command_log.push(CmdRecord::Focus(target));
            }
            Cmd::ScheduleValidity { ticket, after } => {
                self.command_log.push(CmdRecord::ScheduleValidity(after));
                self.schedule(after, FormEvent::TimerFired(ticket));
            }
            Cmd::Tick(after) => {
                self.command_log.push(CmdRecord::Tick(after));
                self.schedule(after, FormEvent::Tick);
            }
            Cmd::Advisory { ticket, request } => {
                self.command_log.push(CmdRecord::Advisory(ticket));
                match self.advisory_mode {
                    AdvisoryMode::Immediate => self.answer_advisory(ticket, &request),
                    AdvisoryMode::Deferred => self.deferred.push((ticket, request)),
                }
            }
            Cmd::Submit(payload) => {
                self.command_log.push(CmdRecord::Submit(payload.len()));
                let reply = self.registration_service.register(&payload);
                self.submissions.push(payload);
                self.send(FormEvent::SubmitCompleted(reply));
            }
        }
    }
}

fn approve_all(_: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
    Ok(AdvisoryResponse {
        valid: true,
        message: "Looks good".to_string(),
    })
}

fn accept_all(_: &RegistrationPayload) -> Result<RegistrationResponse, SubmitError> {
    Ok(RegistrationResponse {
        success: true,
        message: "Registration successful".to_string(),
    })
}
