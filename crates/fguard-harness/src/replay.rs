#![forbid(unsafe_code)]

//! JSON-lines event scripts.
//!
//! Each non-blank line is one [`ReplayStep`], tagged by `"type"`:
//!
//! ```text
//! {"type":"input","field":"email","value":"jane@example.org"}
//! {"type":"blur","field":"email"}
//! {"type":"focus","target":{"control":"submit"}}
//! {"type":"wait","ms":50}
//! {"type":"submit"}
//! ```
//!
//! Lines starting with `#` are comments.

use std::io::BufRead;
use std::time::Duration;

use fguard_core::{FieldContext, FieldValidatorRegistry};
use fguard_runtime::simulator::{AdvisoryMode, FormSimulator};
use fguard_runtime::{
    AdvisoryError, AdvisoryRequest, AdvisoryResponse, Blocker, FieldState, FieldId, FocusGate,
    FocusTarget, FormController, FormEvent, SubmitPhase, evaluate,
};
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;
use tracing::{debug, info};

use crate::error::HarnessError;

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayStep {
    /// Focus `field` and replace its value.
    Input { field: FieldId, value: String },
    Blur { field: FieldId },
    Enter { field: FieldId },
    Focus { target: FocusTarget },
    Gender { value: String },
    Terms { accepted: bool },
    GuardianConsent { given: bool },
    /// `null` clears the photo.
    Photo { data: Option<String> },
    Wait { ms: u64 },
    Submit,
    Reset,
    /// Switch advisory answers to deferred (`true`) or immediate.
    HoldAdvisories { hold: bool },
    ResolveAdvisories,
}

/// Parse a script, skipping blank lines and `#` comments.
pub fn parse_script(reader: impl BufRead) -> Result<Vec<ReplayStep>, HarnessError> {
    let mut steps = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let step = serde_json::from_str(trimmed).map_err(|source| HarnessError::Script {
            line: idx + 1,
            source,
        })?;
        steps.push(step);
    }
    Ok(steps)
}

/// Final form state after a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplaySummary {
    pub steps: usize,
    pub elapsed_ms: u128,
    pub submit_enabled: bool,
    pub blockers: Vec<Blocker>,
    pub submission: SubmitPhase,
    pub submissions: usize,
    pub is_minor: bool,
    pub age: Option<u32>,
    pub focus: FocusGate,
    pub focused: Option<FocusTarget>,
    pub fields: Vec<FieldState>,
    pub advisory_events: usize,
    pub advisory_checksum: u64,
}

/// Run `steps` against a fresh form evaluated at `wall`.
///
/// Advisory requests are answered locally by re-running the registry, so a
/// replay needs no backend.
pub fn run(
    steps: &[ReplayStep],
    registry: FieldValidatorRegistry,
    wall: PrimitiveDateTime,
) -> ReplaySummary {
    let advisor = registry.clone();
    let controller = FormController::new(registry, Default::default());
    let mut sim = FormSimulator::with_controller(controller, wall).with_advisory_service(
        move |req: &AdvisoryRequest| -> Result<AdvisoryResponse, AdvisoryError> {
            Ok(local_advice(&advisor, req, wall))
        },
    );

    for (idx, step) in steps.iter().enumerate() {
        debug!(step = idx + 1, ?step, "replay step");
        apply(&mut sim, step);
    }

    let state = sim.state();
    let trace = sim.controller().advisory().trace();
    let summary = ReplaySummary {
        steps: steps.len(),
        elapsed_ms: sim.elapsed().as_millis(),
        submit_enabled: state.submit_enabled,
        blockers: evaluate(state).blockers,
        submission: state.submission.clone(),
        submissions: sim.submissions().len(),
        is_minor: state.is_minor,
        age: state.age,
        focus: state.focus,
        focused: sim.focused(),
        fields: state.fields().cloned().collect(),
        advisory_events: trace.len(),
        advisory_checksum: trace.checksum(),
    };
    info!(
        steps = summary.steps,
        submit_enabled = summary.submit_enabled,
        "replay finished"
    );
    summary
}

fn apply(sim: &mut FormSimulator, step: &ReplayStep) {
    match step {
        ReplayStep::Input { field, value } => sim.type_into(*field, value),
        ReplayStep::Blur { field } => sim.send(FormEvent::Blur(*field)),
        ReplayStep::Enter { field } => sim.send(FormEvent::Enter(*field)),
        ReplayStep::Focus { target } => sim.focus(*target),
        ReplayStep::Gender { value } => sim.send(FormEvent::GenderSelected(value.clone())),
        ReplayStep::Terms { accepted } => sim.send(FormEvent::TermsToggled(*accepted)),
        ReplayStep::GuardianConsent { given } => {
            sim.send(FormEvent::GuardianConsentToggled(*given));
        }
        ReplayStep::Photo { data: Some(data) } => sim.send(FormEvent::PhotoAccepted(data.clone())),
        ReplayStep::Photo { data: None } => sim.send(FormEvent::PhotoCleared),
        ReplayStep::Wait { ms } => sim.advance(Duration::from_millis(*ms)),
        ReplayStep::Submit => sim.send(FormEvent::SubmitRequested),
        ReplayStep::Reset => sim.send(FormEvent::Reset),
        ReplayStep::HoldAdvisories { hold } => {
            let mode = if *hold {
                AdvisoryMode::Deferred
            } else {
                AdvisoryMode::Immediate
            };
            sim.set_advisory_mode(mode);
        }
        ReplayStep::ResolveAdvisories => sim.resolve_advisories(),
    }
}

fn local_advice(
    registry: &FieldValidatorRegistry,
    req: &AdvisoryRequest,
    wall: PrimitiveDateTime,
) -> AdvisoryResponse {
    let mut ctx = FieldContext::default().with_now(wall);
    if let Some(password) = &req.password_value {
        ctx = ctx.with_password(password);
    }
    let result = registry.validate_with(req.field.kind(), &req.value, &ctx);
    let message = if result.is_valid() {
        "Looks good".to_string()
    } else {
        result.message()
    };
    AdvisoryResponse {
        valid: result.is_valid(),
        message,
    }
}
