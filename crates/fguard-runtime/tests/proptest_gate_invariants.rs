//! Property-based invariant tests for the form runtime.
//!
//! 1. While the gate is blocked, focus requests for other fields and controls
//!    are redirected to the blocked field; the page body is always allowed.
//! 2. The gate only releases when the blocked field validates, is entered
//!    while valid, or on reset. Blur and Enter on any other field never
//!    move the block.
//! 3. A debouncer fires only its most recent ticket, and only once.
//! 4. `evaluate` is ready iff every gating condition holds.
//! 5. Advisory responses apply iff nothing touched the field since the
//!    request; traces always satisfy their invariants.
//! 6. Replaying an event script yields identical state and trace checksum.

use std::time::{Duration, Instant};

use fguard_core::ValidationResult;
use fguard_runtime::{
    AdvisoryCoordinator, AdvisoryResponse, Control, Debouncer, EnterOutcome, FieldId,
    FocusDecision, FocusGate, FocusTarget, FormEvent, FormState, evaluate,
};
use fguard_runtime::simulator::FormSimulator;
use proptest::prelude::*;
use time::macros::datetime;

// ── Helpers ─────────────────────────────────────────────────────────────

fn field_strategy() -> impl Strategy<Value = FieldId> {
    proptest::sample::select(FieldId::TAB_ORDER.to_vec())
}

fn control_strategy() -> impl Strategy<Value = Control> {
    proptest::sample::select(vec![
        Control::Gender,
        Control::Terms,
        Control::GuardianConsent,
        Control::Photo,
        Control::Submit,
    ])
}

fn target_strategy() -> impl Strategy<Value = FocusTarget> {
    prop_oneof![
        field_strategy().prop_map(FocusTarget::Field),
        control_strategy().prop_map(FocusTarget::Control),
        Just(FocusTarget::Body),
    ]
}

#[derive(Debug, Clone)]
enum GateOp {
    Blur { field: FieldId, empty: bool, valid: bool },
    Enter { field: FieldId, valid: bool },
    Validated { field: FieldId, valid: bool },
    Reset,
}

fn gate_op_strategy() -> impl Strategy<Value = GateOp> {
    prop_oneof![
        4 => (field_strategy(), any::<bool>(), any::<bool>())
            .prop_map(|(field, empty, valid)| GateOp::Blur { field, empty, valid }),
        2 => (field_strategy(), any::<bool>())
            .prop_map(|(field, valid)| GateOp::Enter { field, valid }),
        4 => (field_strategy(), any::<bool>())
            .prop_map(|(field, valid)| GateOp::Validated { field, valid }),
        1 => Just(GateOp::Reset),
    ]
}

fn apply(gate: &mut FocusGate, op: &GateOp) {
    match *op {
        GateOp::Blur { field, empty, valid } => {
            gate.on_blur(field, empty, valid);
        }
        GateOp::Enter { field, valid } => {
            gate.on_enter(field, valid, false);
        }
        GateOp::Validated { field, valid } => gate.on_validated(field, valid),
        GateOp::Reset => gate.reset(),
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Redirects while blocked
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn blocked_gate_redirects_other_targets(
        ops in proptest::collection::vec(gate_op_strategy(), 0..40),
        target in target_strategy(),
    ) {
        let mut gate = FocusGate::default();
        for op in &ops {
            apply(&mut gate, op);
        }
        let decision = gate.on_focus_request(target);
        match (gate.blocked(), target) {
            (None, _) | (Some(_), FocusTarget::Body) => {
                prop_assert_eq!(decision, FocusDecision::Allow);
            }
            (Some(blocked), FocusTarget::Field(f)) if f == blocked => {
                prop_assert_eq!(decision, FocusDecision::Allow);
            }
            (Some(blocked), _) => {
                prop_assert_eq!(decision, FocusDecision::Redirect(blocked));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Release conditions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn gate_releases_only_through_the_blocked_field(
        ops in proptest::collection::vec(gate_op_strategy(), 1..40),
    ) {
        let mut gate = FocusGate::default();
        for op in &ops {
            let before = gate.blocked();
            apply(&mut gate, op);
            if let (Some(blocked), None) = (before, gate.blocked()) {
                let released_legitimately = match *op {
                    GateOp::Validated { field, valid } => field == blocked && valid,
                    GateOp::Enter { field, valid } => field == blocked && valid,
                    GateOp::Reset => true,
                    GateOp::Blur { .. } => false,
                };
                prop_assert!(released_legitimately, "released {} via {:?}", blocked, op);
            }
        }
    }

    #[test]
    fn invalid_non_empty_blur_blocks_an_open_gate(field in field_strategy(), ops in proptest::collection::vec(gate_op_strategy(), 0..10)) {
        let mut gate = FocusGate::default();
        for op in &ops {
            apply(&mut gate, op);
        }
        let before = gate.blocked();
        let decision = gate.on_blur(field, false, false);
        match before {
            Some(blocked) if blocked != field => {
                prop_assert_eq!(decision, FocusDecision::Redirect(blocked));
                prop_assert_eq!(gate.blocked(), Some(blocked));
            }
            _ => {
                prop_assert_eq!(decision, FocusDecision::Allow);
                prop_assert_eq!(gate.blocked(), Some(field));
            }
        }
    }

    #[test]
    fn blocked_field_is_never_replaced(
        ops in proptest::collection::vec(gate_op_strategy(), 1..40),
    ) {
        let mut gate = FocusGate::default();
        for op in &ops {
            let before = gate.blocked();
            apply(&mut gate, op);
            if let (Some(blocked), Some(after)) = (before, gate.blocked()) {
                prop_assert_eq!(after, blocked, "block moved via {:?}", op);
            }
        }
    }

    #[test]
    fn enter_elsewhere_is_held(
        blocked in field_strategy(),
        field in field_strategy(),
        valid in any::<bool>(),
        is_minor in any::<bool>(),
    ) {
        prop_assume!(blocked != field);
        let mut gate = FocusGate::Blocked(blocked);
        prop_assert_eq!(gate.on_enter(field, valid, is_minor), EnterOutcome::Held(blocked));
        prop_assert_eq!(gate, FocusGate::Blocked(blocked));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Debounce latest-wins
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn only_latest_ticket_fires(gaps in proptest::collection::vec(0u64..120, 1..20)) {
        let delay = Duration::from_millis(50);
        let mut debouncer = Debouncer::new(delay);
        let t0 = Instant::now();
        let mut now = t0;
        let mut tickets = Vec::new();
        for gap in &gaps {
            now += Duration::from_millis(*gap);
            tickets.push(debouncer.trigger(now));
        }
        let late = now + delay;
        let (last, stale) = tickets.split_last().expect("at least one trigger");
        for ticket in stale {
            prop_assert!(!debouncer.fire(*ticket, late));
        }
        prop_assert!(debouncer.fire(*last, late));
        prop_assert!(!debouncer.fire(*last, late));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Whole-form readiness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ready_iff_all_conditions_hold(
        valid in proptest::collection::vec(any::<bool>(), 19),
        is_minor in any::<bool>(),
        gender in any::<bool>(),
        terms in any::<bool>(),
        photo in any::<bool>(),
        consent in any::<bool>(),
    ) {
        let mut state = FormState::new();
        for (id, ok) in FieldId::TAB_ORDER.iter().zip(&valid) {
            if *ok {
                state.field_mut(*id).apply(&ValidationResult::Valid);
            }
        }
        state.is_minor = is_minor;
        state.gender = gender.then(|| "other".to_string());
        state.terms_accepted = terms;
        state.photo = photo.then(|| "data:image/png;base64,AA".to_string());
        state.guardian_consent = consent;

        let fields_ok = FieldId::TAB_ORDER
            .iter()
            .zip(&valid)
            .all(|(id, ok)| *ok || (id.is_guardian() && !is_minor));
        let expected = fields_ok && gender && terms && photo && (!is_minor || consent);
        prop_assert_eq!(evaluate(&state).is_ready(), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Advisory generations
// ═════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum AdvisoryOp {
    Bump(FieldId),
    Issue(FieldId),
    /// Answer the n-th outstanding request (modulo the count).
    Answer(usize),
}

fn advisory_op_strategy() -> impl Strategy<Value = AdvisoryOp> {
    let few_fields = proptest::sample::select(vec![FieldId::Username, FieldId::Email, FieldId::Mobile]);
    prop_oneof![
        few_fields.clone().prop_map(AdvisoryOp::Bump),
        few_fields.prop_map(AdvisoryOp::Issue),
        any::<usize>().prop_map(AdvisoryOp::Answer),
    ]
}

proptest! {
    #[test]
    fn responses_apply_iff_field_untouched(ops in proptest::collection::vec(advisory_op_strategy(), 1..60)) {
        let mut coord = AdvisoryCoordinator::new();
        let mut outstanding = Vec::new();
        let response = AdvisoryResponse { valid: true, message: String::new() };

        for op in ops {
            match op {
                AdvisoryOp::Bump(field) => {
                    coord.bump(field);
                }
                AdvisoryOp::Issue(field) => outstanding.push(coord.issue(field)),
                AdvisoryOp::Answer(n) => {
                    if outstanding.is_empty() {
                        continue;
                    }
                    let ticket = outstanding.remove(n % outstanding.len());
                    let expected = coord.current(ticket.field) == ticket.generation;
                    prop_assert_eq!(coord.accept(ticket, &response), expected);
                }
            }
        }
        let violations = coord.trace().verify_invariants();
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Determinism
// ═════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum Step {
    Type(FieldId, String),
    Blur(FieldId),
    Enter(FieldId),
    Focus(FocusTarget),
    Terms(bool),
    Wait(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => (field_strategy(), "[a-zA-Z0-9 @.!_-]{0,16}").prop_map(|(f, v)| Step::Type(f, v)),
        2 => field_strategy().prop_map(Step::Blur),
        1 => field_strategy().prop_map(Step::Enter),
        2 => target_strategy().prop_map(Step::Focus),
        1 => any::<bool>().prop_map(Step::Terms),
        2 => (0u64..200).prop_map(Step::Wait),
    ]
}

fn replay(steps: &[Step]) -> (String, u64, Option<FocusTarget>) {
    let mut sim = FormSimulator::new(datetime!(2026-10-18 12:00));
    for step in steps {
        match step {
            Step::Type(field, value) => sim.type_into(*field, value),
            Step::Blur(field) => sim.send(FormEvent::Blur(*field)),
            Step::Enter(field) => sim.send(FormEvent::Enter(*field)),
            Step::Focus(target) => sim.focus(*target),
            Step::Terms(on) => sim.send(FormEvent::TermsToggled(*on)),
            Step::Wait(ms) => sim.advance(Duration::from_millis(*ms)),
        }
    }
    let fields: Vec<_> = sim.state().fields().cloned().collect();
    let snapshot = serde_json::to_string(&fields).expect("field state serialises");
    (
        snapshot,
        sim.controller().advisory().trace().checksum(),
        sim.focused(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn replay_is_deterministic(steps in proptest::collection::vec(step_strategy(), 0..30)) {
        prop_assert_eq!(replay(&steps), replay(&steps));
    }
}
