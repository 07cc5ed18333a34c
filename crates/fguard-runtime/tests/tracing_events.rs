#![forbid(unsafe_code)]

//! Log events emitted at the runtime's decision points.

use std::sync::{Arc, Mutex};

use fguard_runtime::simulator::{AdvisoryMode, FormSimulator};
use fguard_runtime::{
    AdvisoryError, AdvisoryRequest, AdvisoryResponse, FieldId, FormEvent, RegistrationPayload,
    RegistrationResponse, SubmitError,
};
use time::macros::datetime;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

// ============================================================================
// Test Infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    message: String,
}

/// A tracing Layer that records every event's level and message.
struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for EventCapture {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.0,
        });
    }
}

fn with_captured_events<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(EventCapture {
            events: events.clone(),
        });
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn has(events: &[CapturedEvent], level: Level, message: &str) -> bool {
    events
        .iter()
        .any(|e| e.level == level && e.message == message)
}

fn sim() -> FormSimulator {
    FormSimulator::new(datetime!(2026-10-18 12:00))
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn focus_transitions_are_logged() {
    let events = with_captured_events(|| {
        let mut sim = sim();
        sim.fill(FieldId::PostalCode, "41");
        sim.type_into(FieldId::City, "Pune");
        sim.type_into(FieldId::PostalCode, "411001");
    });
    assert!(has(&events, Level::DEBUG, "focus blocked"));
    assert!(has(&events, Level::DEBUG, "focus redirected to blocked field"));
    assert!(has(&events, Level::DEBUG, "focus unblocked"));
}

#[test]
fn anomalies_are_logged_with_reason() {
    let events = with_captured_events(|| {
        let mut sim = sim();
        sim.type_into(FieldId::Username, "kukuku");
    });
    assert!(has(&events, Level::DEBUG, "anomalous value rejected"));
}

#[test]
fn advisory_failures_warn() {
    let events = with_captured_events(|| {
        let mut sim = sim().with_advisory_service(
            |_: &AdvisoryRequest| -> Result<AdvisoryResponse, AdvisoryError> {
                Err(AdvisoryError::Decode("unexpected end of input".into()))
            },
        );
        sim.fill(FieldId::City, "Pune");
    });
    assert!(has(&events, Level::WARN, "advisory validation failed"));
}

#[test]
fn stale_advisories_are_logged() {
    let events = with_captured_events(|| {
        let mut sim = sim().with_advisory_mode(AdvisoryMode::Deferred);
        sim.fill(FieldId::City, "Pune");
        sim.type_into(FieldId::City, "Mumbai");
        sim.resolve_advisories();
    });
    assert!(has(&events, Level::DEBUG, "stale advisory response discarded"));
}

#[test]
fn refused_submit_is_logged_without_warning() {
    let events = with_captured_events(|| {
        let mut sim = sim().with_registration_service(
            |_: &RegistrationPayload| -> Result<RegistrationResponse, SubmitError> {
                Err(SubmitError::Transport("reset by peer".into()))
            },
        );
        sim.send(FormEvent::SubmitRequested);
        assert!(sim.submissions().is_empty());
    });
    assert!(has(&events, Level::DEBUG, "submit ignored: form not ready"));
    assert!(!events.iter().any(|e| e.level == Level::WARN));
}
