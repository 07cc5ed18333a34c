#![forbid(unsafe_code)]

//! Advisory (server-side) validation with per-field generation tickets.
//!
//! Advisory responses are informational: they never change a field's
//! validity, only show a short-lived note. Because they arrive
//! asynchronously, a response may describe a value the user has since
//! changed. Each field therefore carries a monotonically increasing
//! [`Generation`]:
//!
//! 1. Every local validation of a field bumps its generation.
//! 2. Every advisory request bumps it again and carries the new value in its
//!    [`AdvisoryTicket`].
//! 3. A response is applied only if its ticket still matches the field's
//!    current generation; otherwise it is discarded as stale.
//!
//! All lifecycle events are recorded in an [`AdvisoryTrace`] that can be
//! checksummed for determinism tests.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::field::FieldId;

// ---------------------------------------------------------------------------
// Generation / AdvisoryTicket
// ---------------------------------------------------------------------------

/// Per-field version counter. Generation 0 means "never validated".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub const NONE: Self = Self(0);

    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gen({})", self.0)
    }
}

/// Identifies one advisory request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdvisoryTicket {
    pub field: FieldId,
    pub generation: Generation,
}

impl fmt::Display for AdvisoryTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.field, self.generation)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Body of an advisory request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub field: FieldId,
    /// Trimmed field value.
    pub value: String,
    /// Current password; only sent for the confirm-password field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_value: Option<String>,
}

/// The backend's opinion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub valid: bool,
    pub message: String,
}

/// A displayed advisory message with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryNote {
    pub valid: bool,
    pub message: String,
    pub expires_at: Instant,
}

/// Why an advisory call produced no response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryError {
    /// The request could not be delivered.
    Transport(String),
    /// The response body was not understood.
    Decode(String),
}

impl fmt::Display for AdvisoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvisoryError::Transport(msg) => write!(f, "advisory transport error: {msg}"),
            AdvisoryError::Decode(msg) => write!(f, "advisory decode error: {msg}"),
        }
    }
}

impl std::error::Error for AdvisoryError {}

impl From<serde_json::Error> for AdvisoryError {
    fn from(e: serde_json::Error) -> Self {
        AdvisoryError::Decode(e.to_string())
    }
}

/// Backend that offers advisory opinions.
pub trait AdvisoryService {
    fn validate(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError>;
}

impl<F> AdvisoryService for F
where
    F: Fn(&AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError>,
{
    fn validate(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        self(request)
    }
}

// ---------------------------------------------------------------------------
// AdvisoryEvent / AdvisoryTrace
// ---------------------------------------------------------------------------

/// An event in the advisory lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AdvisoryEvent {
    /// Local validation moved the field to a new generation.
    Bumped { field: FieldId, generation: Generation },
    /// A request was issued.
    Requested { ticket: AdvisoryTicket },
    /// A current response was shown.
    Applied { ticket: AdvisoryTicket, valid: bool },
    /// A response arrived for an outdated generation.
    StaleDiscarded {
        ticket: AdvisoryTicket,
        current: Generation,
    },
    /// The call failed; nothing was shown.
    Failed { ticket: AdvisoryTicket },
}

impl AdvisoryEvent {
    #[must_use]
    pub fn field(&self) -> FieldId {
        match self {
            Self::Bumped { field, .. } => *field,
            Self::Requested { ticket }
            | Self::Applied { ticket, .. }
            | Self::StaleDiscarded { ticket, .. }
            | Self::Failed { ticket } => ticket.field,
        }
    }

    /// Event type name for logging.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Bumped { .. } => "bumped",
            Self::Requested { .. } => "requested",
            Self::Applied { .. } => "applied",
            Self::StaleDiscarded { .. } => "stale_discarded",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Ordered record of advisory activity.
#[derive(Debug, Clone, Default)]
pub struct AdvisoryTrace {
    events: Vec<AdvisoryEvent>,
}

impl AdvisoryTrace {
    pub fn push(&mut self, event: AdvisoryEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[AdvisoryEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events of `event_type` for `field`.
    #[must_use]
    pub fn count(&self, field: FieldId, event_type: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.field() == field && e.event_type() == event_type)
            .count()
    }

    /// Checksum over event data and order, for golden comparison.
    #[must_use]
    pub fn checksum(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for event in &self.events {
            event.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Returns a description of every broken invariant.
    ///
    /// - generations bumped or requested per field are strictly increasing
    /// - a stale discard always names a newer current generation
    #[must_use]
    pub fn verify_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut last: BTreeMap<FieldId, Generation> = BTreeMap::new();

        for event in &self.events {
            let (field, generation) = match event {
                AdvisoryEvent::Bumped { field, generation } => (*field, *generation),
                AdvisoryEvent::Requested { ticket } => (ticket.field, ticket.generation),
                AdvisoryEvent::StaleDiscarded { ticket, current } => {
                    if ticket.generation >= *current {
                        violations.push(format!(
                            "StaleDiscarded with non-stale ticket: {ticket} >= {current}"
                        ));
                    }
                    continue;
                }
                AdvisoryEvent::Applied { .. } | AdvisoryEvent::Failed { .. } => continue,
            };
            let previous = last.insert(field, generation).unwrap_or(Generation::NONE);
            if generation <= previous {
                violations.push(format!(
                    "Non-monotonic generation for {field}: {generation} after {previous}"
                ));
            }
        }
        violations
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// ---------------------------------------------------------------------------
// AdvisoryCoordinator
// ---------------------------------------------------------------------------

/// Owns the per-field generation counters and the trace.
#[derive(Debug, Clone, Default)]
pub struct AdvisoryCoordinator {
    generations: BTreeMap<FieldId, Generation>,
    trace: AdvisoryTrace,
}

impl AdvisoryCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation of `field`.
    #[must_use]
    pub fn current(&self, field: FieldId) -> Generation {
        self.generations.get(&field).copied().unwrap_or_default()
    }

    /// Record a local validation of `field`.
    pub fn bump(&mut self, field: FieldId) -> Generation {
        let generation = self.advance(field);
        self.trace.push(AdvisoryEvent::Bumped { field, generation });
        generation
    }

    /// Issue a request ticket for `field`.
    pub fn issue(&mut self, field: FieldId) -> AdvisoryTicket {
        let generation = self.advance(field);
        let ticket = AdvisoryTicket { field, generation };
        self.trace.push(AdvisoryEvent::Requested { ticket });
        ticket
    }

    #[must_use]
    pub fn is_current(&self, ticket: AdvisoryTicket) -> bool {
        self.current(ticket.field) == ticket.generation
    }

    /// Decide whether a response may be shown. Records the outcome.
    pub fn accept(&mut self, ticket: AdvisoryTicket, response: &AdvisoryResponse) -> bool {
        let current = self.current(ticket.field);
        if ticket.generation != current {
            debug!(%ticket, %current, "stale advisory response discarded");
            self.trace
                .push(AdvisoryEvent::StaleDiscarded { ticket, current });
            return false;
        }
        self.trace.push(AdvisoryEvent::Applied {
            ticket,
            valid: response.valid,
        });
        true
    }

    /// Record a failed call. Failures are logged and otherwise ignored.
    pub fn fail(&mut self, ticket: AdvisoryTicket, error: &AdvisoryError) {
        warn!(%ticket, %error, "advisory validation failed");
        self.trace.push(AdvisoryEvent::Failed { ticket });
    }

    /// Invalidate every outstanding ticket (form reset). Counters keep
    /// increasing so pre-reset responses stay stale.
    pub fn invalidate_all(&mut self) {
        let fields: Vec<FieldId> = self.generations.keys().copied().collect();
        for field in fields {
            self.bump(field);
        }
    }

    #[must_use]
    pub fn trace(&self) -> &AdvisoryTrace {
        &self.trace
    }

    pub fn trace_mut(&mut self) -> &mut AdvisoryTrace {
        &mut self.trace
    }

    fn advance(&mut self, field: FieldId) -> Generation {
        let slot = self.generations.entry(field).or_default();
        *slot = Generation(slot.0 + 1);
        *slot
    }
}
