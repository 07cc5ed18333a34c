#![forbid(unsafe_code)]

//! Runtime: form state, debounced submit gating, focus blocking, and
//! advisory coordination on top of `fguard-core`.
//!
//! The host feeds [`FormEvent`]s to a [`FormController`] (directly or via a
//! [`Dispatcher`]) and performs the [`Cmd`]s it returns. Every decision is
//! made at an explicit [`Now`], so the whole runtime can be driven
//! deterministically by the [`simulator`].

pub mod advisory;
pub mod aggregate;
pub mod clock;
pub mod controller;
pub mod debounce;
pub mod field;
pub mod focus;
pub mod simulator;
pub mod state;
pub mod submit;

pub use advisory::{
    AdvisoryCoordinator, AdvisoryError, AdvisoryEvent, AdvisoryNote, AdvisoryRequest,
    AdvisoryResponse, AdvisoryService, AdvisoryTicket, AdvisoryTrace, Generation,
};
pub use aggregate::{Blocker, FormValidityAggregator, ValidityReport, evaluate};
pub use clock::{Clock, ManualClock, Now, SystemClock};
pub use controller::{Cmd, ControllerConfig, Dispatcher, FormController, FormEvent};
pub use debounce::{DebounceTicket, Debouncer};
pub use field::{FieldId, UnknownField};
pub use focus::{Control, EnterOutcome, FocusDecision, FocusGate, FocusTarget};
pub use state::{FieldState, FormState, FormToggle};
pub use submit::{
    RegistrationPayload, RegistrationResponse, RegistrationService, SubmitError, SubmitPhase,
};
