#![forbid(unsafe_code)]

//! Core: field rules, anomaly detection, placeholder filtering, and age
//! evaluation for registration forms.
//!
//! # Role in FormGuard
//! `fguard-core` is pure: no clocks, no I/O beyond config loading, no
//! state. Every validator is a total function from a value (plus an
//! explicit [`rules::FieldContext`]) to a [`validation::ValidationResult`].
//! `fguard-runtime` layers form state, debouncing and focus gating on top.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`anomaly`] | Repetition and gibberish heuristics |
//! | [`blacklist`] | Exact-match placeholder sets |
//! | [`email`] | Structural email checks |
//! | [`rules`] | Per-kind registry: anomaly, blacklist, regex, semantics |
//! | [`age`] | Date of birth and the minor-consent decision |
//! | [`filters`] | Keystroke-level input sanitising |
//! | [`config`] | JSON-loadable engine tunables |

pub mod age;
pub mod anomaly;
pub mod blacklist;
pub mod config;
pub mod email;
pub mod filters;
pub mod kind;
pub mod rules;
pub mod validation;

pub use age::{AgeConfig, AgeConsentEvaluator, AgeMethod, DobAssessment, DobStatus};
pub use anomaly::{AnomalyConfig, AnomalyDetector, AnomalyReason};
pub use blacklist::{Blacklist, BlacklistExtras};
pub use config::{ConfigError, EngineConfig};
pub use kind::FieldKind;
pub use rules::{FieldContext, FieldValidatorRegistry};
pub use validation::{ErrorCode, ValidationError, ValidationResult, Validator};
