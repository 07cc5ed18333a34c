#![forbid(unsafe_code)]

//! Result types shared by every field validator.
//!
//! Validators in this crate are total: they never panic and never return
//! `Err`. A rejected value is reported as [`ValidationResult::Invalid`]
//! carrying an [`ErrorCode`] from the rejection taxonomy and a message
//! ready for inline display.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Why a value was rejected.
///
/// Ordered by the priority the registry checks them in; `Anomaly`
/// short-circuits everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Repetitive or gibberish input.
    Anomaly,
    /// Exact match against a known placeholder value.
    Blacklisted,
    /// Wrong charset, length, or structure.
    Format,
    /// Date of birth out of the allowed bounds or in the future.
    Range,
    /// Confirmation does not equal the original.
    Mismatch,
    /// Empty value where one is required.
    Required,
}

impl ErrorCode {
    /// Stable identifier for logs and wire output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anomaly => "anomaly",
            Self::Blacklisted => "blacklisted",
            Self::Format => "format",
            Self::Range => "range",
            Self::Mismatch => "mismatch",
            Self::Required => "required",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// A rejection with its code, message template, and interpolation params.
///
/// ```rust
/// use fguard_core::validation::{ErrorCode, ValidationError};
///
/// let error = ValidationError::new(ErrorCode::Range, "Year must be between {min} and {max}")
///     .with_param("min", 1900)
///     .with_param("max", 2026);
///
/// assert_eq!(error.format_message(), "Year must be between 1900 and 2026");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rejection category.
    pub code: ErrorCode,
    /// Message template; `{key}` placeholders are filled from `params`.
    pub message: String,
    /// Interpolation parameters.
    pub params: BTreeMap<String, String>,
}

impl ValidationError {
    /// Create an error with the given code and message.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter for message interpolation.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Format the message with parameter substitution.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut result = self.message.clone();
        for (key, value) in &self.params {
            result = result.replace(&format!("{{{key}}}"), value);
        }
        result
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_message())
    }
}

impl std::error::Error for ValidationError {}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationResult {
    /// The value is acceptable.
    #[default]
    Valid,
    /// The value was rejected.
    Invalid(ValidationError),
}

impl ValidationResult {
    /// Shorthand for an `Invalid` result.
    #[must_use]
    pub fn invalid(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Invalid(ValidationError::new(code, message))
    }

    /// Returns `true` if the result is `Valid`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Returns `true` if the result is `Invalid`.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }

    /// The error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            Self::Valid => None,
            Self::Invalid(e) => Some(e),
        }
    }

    /// The rejection code, if any.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        self.error().map(|e| e.code)
    }

    /// Inline message: empty when valid.
    #[must_use]
    pub fn message(&self) -> String {
        self.error()
            .map(ValidationError::format_message)
            .unwrap_or_default()
    }

    /// Combine two results, returning the first error if any.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::Valid => other,
            Self::Invalid(_) => self,
        }
    }

    /// Lazily combine: `next` only runs when `self` is valid.
    #[must_use]
    pub fn and_then(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Valid => next(),
            Self::Invalid(_) => self,
        }
    }
}

// ---------------------------------------------------------------------------
// Validator Trait
// ---------------------------------------------------------------------------

/// Something that can accept or reject a value of type `T`.
pub trait Validator<T: ?Sized>: Send + Sync {
    /// Validate the given value.
    fn validate(&self, value: &T) -> ValidationResult;

    /// The default message this validator reports.
    fn error_message(&self) -> &str;
}
