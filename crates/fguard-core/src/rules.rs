#![forbid(unsafe_code)]

//! Per-kind field rules.
//!
//! [`FieldValidatorRegistry`] is the single entry point for validating a
//! field value. For text kinds the checks run in a fixed order and stop at
//! the first failure:
//!
//! 1. anomaly detection on the non-empty trimmed value
//! 2. placeholder blacklist
//! 3. the kind's regular expression
//! 4. kind-specific semantic rules
//!
//! Confirm-password and date-of-birth need context from outside the field
//! ([`FieldContext`]); `Required` fields only need to be non-empty.

use std::sync::LazyLock;

use regex::Regex;
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::debug;

use crate::age::{AgeConsentEvaluator, DobAssessment};
use crate::anomaly::AnomalyDetector;
use crate::blacklist::Blacklist;
use crate::config::EngineConfig;
use crate::email::check_email;
use crate::kind::FieldKind;
use crate::validation::{ErrorCode, ValidationResult, Validator};

/// Message for values flagged by the anomaly detector.
pub const ANOMALY_MESSAGE: &str = "No gibberish or repetitive patterns allowed";
/// Message for empty `Required` fields.
pub const REQUIRED_MESSAGE: &str = "Required";
/// Message for a confirmation that does not match.
pub const MISMATCH_MESSAGE: &str = "Passwords do not match";

const NAME_MAX_LEN: usize = 50;
const PASSWORD_SPECIALS: &[char] = &['@', '$', '!', '%', '*', '?', '&'];

// ---------------------------------------------------------------------------
// FieldRule
// ---------------------------------------------------------------------------

/// The regex and message of one text kind.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub kind: FieldKind,
    pub pattern: Regex,
    pub message: &'static str,
}

impl FieldRule {
    fn new(kind: FieldKind, pattern: &str, message: &'static str) -> Self {
        Self {
            kind,
            pattern: Regex::new(pattern).expect("field rule pattern is valid"),
            message,
        }
    }

    /// Whether `value` matches the pattern alone.
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

static RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        FieldRule::new(
            FieldKind::Name,
            r"^[A-Za-z]+(?:[.\s'-]*[A-Za-z]+)*\.?$",
            "Letters, spaces, dots, apostrophes. No repeated patterns",
        ),
        FieldRule::new(
            FieldKind::Username,
            r"^[A-Za-z0-9_@.#$%&*+-]{3,}$",
            "Letters/numbers/special chars, min 3. No dummy/repeated patterns",
        ),
        FieldRule::new(
            FieldKind::Email,
            r"^[^\s@]+@[^\s@]+\.[^\s@]+$",
            "Valid email required",
        ),
        FieldRule::new(
            FieldKind::Mobile,
            r"^[6789][0-9]{9}$",
            "Exactly 10 digits starting with 6, 7, 8, or 9",
        ),
        // Character classes are checked in `semantic_check`.
        FieldRule::new(
            FieldKind::Password,
            r"^.{8,}$",
            "Min 8: A-Z, a-z, 0-9, special. No repeated patterns",
        ),
        FieldRule::new(
            FieldKind::Address,
            r"^[A-Za-z0-9\s.,#-]{10,}$",
            "Min 10 chars. No repeated patterns",
        ),
        FieldRule::new(FieldKind::Postal, r"^[0-9]{6}$", "Must be exactly 6 digits"),
        FieldRule::new(
            FieldKind::SecurityAnswer,
            r"^.{2,}$",
            "Min 2 characters. No repeated patterns",
        ),
    ]
});

/// The regex rule for `kind`, if it is a text kind.
#[must_use]
pub fn rule_for(kind: FieldKind) -> Option<&'static FieldRule> {
    RULES.iter().find(|rule| rule.kind == kind)
}

/// The inline message a rejected `kind` shows.
#[must_use]
pub fn message_for(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::ConfirmPassword => MISMATCH_MESSAGE,
        FieldKind::Required => REQUIRED_MESSAGE,
        FieldKind::DateOfBirth => "Date of birth required",
        _ => rule_for(kind).map_or(REQUIRED_MESSAGE, |rule| rule.message),
    }
}

// ---------------------------------------------------------------------------
// FieldContext
// ---------------------------------------------------------------------------

/// Values from outside the field that some kinds depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldContext<'a> {
    /// Current password, for confirm-password.
    pub password: Option<&'a str>,
    /// Evaluation time, for date of birth. Falls back to the system UTC clock.
    pub now: Option<PrimitiveDateTime>,
}

impl<'a> FieldContext<'a> {
    #[must_use]
    pub fn with_password(mut self, password: &'a str) -> Self {
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_now(mut self, now: PrimitiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    fn now_or_system(&self) -> PrimitiveDateTime {
        self.now.unwrap_or_else(|| {
            let now = OffsetDateTime::now_utc();
            PrimitiveDateTime::new(now.date(), now.time())
        })
    }
}

// ---------------------------------------------------------------------------
// FieldValidatorRegistry
// ---------------------------------------------------------------------------

/// Validates any field value by kind.
#[derive(Debug, Clone, Default)]
pub struct FieldValidatorRegistry {
    detector: AnomalyDetector,
    blacklist: Blacklist,
    age: AgeConsentEvaluator,
}

impl FieldValidatorRegistry {
    /// Registry built from engine configuration.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            detector: AnomalyDetector::new(config.anomaly),
            blacklist: Blacklist::with_extras(&config.blacklist),
            age: AgeConsentEvaluator::new(config.age),
        }
    }

    #[must_use]
    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    #[must_use]
    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    #[must_use]
    pub fn age(&self) -> &AgeConsentEvaluator {
        &self.age
    }

    /// Validate with an empty context.
    #[must_use]
    pub fn validate(&self, kind: FieldKind, value: &str) -> ValidationResult {
        self.validate_with(kind, value, &FieldContext::default())
    }

    /// Validate `value` as `kind`. The value is trimmed first.
    #[must_use]
    pub fn validate_with(
        &self,
        kind: FieldKind,
        value: &str,
        ctx: &FieldContext<'_>,
    ) -> ValidationResult {
        let value = value.trim();
        match kind {
            FieldKind::Required => {
                if value.is_empty() {
                    ValidationResult::invalid(ErrorCode::Required, REQUIRED_MESSAGE)
                } else {
                    ValidationResult::Valid
                }
            }
            FieldKind::ConfirmPassword => confirm_password(value, ctx.password),
            FieldKind::DateOfBirth => self.assess_dob(value, ctx).to_result(),
            FieldKind::Name
            | FieldKind::Username
            | FieldKind::Email
            | FieldKind::Mobile
            | FieldKind::Password
            | FieldKind::Address
            | FieldKind::Postal
            | FieldKind::SecurityAnswer => self.validate_text(kind, value),
        }
    }

    /// Full date-of-birth assessment, for the consent flow.
    #[must_use]
    pub fn assess_dob(&self, value: &str, ctx: &FieldContext<'_>) -> DobAssessment {
        self.age.assess(value, ctx.now_or_system())
    }

    /// A [`Validator`] bound to one kind.
    #[must_use]
    pub fn validator(&self, kind: FieldKind) -> KindValidator<'_> {
        KindValidator {
            registry: self,
            kind,
        }
    }

    fn validate_text(&self, kind: FieldKind, value: &str) -> ValidationResult {
        let Some(rule) = rule_for(kind) else {
            return ValidationResult::invalid(ErrorCode::Required, REQUIRED_MESSAGE);
        };
        if value.is_empty() {
            return ValidationResult::invalid(ErrorCode::Required, rule.message);
        }

        if kind.checks_anomalies() {
            if let Some(reason) = self.detector.explain(value) {
                debug!(kind = %kind, reason = reason.name(), "anomalous value rejected");
                return ValidationResult::invalid(ErrorCode::Anomaly, ANOMALY_MESSAGE);
            }
        }

        if self.blacklist.is_blacklisted(kind, value) {
            debug!(kind = %kind, "placeholder value rejected");
            return ValidationResult::invalid(ErrorCode::Blacklisted, rule.message);
        }

        if !rule.matches(value) || !self.semantic_check(kind, value) {
            return ValidationResult::invalid(ErrorCode::Format, rule.message);
        }
        ValidationResult::Valid
    }

    fn semantic_check(&self, kind: FieldKind, value: &str) -> bool {
        match kind {
            FieldKind::Name => is_valid_name(value),
            FieldKind::Password => is_strong_password(value),
            FieldKind::Email => check_email(value, &self.blacklist, &self.detector).is_ok(),
            FieldKind::Username
            | FieldKind::Mobile
            | FieldKind::Address
            | FieldKind::Postal
            | FieldKind::SecurityAnswer
            | FieldKind::ConfirmPassword
            | FieldKind::DateOfBirth
            | FieldKind::Required => true,
        }
    }
}

fn confirm_password(value: &str, password: Option<&str>) -> ValidationResult {
    if value.is_empty() {
        return ValidationResult::invalid(ErrorCode::Required, MISMATCH_MESSAGE);
    }
    if password == Some(value) {
        ValidationResult::Valid
    } else {
        ValidationResult::invalid(ErrorCode::Mismatch, MISMATCH_MESSAGE)
    }
}

fn is_valid_name(value: &str) -> bool {
    if value.chars().count() > NAME_MAX_LEN {
        return false;
    }
    let has_double_space = value
        .chars()
        .zip(value.chars().skip(1))
        .any(|(a, b)| a.is_whitespace() && b.is_whitespace());
    !has_double_space && value.trim() == value
}

fn is_strong_password(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.contains(PASSWORD_SPECIALS)
}

// ---------------------------------------------------------------------------
// KindValidator
// ---------------------------------------------------------------------------

/// Registry validation for one kind, with an empty context.
#[derive(Debug, Clone, Copy)]
pub struct KindValidator<'r> {
    registry: &'r FieldValidatorRegistry,
    kind: FieldKind,
}

impl Validator<str> for KindValidator<'_> {
    fn validate(&self, value: &str) -> ValidationResult {
        self.registry.validate(self.kind, value)
    }

    fn error_message(&self) -> &str {
        message_for(self.kind)
    }
}
