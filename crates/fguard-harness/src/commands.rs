#![forbid(unsafe_code)]

//! One-shot `check` and `dob` commands.

use std::borrow::Cow;

use fguard_core::filters::filter_input;
use fguard_core::{
    AnomalyReason, DobStatus, ErrorCode, FieldContext, FieldKind, FieldValidatorRegistry,
    ValidationResult,
};
use serde::Serialize;
use time::PrimitiveDateTime;
use tracing::debug;

/// Outcome of `check`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckReport {
    pub kind: FieldKind,
    pub input: String,
    /// The value after the kind's input filter, as the form would hold it.
    pub value: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<AnomalyReason>,
}

/// Filter and validate one value.
#[must_use]
pub fn check(
    registry: &FieldValidatorRegistry,
    kind: FieldKind,
    input: &str,
    password: Option<&str>,
    wall: PrimitiveDateTime,
) -> CheckReport {
    let value = filter_input(kind, input);
    let filtered = matches!(value, Cow::Owned(ref v) if v != input);

    let mut ctx = FieldContext::default().with_now(wall);
    if let Some(password) = password {
        ctx = ctx.with_password(password);
    }
    let result = registry.validate_with(kind, &value, &ctx);
    let anomaly = match result.code() {
        Some(ErrorCode::Anomaly) => registry.detector().explain(value.trim()),
        _ => None,
    };
    debug!(%kind, filtered, valid = result.is_valid(), "checked value");

    CheckReport {
        kind,
        input: input.to_string(),
        value: value.into_owned(),
        valid: result.is_valid(),
        code: result.code(),
        message: result.message(),
        anomaly,
    }
}

/// Outcome of `dob`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DobReport {
    pub value: String,
    #[serde(flatten)]
    pub status: DobStatus,
    pub valid: bool,
    pub is_minor: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    pub today: String,
}

/// Assess a date of birth as of `wall`.
#[must_use]
pub fn dob(registry: &FieldValidatorRegistry, input: &str, wall: PrimitiveDateTime) -> DobReport {
    let assessment = registry.assess_dob(input, &FieldContext::default().with_now(wall));
    let result: ValidationResult = assessment.to_result();
    DobReport {
        value: input.trim().to_string(),
        status: assessment.status,
        valid: result.is_valid(),
        is_minor: assessment.is_minor(),
        message: result.message(),
        today: wall.date().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOON: PrimitiveDateTime = datetime!(2026-10-18 12:00);

    #[test]
    fn check_filters_before_validating() {
        let report = check(
            &FieldValidatorRegistry::default(),
            FieldKind::Mobile,
            "98450 12376",
            None,
            NOON,
        );
        assert_eq!(report.value, "9845012376");
        assert!(report.valid);
        assert_eq!(report.code, None);
        assert!(report.message.is_empty());
    }

    #[test]
    fn check_explains_anomalies() {
        let report = check(
            &FieldValidatorRegistry::default(),
            FieldKind::Username,
            "kukuku",
            None,
            NOON,
        );
        assert!(!report.valid);
        assert_eq!(report.code, Some(ErrorCode::Anomaly));
        assert!(report.anomaly.is_some());
    }

    #[test]
    fn check_confirm_password_uses_password() {
        let registry = FieldValidatorRegistry::default();
        let ok = check(
            &registry,
            FieldKind::ConfirmPassword,
            "Blue!Ocean42",
            Some("Blue!Ocean42"),
            NOON,
        );
        assert!(ok.valid);
        let mismatch = check(
            &registry,
            FieldKind::ConfirmPassword,
            "Blue!Ocean42",
            Some("Blue!Ocean43"),
            NOON,
        );
        assert_eq!(mismatch.code, Some(ErrorCode::Mismatch));
    }

    #[test]
    fn dob_reports_minor_with_age() {
        let report = dob(&FieldValidatorRegistry::default(), "2011-06-15", NOON);
        assert!(report.valid);
        assert!(report.is_minor);
        assert_eq!(report.status, DobStatus::Minor { age: 15 });
        assert_eq!(report.today, "2026-10-18");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "minor");
        assert_eq!(json["age"], 15);
        assert!(json.get("message").is_none());
    }

    #[test]
    fn dob_rejects_future_dates() {
        let report = dob(&FieldValidatorRegistry::default(), "2030-01-01", NOON);
        assert!(!report.valid);
        assert!(!report.is_minor);
        assert_eq!(report.message, "Date cannot be in the future");
    }
}
