#![forbid(unsafe_code)]

//! Date-of-birth evaluation and the minor-consent decision.
//!
//! [`AgeConsentEvaluator::assess`] turns the raw `YYYY-MM-DD` input into a
//! [`DobAssessment`]: whether the date is acceptable, the message to show,
//! the age to display, and whether the guardian-consent section applies.
//!
//! # State Table
//!
//! | status | valid | minor |
//! |--------|-------|-------|
//! | `Empty`, `Unparseable`, `Future`, `YearOutOfRange`, `TooYoung` | no | no |
//! | `Minor` (`min_age <= age < adult_age`) | yes | yes |
//! | `Adult` (`age >= adult_age`) | yes | no |

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

use crate::validation::{ErrorCode, ValidationError, ValidationResult};

const SECONDS_PER_JULIAN_YEAR: f64 = 365.25 * 86_400.0;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How a birth date becomes an age in whole years.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeMethod {
    /// Elapsed time since birth midnight divided by 365.25 days, floored.
    ///
    /// Can report one year less than the calendar on birthdays.
    JulianYears,
    /// Completed calendar years: the birthday itself counts.
    #[default]
    CalendarYears,
}

/// Age bounds for the date-of-birth field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeConfig {
    /// Youngest accepted age.
    pub min_age: u32,
    /// Age from which guardian consent is no longer needed.
    pub adult_age: u32,
    /// Earliest accepted birth year.
    pub min_year: i32,
    /// Age computation.
    pub method: AgeMethod,
}

impl Default for AgeConfig {
    fn default() -> Self {
        Self {
            min_age: 13,
            adult_age: 18,
            min_year: 1900,
            method: AgeMethod::CalendarYears,
        }
    }
}

impl AgeConfig {
    /// Set the minimum accepted age.
    #[must_use]
    pub fn with_min_age(mut self, age: u32) -> Self {
        self.min_age = age;
        self
    }

    /// Set the adult age.
    #[must_use]
    pub fn with_adult_age(mut self, age: u32) -> Self {
        self.adult_age = age;
        self
    }

    /// Set the age computation.
    #[must_use]
    pub fn with_method(mut self, method: AgeMethod) -> Self {
        self.method = method;
        self
    }
}

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// Where a date-of-birth input landed in the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DobStatus {
    Empty,
    Unparseable,
    Future,
    YearOutOfRange { min: i32, max: i32 },
    TooYoung { age: u32, min_age: u32 },
    Minor { age: u32 },
    Adult { age: u32 },
}

/// Result of evaluating one date-of-birth input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DobAssessment {
    pub status: DobStatus,
}

impl DobAssessment {
    /// `true` for `Minor` and `Adult`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self.status, DobStatus::Minor { .. } | DobStatus::Adult { .. })
    }

    /// `true` iff the guardian-consent section applies.
    #[must_use]
    pub const fn is_minor(&self) -> bool {
        matches!(self.status, DobStatus::Minor { .. })
    }

    /// Age to display; only present for accepted dates.
    #[must_use]
    pub const fn display_age(&self) -> Option<u32> {
        match self.status {
            DobStatus::Minor { age } | DobStatus::Adult { age } => Some(age),
            _ => None,
        }
    }

    /// The field-level result, with the inline message for rejections.
    #[must_use]
    pub fn to_result(&self) -> ValidationResult {
        let error = match self.status {
            DobStatus::Minor { .. } | DobStatus::Adult { .. } => return ValidationResult::Valid,
            DobStatus::Empty => ValidationError::new(ErrorCode::Required, "Date of birth required"),
            DobStatus::Unparseable => ValidationError::new(ErrorCode::Format, "Enter a valid date"),
            DobStatus::Future => {
                ValidationError::new(ErrorCode::Range, "Date cannot be in the future")
            }
            DobStatus::YearOutOfRange { min, max } => {
                ValidationError::new(ErrorCode::Range, "Year must be between {min} and {max}")
                    .with_param("min", min)
                    .with_param("max", max)
            }
            DobStatus::TooYoung { min_age, .. } => {
                ValidationError::new(ErrorCode::Range, "Must be {min}+ years old")
                    .with_param("min", min_age)
            }
        };
        ValidationResult::Invalid(error)
    }

    /// Inline message; empty for accepted dates.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_result().message()
    }
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Parse a `YYYY-MM-DD` date.
pub fn parse_dob(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
}

/// Pure date-of-birth evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgeConsentEvaluator {
    config: AgeConfig,
}

impl AgeConsentEvaluator {
    #[must_use]
    pub const fn new(config: AgeConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &AgeConfig {
        &self.config
    }

    /// Evaluate `raw` as of `now`.
    #[must_use]
    pub fn assess(&self, raw: &str, now: PrimitiveDateTime) -> DobAssessment {
        let status = self.status(raw.trim(), now);
        DobAssessment { status }
    }

    /// Evaluate `raw` as of midnight on `today`.
    #[must_use]
    pub fn assess_on(&self, raw: &str, today: Date) -> DobAssessment {
        self.assess(raw, today.midnight())
    }

    fn status(&self, raw: &str, now: PrimitiveDateTime) -> DobStatus {
        let cfg = &self.config;
        if raw.is_empty() {
            return DobStatus::Empty;
        }
        let Ok(birth) = parse_dob(raw) else {
            return DobStatus::Unparseable;
        };

        let today = now.date();
        if birth > today {
            return DobStatus::Future;
        }
        if birth.year() < cfg.min_year || birth.year() > today.year() {
            return DobStatus::YearOutOfRange {
                min: cfg.min_year,
                max: today.year(),
            };
        }

        let age = self.age_in_years(birth, now);
        if age < cfg.min_age {
            DobStatus::TooYoung {
                age,
                min_age: cfg.min_age,
            }
        } else if age < cfg.adult_age {
            DobStatus::Minor { age }
        } else {
            DobStatus::Adult { age }
        }
    }

    /// Whole years between `birth` and `now` using the configured method.
    #[must_use]
    pub fn age_in_years(&self, birth: Date, now: PrimitiveDateTime) -> u32 {
        match self.config.method {
            AgeMethod::JulianYears => {
                let elapsed = (now - birth.midnight()).as_seconds_f64();
                (elapsed / SECONDS_PER_JULIAN_YEAR).floor().max(0.0) as u32
            }
            AgeMethod::CalendarYears => {
                let today = now.date();
                let mut years = today.year() - birth.year();
                if (today.month() as u8, today.day()) < (birth.month() as u8, birth.day()) {
                    years -= 1;
                }
                u32::try_from(years).unwrap_or(0)
            }
        }
    }
}
