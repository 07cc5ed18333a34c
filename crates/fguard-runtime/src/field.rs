#![forbid(unsafe_code)]

//! Registration form field identities.

use std::fmt;
use std::str::FromStr;

use fguard_core::FieldKind;
use serde::{Deserialize, Serialize};

/// One input of the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    FirstName,
    LastName,
    Username,
    Email,
    Mobile,
    Dob,
    GuardianName,
    GuardianEmail,
    GuardianPhone,
    PostalCode,
    Country,
    State,
    City,
    Education,
    Password,
    ConfirmPassword,
    Address,
    SecurityQuestion,
    SecurityAnswer,
}

impl FieldId {
    /// Fields that must be valid before submission, whatever the age.
    pub const REQUIRED: [Self; 16] = [
        Self::FirstName,
        Self::LastName,
        Self::Username,
        Self::Email,
        Self::Mobile,
        Self::Dob,
        Self::PostalCode,
        Self::Country,
        Self::State,
        Self::City,
        Self::Education,
        Self::Password,
        Self::ConfirmPassword,
        Self::Address,
        Self::SecurityQuestion,
        Self::SecurityAnswer,
    ];

    /// Fields that are only required for minors.
    pub const GUARDIAN: [Self; 3] = [Self::GuardianName, Self::GuardianEmail, Self::GuardianPhone];

    /// Keyboard order; guardian fields are skipped unless the applicant is a minor.
    pub const TAB_ORDER: [Self; 19] = [
        Self::FirstName,
        Self::LastName,
        Self::Username,
        Self::Email,
        Self::Mobile,
        Self::Dob,
        Self::GuardianName,
        Self::GuardianEmail,
        Self::GuardianPhone,
        Self::PostalCode,
        Self::Country,
        Self::State,
        Self::City,
        Self::Education,
        Self::Password,
        Self::ConfirmPassword,
        Self::Address,
        Self::SecurityQuestion,
        Self::SecurityAnswer,
    ];

    /// Wire id, as used in advisory requests and the submission payload.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Username => "username",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Dob => "dob",
            Self::GuardianName => "guardianName",
            Self::GuardianEmail => "guardianEmail",
            Self::GuardianPhone => "guardianPhone",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
            Self::State => "state",
            Self::City => "city",
            Self::Education => "education",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Address => "address",
            Self::SecurityQuestion => "securityQuestion",
            Self::SecurityAnswer => "securityAnswer",
        }
    }

    /// The rule family this field is validated with.
    #[must_use]
    pub const fn kind(self) -> FieldKind {
        match self {
            Self::FirstName | Self::LastName | Self::GuardianName => FieldKind::Name,
            Self::Username => FieldKind::Username,
            Self::Email | Self::GuardianEmail => FieldKind::Email,
            Self::Mobile | Self::GuardianPhone => FieldKind::Mobile,
            Self::Dob => FieldKind::DateOfBirth,
            Self::PostalCode => FieldKind::Postal,
            Self::Password => FieldKind::Password,
            Self::ConfirmPassword => FieldKind::ConfirmPassword,
            Self::Address => FieldKind::Address,
            Self::SecurityAnswer => FieldKind::SecurityAnswer,
            Self::Country
            | Self::State
            | Self::City
            | Self::Education
            | Self::SecurityQuestion => FieldKind::Required,
        }
    }

    #[must_use]
    pub const fn is_guardian(self) -> bool {
        matches!(
            self,
            Self::GuardianName | Self::GuardianEmail | Self::GuardianPhone
        )
    }

    /// Enter inserts a newline here instead of advancing.
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::Address)
    }

    /// The field after `self` in tab order, skipping guardian fields for adults.
    #[must_use]
    pub fn next(self, is_minor: bool) -> Option<Self> {
        let idx = Self::TAB_ORDER.iter().position(|&f| f == self)?;
        Self::TAB_ORDER[idx + 1..]
            .iter()
            .copied()
            .find(|f| is_minor || !f.is_guardian())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown field id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field: {}", self.0)
    }
}

impl std::error::Error for UnknownField {}

impl FromStr for FieldId {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::TAB_ORDER
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}
