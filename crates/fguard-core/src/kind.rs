#![forbid(unsafe_code)]

//! Field kinds: the rule family a form field is validated with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The rule family of a field.
///
/// Several fields can share a kind (first name, last name and guardian
/// name are all [`FieldKind::Name`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Name,
    Username,
    Email,
    Mobile,
    Password,
    ConfirmPassword,
    Address,
    Postal,
    SecurityAnswer,
    DateOfBirth,
    /// No dedicated rule: valid iff the trimmed value is non-empty.
    Required,
}

impl FieldKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Name,
        Self::Username,
        Self::Email,
        Self::Mobile,
        Self::Password,
        Self::ConfirmPassword,
        Self::Address,
        Self::Postal,
        Self::SecurityAnswer,
        Self::DateOfBirth,
        Self::Required,
    ];

    /// Wire name, matching the form's rule attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Username => "username",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Address => "address",
            Self::Postal => "postal",
            Self::SecurityAnswer => "securityAnswer",
            Self::DateOfBirth => "dateOfBirth",
            Self::Required => "required",
        }
    }

    /// Kinds whose non-empty values go through the anomaly detector first.
    #[must_use]
    pub const fn checks_anomalies(self) -> bool {
        matches!(
            self,
            Self::Name
                | Self::Username
                | Self::Email
                | Self::Mobile
                | Self::Password
                | Self::Address
                | Self::Postal
                | Self::SecurityAnswer
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown kind name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown field kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for FieldKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
