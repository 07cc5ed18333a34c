#![forbid(unsafe_code)]

//! Structural email validation.
//!
//! Stricter than the "something@something.tld" shape check: the local part
//! and every domain label are checked individually, placeholder addresses
//! are rejected, and addresses ending in a chain of known top-level domains
//! (`.com.net`, `.comnet`) are treated as concatenation tricks.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::anomaly::AnomalyDetector;
use crate::blacklist::Blacklist;
use crate::kind::FieldKind;

const MAX_EMAIL_LEN: usize = 320;
const MAX_LOCAL_LEN: usize = 64;
const MAX_DOMAIN_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;

const KNOWN_TLDS: &str =
    "com|net|org|edu|gov|co|in|uk|us|au|de|fr|it|es|br|ca|mx|ru|cn|jp|ind";

static CHAINED_TLDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\.(?:{KNOWN_TLDS})(?:\.?(?:{KNOWN_TLDS}))+$"))
        .expect("chained TLD pattern is valid")
});

static DEFAULT_BLACKLIST: LazyLock<Blacklist> = LazyLock::new(Blacklist::default);

/// The first rule an address broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailRejection {
    Blacklisted,
    Anomalous,
    ChainedTlds,
    TooLong,
    AtSignCount,
    LocalLength,
    LocalDotPlacement,
    LocalCharset,
    LocalWithoutLetter,
    DomainLength,
    DomainEdge,
    DomainConsecutiveDots,
    TooFewLabels,
    InvalidTld,
    InvalidLabel,
}

impl fmt::Display for EmailRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Blacklisted => "placeholder address",
            Self::Anomalous => "repetitive or gibberish address",
            Self::ChainedTlds => "ends with chained top-level domains",
            Self::TooLong => "longer than 320 characters",
            Self::AtSignCount => "must contain exactly one @",
            Self::LocalLength => "local part must be 1-64 characters",
            Self::LocalDotPlacement => "misplaced dot in local part",
            Self::LocalCharset => "invalid character in local part",
            Self::LocalWithoutLetter => "local part needs a letter",
            Self::DomainLength => "domain must be 1-255 characters",
            Self::DomainEdge => "domain starts or ends with a dot or hyphen",
            Self::DomainConsecutiveDots => "consecutive dots in domain",
            Self::TooFewLabels => "domain needs at least two labels",
            Self::InvalidTld => "top-level domain must be 2-6 letters",
            Self::InvalidLabel => "invalid domain label",
        };
        f.write_str(text)
    }
}

/// Check `email` against every rule, reporting the first failure.
pub fn check_email(
    email: &str,
    blacklist: &Blacklist,
    detector: &AnomalyDetector,
) -> Result<(), EmailRejection> {
    let lowered = email.to_lowercase();

    if blacklist.is_blacklisted(FieldKind::Email, &lowered) {
        return Err(EmailRejection::Blacklisted);
    }
    if detector.is_anomalous(&lowered) {
        return Err(EmailRejection::Anomalous);
    }
    if CHAINED_TLDS.is_match(&lowered) {
        return Err(EmailRejection::ChainedTlds);
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(EmailRejection::TooLong);
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(EmailRejection::AtSignCount);
    };

    check_local(local)?;
    check_domain(domain)
}

/// `true` if `email` passes [`check_email`] with the built-in blacklist and
/// default anomaly thresholds.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    check_email(email, &DEFAULT_BLACKLIST, &AnomalyDetector::default()).is_ok()
}

fn check_local(local: &str) -> Result<(), EmailRejection> {
    let len = local.chars().count();
    if len == 0 || len > MAX_LOCAL_LEN {
        return Err(EmailRejection::LocalLength);
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(EmailRejection::LocalDotPlacement);
    }
    if !local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '%' | '-'))
    {
        return Err(EmailRejection::LocalCharset);
    }
    if !local.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(EmailRejection::LocalWithoutLetter);
    }
    Ok(())
}

fn check_domain(domain: &str) -> Result<(), EmailRejection> {
    let len = domain.chars().count();
    if len == 0 || len > MAX_DOMAIN_LEN {
        return Err(EmailRejection::DomainLength);
    }
    let edges = ['-', '.'];
    if domain.starts_with(edges) || domain.ends_with(edges) {
        return Err(EmailRejection::DomainEdge);
    }
    if domain.contains("..") {
        return Err(EmailRejection::DomainConsecutiveDots);
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(EmailRejection::TooFewLabels);
    }

    let tld = labels[labels.len() - 1];
    if !(2..=6).contains(&tld.len()) || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EmailRejection::InvalidTld);
    }

    if labels.iter().all(|label| is_valid_label(label)) {
        Ok(())
    } else {
        Err(EmailRejection::InvalidLabel)
    }
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && label.len() <= MAX_LABEL_LEN
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && label.chars().any(|c| c.is_ascii_alphabetic())
}
