#![forbid(unsafe_code)]

//! Exact-match placeholder filter.
//!
//! Values like `test@test.com` or `9999999999` pass every format rule but
//! are obviously not real. [`Blacklist`] rejects them by exact full-value
//! lookup: text kinds compare lowercased, phone numbers compare digit for
//! digit. It never does substring matching.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::kind::FieldKind;

const EMAILS: &[&str] = &[
    "test@test.com",
    "test@example.com",
    "admin@admin.com",
    "user@user.com",
    "demo@demo.com",
    "demo@example.com",
    "sample@sample.com",
    "info@info.com",
    "test@gmail.com",
    "dummy@dummy.com",
    "temp@temp.com",
    "hello@hello.com",
    "abc@abc.com",
    "admin@example.com",
    "test123@test.com",
    "user123@user.com",
];

const USERNAMES: &[&str] = &[
    "test", "admin", "user", "demo", "sample", "temp", "hello", "abc", "test123", "user123",
    "admin123", "password", "qwerty", "asdfgh", "test1234", "testuser", "adminuser", "demouser",
];

const NAMES: &[&str] = &[
    "test", "admin", "demo", "sample", "temp", "dummy", "abc", "xyz", "asdf",
];

const PHONES: &[&str] = &[
    "1234567890",
    "9999999999",
    "1111111111",
    "5555555555",
    "0000000000",
    "6666666666",
    "7777777777",
    "8888888888",
    "1234567801",
    "9876543210",
];

/// Which placeholder set a kind is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlacklistCategory {
    Emails,
    Usernames,
    Names,
    Phones,
}

impl BlacklistCategory {
    /// The set used for `kind`, if the kind has one.
    #[must_use]
    pub const fn for_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Email => Some(Self::Emails),
            FieldKind::Username => Some(Self::Usernames),
            FieldKind::Name => Some(Self::Names),
            FieldKind::Mobile => Some(Self::Phones),
            FieldKind::Password
            | FieldKind::ConfirmPassword
            | FieldKind::Address
            | FieldKind::Postal
            | FieldKind::SecurityAnswer
            | FieldKind::DateOfBirth
            | FieldKind::Required => None,
        }
    }

    /// Digit sets compare exactly; text sets compare lowercased.
    #[must_use]
    pub const fn is_case_sensitive(self) -> bool {
        matches!(self, Self::Phones)
    }
}

/// Extra entries merged into the built-in sets from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacklistExtras {
    pub emails: Vec<String>,
    pub usernames: Vec<String>,
    pub names: Vec<String>,
    pub phones: Vec<String>,
}

/// The four placeholder sets, keyed by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blacklist {
    emails: HashSet<String>,
    usernames: HashSet<String>,
    names: HashSet<String>,
    phones: HashSet<String>,
}

impl Default for Blacklist {
    fn default() -> Self {
        Self::with_extras(&BlacklistExtras::default())
    }
}

impl Blacklist {
    /// Sets with no entries at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            emails: HashSet::new(),
            usernames: HashSet::new(),
            names: HashSet::new(),
            phones: HashSet::new(),
        }
    }

    /// Built-in sets plus `extras`.
    #[must_use]
    pub fn with_extras(extras: &BlacklistExtras) -> Self {
        let mut list = Self::empty();
        let builtin = [
            (BlacklistCategory::Emails, EMAILS),
            (BlacklistCategory::Usernames, USERNAMES),
            (BlacklistCategory::Names, NAMES),
            (BlacklistCategory::Phones, PHONES),
        ];
        for (category, values) in builtin {
            for value in values {
                list.insert(category, value);
            }
        }
        let configured = [
            (BlacklistCategory::Emails, &extras.emails),
            (BlacklistCategory::Usernames, &extras.usernames),
            (BlacklistCategory::Names, &extras.names),
            (BlacklistCategory::Phones, &extras.phones),
        ];
        for (category, values) in configured {
            for value in values {
                list.insert(category, value);
            }
        }
        list
    }

    /// Add one entry, normalised for its category.
    pub fn insert(&mut self, category: BlacklistCategory, value: &str) {
        let value = normalise(category, value);
        self.set_mut(category).insert(value);
    }

    /// Number of entries in a category.
    #[must_use]
    pub fn len(&self, category: BlacklistCategory) -> usize {
        self.set(category).len()
    }

    /// `true` if `value` exactly matches an entry for `kind`.
    ///
    /// Kinds without a placeholder set are never blacklisted.
    #[must_use]
    pub fn is_blacklisted(&self, kind: FieldKind, value: &str) -> bool {
        BlacklistCategory::for_kind(kind).is_some_and(|category| {
            self.set(category)
                .contains(normalise(category, value).as_str())
        })
    }

    fn set(&self, category: BlacklistCategory) -> &HashSet<String> {
        match category {
            BlacklistCategory::Emails => &self.emails,
            BlacklistCategory::Usernames => &self.usernames,
            BlacklistCategory::Names => &self.names,
            BlacklistCategory::Phones => &self.phones,
        }
    }

    fn set_mut(&mut self, category: BlacklistCategory) -> &mut HashSet<String> {
        match category {
            BlacklistCategory::Emails => &mut self.emails,
            BlacklistCategory::Usernames => &mut self.usernames,
            BlacklistCategory::Names => &mut self.names,
            BlacklistCategory::Phones => &mut self.phones,
        }
    }
}

fn normalise(category: BlacklistCategory, value: &str) -> String {
    if category.is_case_sensitive() {
        value.to_string()
    } else {
        value.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lookup_ignores_case() {
        let list = Blacklist::default();
        assert!(list.is_blacklisted(FieldKind::Email, "Test@Test.com"));
        assert!(list.is_blacklisted(FieldKind::Username, "ADMIN"));
        assert!(list.is_blacklisted(FieldKind::Name, "Dummy"));
    }

    #[test]
    fn phone_lookup_is_exact() {
        let list = Blacklist::default();
        assert!(list.is_blacklisted(FieldKind::Mobile, "9876543210"));
        assert!(!list.is_blacklisted(FieldKind::Mobile, "9876543211"));
    }

    #[test]
    fn no_substring_matching() {
        let list = Blacklist::default();
        assert!(!list.is_blacklisted(FieldKind::Username, "testing"));
        assert!(!list.is_blacklisted(FieldKind::Email, "mytest@test.com"));
        assert!(!list.is_blacklisted(FieldKind::Name, "Abcde"));
    }

    #[test]
    fn kinds_without_sets_never_match() {
        let list = Blacklist::default();
        assert!(!list.is_blacklisted(FieldKind::Password, "test"));
        assert!(!list.is_blacklisted(FieldKind::Address, "test"));
    }

    #[test]
    fn sets_are_keyed_by_kind() {
        let list = Blacklist::default();
        // "password" is a placeholder username, not a placeholder name.
        assert!(list.is_blacklisted(FieldKind::Username, "password"));
        assert!(!list.is_blacklisted(FieldKind::Name, "password"));
    }

    #[test]
    fn extras_are_merged() {
        let extras = BlacklistExtras {
            names: vec!["John Doe".to_string()],
            phones: vec!["9000000001".to_string()],
            ..BlacklistExtras::default()
        };
        let list = Blacklist::with_extras(&extras);
        assert!(list.is_blacklisted(FieldKind::Name, "john doe"));
        assert!(list.is_blacklisted(FieldKind::Mobile, "9000000001"));
        assert!(list.is_blacklisted(FieldKind::Name, "asdf"));
        assert_eq!(list.len(BlacklistCategory::Names), NAMES.len() + 1);
    }

    #[test]
    fn empty_list_matches_nothing() {
        assert!(!Blacklist::empty().is_blacklisted(FieldKind::Email, "test@test.com"));
    }
}
