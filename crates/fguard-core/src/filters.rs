#![forbid(unsafe_code)]

//! Keystroke-level input filters.
//!
//! Filters run on every input event before validation. They drop characters
//! a kind can never contain and, for names, normalise capitalisation, so the
//! value the user sees is already in the shape the rules expect.

use std::borrow::Cow;

use crate::kind::FieldKind;

/// Sanitise a raw input value for `kind`.
///
/// Kinds without a filter are returned unchanged (and unallocated).
#[must_use]
pub fn filter_input(kind: FieldKind, raw: &str) -> Cow<'_, str> {
    match kind {
        FieldKind::Name => Cow::Owned(capitalise_name(&retain(raw, is_name_char))),
        FieldKind::Username => Cow::Owned(retain(raw, is_username_char)),
        FieldKind::Mobile | FieldKind::Postal => Cow::Owned(retain(raw, |c| c.is_ascii_digit())),
        FieldKind::Address => Cow::Owned(retain(raw, is_address_char)),
        FieldKind::Email
        | FieldKind::Password
        | FieldKind::ConfirmPassword
        | FieldKind::SecurityAnswer
        | FieldKind::DateOfBirth
        | FieldKind::Required => Cow::Borrowed(raw),
    }
}

fn retain(raw: &str, keep: impl Fn(char) -> bool) -> String {
    raw.chars().filter(|&c| keep(c)).collect()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '-')
}

pub(crate) fn is_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '@' | '.' | '#' | '$' | '%' | '&' | '*' | '+' | '-')
}

fn is_address_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || matches!(c, '.' | ',' | '#' | '-')
}

/// `J`, `j.`, `.J` and similar single-letter initials.
pub(crate) fn is_initial(value: &str) -> bool {
    let trimmed = value.strip_prefix('.').unwrap_or(value);
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let mut chars = trimmed.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_alphabetic())
}

/// Upper-case initials entirely; otherwise upper-case the first letter and
/// every letter following whitespace, `.`, `-` or `'`.
fn capitalise_name(value: &str) -> String {
    if is_initial(value) {
        return value.to_ascii_uppercase();
    }

    let mut out = String::with_capacity(value.len());
    let mut prev: Option<char> = None;
    for c in value.chars() {
        let at_word_start = match prev {
            None => true,
            Some(p) => p.is_whitespace() || matches!(p, '.' | '-' | '\''),
        };
        if at_word_start && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}
