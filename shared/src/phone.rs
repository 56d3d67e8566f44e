use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const PHONE_DIGITS: usize = 9;
pub const COUNTRY_PREFIX: &str = "+995";

// Local numbers read as 5XX XX XX XX.
const DISPLAY_GROUPS: [usize; 4] = [3, 2, 2, 2];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneError {
    #[error("Enter all {need} digits of your phone number ({have} entered)")]
    Incomplete { have: usize, need: usize },
}

/// Digits-only local phone number, capped at `required` digits.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber {
    digits: String,
    required: usize,
}

impl Default for PhoneNumber {
    fn default() -> Self {
        Self {
            digits: String::new(),
            required: PHONE_DIGITS,
        }
    }
}

impl PhoneNumber {
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self::normalize_with_length(raw, PHONE_DIGITS)
    }

    /// Keeps the first `required` ASCII digits of `raw`; everything else is dropped.
    #[must_use]
    pub fn normalize_with_length(raw: &str, required: usize) -> Self {
        Self {
            digits: raw.chars().filter(char::is_ascii_digit).take(required).collect(),
            required,
        }
    }

    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.digits.len() == self.required
    }

    pub fn validate(&self) -> Result<(), PhoneError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(PhoneError::Incomplete {
                have: self.digits.len(),
                need: self.required,
            })
        }
    }

    /// Local digits grouped for display, e.g. `598 12 34 56`.
    #[must_use]
    pub fn grouped(&self) -> String {
        let mut groups = Vec::with_capacity(DISPLAY_GROUPS.len() + 1);
        let mut rest = self.digits.as_str();

        for size in DISPLAY_GROUPS {
            if rest.is_empty() {
                break;
            }
            let (head, tail) = rest.split_at(size.min(rest.len()));
            groups.push(head);
            rest = tail;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }

        groups.join(" ")
    }

    /// International form, e.g. `+995 598 12 34 56`.
    #[must_use]
    pub fn international(&self) -> String {
        format!("{COUNTRY_PREFIX} {}", self.grouped())
    }

    /// `+995 *** ** 56`; only the last two digits are shown.
    #[must_use]
    pub fn masked(&self) -> Option<String> {
        if !self.is_complete() || self.digits.len() < 2 {
            return None;
        }
        let tail = &self.digits[self.digits.len() - 2..];
        Some(format!("{COUNTRY_PREFIX} *** ** {tail}"))
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneNumber")
            .field("digits", &self.digits.len())
            .field("required", &self.required)
            .finish()
    }
}
