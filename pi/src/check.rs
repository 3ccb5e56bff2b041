// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{fmt, str::FromStr};

use machin_engine::arch::{Word, DIGITS_PER_WORD};
use thiserror::Error;

const GROUP_DIGITS: usize = DIGITS_PER_WORD as usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error("unexpected {found:?} at byte {position} of the reference digits")]
    InvalidCharacter { position: usize, found: char },

    #[error("reference digits contain no digits")]
    Empty,
}

/// Known-good decimal digits of pi, e.g. `3.14159...` as published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDigits {
    digits: String,
}

/// A group whose value differs from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub group: usize,
    pub emitted: Word,
    /// `None` when the reference ran out of digits.
    pub expected: Option<Word>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub groups: usize,
    pub mismatches: Vec<Mismatch>,
}

impl ReferenceDigits {
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Compares a group stream against the reference. `leading_digits` is the
    /// number of digits in the first group (see
    /// [`crate::PiConfig::leading_group_digits`]); every later group covers
    /// the next nine reference digits. Groups are compared by value.
    pub fn check(
        &self,
        groups: impl IntoIterator<Item = Word>,
        leading_digits: usize,
    ) -> CheckReport {
        let mut report = CheckReport::default();
        let mut start = 0;
        for (group, emitted) in groups.into_iter().enumerate() {
            let width = if group == 0 {
                leading_digits
            } else {
                GROUP_DIGITS
            };
            let expected = self
                .digits
                .get(start..start + width)
                .and_then(|digits| digits.parse::<Word>().ok());
            if expected != Some(emitted) {
                report.mismatches.push(Mismatch {
                    group,
                    emitted,
                    expected,
                });
            }
            start += width;
            report.groups += 1;
        }
        report
    }
}

impl FromStr for ReferenceDigits {
    type Err = CheckError;

    /// Keeps the digits, skipping whitespace and one decimal point.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut digits = String::with_capacity(text.len());
        let mut seen_point = false;
        for (position, found) in text.char_indices() {
            match found {
                '0'..='9' => digits.push(found),
                '.' if !seen_point && !digits.is_empty() => seen_point = true,
                _ if found.is_whitespace() => {}
                _ => {
                    return Err(CheckError::InvalidCharacter { position, found })
                }
            }
        }
        if digits.is_empty() {
            return Err(CheckError::Empty);
        }
        Ok(Self { digits })
    }
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "difference at group {}: emitted {:09}",
            self.group, self.emitted
        )?;
        match self.expected {
            Some(expected) => write!(f, ", reference {expected:09}"),
            None => write!(f, ", reference has no digits here"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckError, Mismatch, ReferenceDigits};

    const PI_30: &str = "3.141592653589793238462643383279";

    #[test]
    fn parses_published_digits() {
        let reference: ReferenceDigits = PI_30.parse().unwrap();
        assert_eq!(31, reference.len());

        let wrapped: ReferenceDigits = "3.1415\n9265\n".parse().unwrap();
        assert_eq!(9, wrapped.len());
    }

    #[test]
    fn rejects_stray_characters() {
        assert_eq!(
            Err(CheckError::InvalidCharacter {
                position: 3,
                found: '.'
            }),
            "3.1.4".parse::<ReferenceDigits>()
        );
        assert_eq!(Err(CheckError::Empty), " \n".parse::<ReferenceDigits>());
    }

    #[test]
    fn aligns_groups_after_leading_digits() {
        let reference: ReferenceDigits = PI_30.parse().unwrap();
        assert!(reference.check([3, 141_592_653, 589_793_238], 1).passed());
        assert!(reference.check([31_415, 926_535_897], 5).passed());
    }

    #[test]
    fn reports_each_corrupted_group() {
        let reference: ReferenceDigits = PI_30.parse().unwrap();
        let report =
            reference.check([3, 141_592_653, 589_793_239, 462_643_383, 279], 1);
        assert_eq!(5, report.groups);
        assert_eq!(
            vec![
                Mismatch {
                    group: 2,
                    emitted: 589_793_239,
                    expected: Some(589_793_238)
                },
                Mismatch {
                    group: 4,
                    emitted: 279,
                    expected: None
                },
            ],
            report.mismatches
        );
    }
}
