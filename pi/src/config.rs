// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use machin_engine::arch::DIGITS_PER_WORD;

use crate::error::{PiError, PiResult};

/// Extra digits of register width on top of the requested count.
pub const WIDTH_GUARD_DIGITS: u64 = 23;

/// `R0` is scaled to `10^(digits + SCALE_GUARD_DIGITS)`.
pub const SCALE_GUARD_DIGITS: u64 = 21;

/// Whole words dropped from the combined result.
pub const TRIM_WORDS: u64 = 2;

/// Decimal digits dropped from the combined result after [`TRIM_WORDS`].
pub const TRIM_DIGITS: usize = 4;

/// `R0` plus a `(T, Acc, U)` window for each of the two arctangents.
pub const REGISTERS_IN_USE: usize = 7;

/// Parameters of one pi computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiConfig {
    digits: u64,
    capacity: usize,
}

impl PiConfig {
    /// Configures a computation of `digits` digits with a store sized for
    /// exactly the registers it uses.
    pub fn new(digits: u64) -> PiResult<Self> {
        let word_width = Self::word_width_for(digits)?;
        let capacity = word_width
            .checked_mul(REGISTERS_IN_USE)
            .ok_or(PiError::TooManyDigits(digits))?;
        Ok(Self { digits, capacity })
    }

    /// Overrides the word store capacity, which must still hold every
    /// register.
    pub fn with_capacity(self, capacity: usize) -> PiResult<Self> {
        let needed = self.word_width() * REGISTERS_IN_USE;
        if capacity < needed {
            return Err(PiError::CapacityTooSmall { needed, capacity });
        }
        Ok(Self { capacity, ..self })
    }

    pub fn digits(&self) -> u64 {
        self.digits
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `floor((digits + 23) / 9) + 1`.
    pub fn word_width(&self) -> usize {
        (self.digits + WIDTH_GUARD_DIGITS) as usize
            / DIGITS_PER_WORD as usize
            + 1
    }

    /// Whole words `R0` is shifted left by.
    pub fn scale_words(&self) -> u64 {
        (self.digits + SCALE_GUARD_DIGITS) / DIGITS_PER_WORD as u64
    }

    /// Power of ten `R0` is multiplied by after the shift.
    pub fn scale_exponent(&self) -> usize {
        ((self.digits + SCALE_GUARD_DIGITS) % DIGITS_PER_WORD as u64) as usize
    }

    /// Digits in the first emitted group. Every later group holds nine.
    pub fn leading_group_digits(&self) -> usize {
        ((self.digits - 1) % DIGITS_PER_WORD as u64) as usize + 1
    }

    fn word_width_for(digits: u64) -> PiResult<usize> {
        if digits == 0 {
            return Err(PiError::ZeroDigits);
        }
        digits
            .checked_add(WIDTH_GUARD_DIGITS)
            .and_then(|guarded| usize::try_from(guarded).ok())
            .map(|guarded| guarded / DIGITS_PER_WORD as usize + 1)
            .ok_or(PiError::TooManyDigits(digits))
    }
}

#[cfg(test)]
mod tests {
    use super::PiConfig;
    use crate::error::PiError;

    #[test]
    fn derives_widths_from_digits() {
        let config = PiConfig::new(50).unwrap();
        assert_eq!(9, config.word_width());
        assert_eq!(63, config.capacity());
        assert_eq!(7, config.scale_words());
        assert_eq!(8, config.scale_exponent());
        assert_eq!(5, config.leading_group_digits());

        let million = PiConfig::new(1_000_000).unwrap();
        assert_eq!(111_114, million.word_width());
        assert!(million.capacity() <= 800_000);
        assert_eq!(1, million.leading_group_digits());
    }

    #[test]
    fn rejects_zero_digits() {
        assert_eq!(Err(PiError::ZeroDigits), PiConfig::new(0));
    }

    #[test]
    fn rejects_too_small_capacity() {
        let config = PiConfig::new(50).unwrap();
        assert_eq!(
            Err(PiError::CapacityTooSmall {
                needed: 63,
                capacity: 62
            }),
            config.with_capacity(62)
        );
        assert_eq!(800_000, config.with_capacity(800_000).unwrap().capacity());
    }
}
