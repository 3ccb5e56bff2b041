// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use static_assertions::const_assert;

/// One base-`10^9` digit group. Always in `[0, BASE)` once stored.
pub type Word = u32;

/// A 64-bit partial product or dividend.
pub type DoubleWord = u64;

/// Index of a word in the word store.
pub type Address = usize;

/// Index of a register. Register `r` starts at `r * word_width`.
pub type RegisterIndex = u8;

/// The scalar operand of a request.
pub type Immediate = u64;

/// Decimal digits held by one word.
pub const DIGITS_PER_WORD: u32 = 9;

/// Radix of the word representation.
pub const BASE: Word = 1_000_000_000;
const_assert!(BASE as u64 == 10u64.pow(DIGITS_PER_WORD));
const_assert!((BASE as u64) < (Word::MAX as u64));

/// Largest multiplier for which `word * k + carry` cannot overflow a
/// [`DoubleWord`] (the carry is always below [`BASE`]).
pub const MAX_MULTIPLY_IMMEDIATE: Immediate =
    (DoubleWord::MAX - (BASE as DoubleWord - 1)) / BASE as DoubleWord;

/// Largest divisor for which `remainder * BASE + word` cannot overflow a
/// [`DoubleWord`] (the remainder is always below the divisor).
pub const MAX_DIVIDE_IMMEDIATE: Immediate =
    DoubleWord::MAX / BASE as DoubleWord;
const_assert!(MAX_DIVIDE_IMMEDIATE >= MAX_MULTIPLY_IMMEDIATE);

/// Words needed to hold any [`Immediate`] in base `10^9`.
pub const IMMEDIATE_WORDS: usize = 3;
const_assert!(
    (BASE as u128) * (BASE as u128) * (BASE as u128) > Immediate::MAX as u128
);

/// Capacity of the reference design's store, enough for seven registers of
/// a million-digit computation.
pub const DEFAULT_STORE_CAPACITY: usize = 800_000;
