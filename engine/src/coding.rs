// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use crate::arch::Word;

/// Packs bit fields, least significant field first, into a `$T`.
///
/// ```
/// # use machin_engine::{encode, coding::CodeAsWord};
/// let control = encode!(u32; [..8..] = 3u8, [..8..] = 1u8);
/// assert_eq!(0x0103, control);
/// ```
#[macro_export]
macro_rules! encode {
    (
        $T:ty;
        $([..$width:literal..] = $int:expr),*
    ) => {
        {
            let mut offset = 0;
            let mut result: $T = 0;
            $(
                let encoded_int: $T = $int.encode_as_word();
                let mask: $T = (((1 as $T) << $width) - 1) as $T;
                result |= ((encoded_int & mask) << offset);
                offset += $width;
            )*
            let _ = offset;
            result
        }
    };
}

/// Types that occupy a bit field of a control word.
pub trait CodeAsWord {
    /// Encodes `self` into a `Word`. Higher bits are chopped off by the
    /// field mask if the slot is narrower than `Self`.
    fn encode_as_word(&self) -> Word;

    /// Decodes `self` from the least significant bits of `encoded`.
    fn decode_from_word(encoded: Word) -> Self;
}

impl CodeAsWord for u8 {
    fn encode_as_word(&self) -> Word {
        *self as Word
    }

    fn decode_from_word(encoded: Word) -> Self {
        encoded as u8
    }
}

/// Unpacks bit fields, least significant field first, from `$encoded` and
/// evaluates `$block` with them bound.
#[macro_export]
macro_rules! decode {
    (
        $encoded:expr; $TEnc:ty;
        @($($out:ident: $T:ty = [..$width:literal..]),*)
        => $block:expr
    ) => {{
        let encoded: $TEnc = $encoded;
        let mut __offset: u32 = 0;
        $(
            let op_width: u32 = $width;
            let mask = (1 as $TEnc)
                .checked_shl(op_width)
                .unwrap_or(0)
                .wrapping_sub(1);
            let $out = <$T>::decode_from_word(
                encoded.checked_shr(__offset).unwrap_or(0) & mask,
            );
            __offset += op_width;
        )*
        let _ = __offset;
        $block
    }};
}
