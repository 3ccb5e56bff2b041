// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::fmt;

use enum_tags::enum_tags;
use static_assertions::const_assert;

use crate::{
    arch::{Immediate, RegisterIndex, Word},
    coding::CodeAsWord,
    decode, encode,
    error::{EngineError, EngineResult},
};

/// Smallest sized integer type that can fit an op code.
pub type RawOpCode = u8;

/// Bits for opcode.
pub const OPCODE_BITS: usize = 8;
const_assert!(OPCODE_BITS <= RawOpCode::BITS as usize);

/// Bits for a register index.
pub const REGISTER_BITS: usize = 8;
const_assert!(REGISTER_BITS <= RegisterIndex::BITS as usize);

//  +--------------------------------------------------------------------+
//  | Control word layout: opcode | dest | src1 | src2, LSB first.       |
//  | The immediate travels beside the control word, never inside it.    |
//  +--------------------------------------------------------------------+
const_assert!(OPCODE_BITS + 3 * REGISTER_BITS <= Word::BITS as usize);

/// An engine operation. Operands are ordered destination first, then
/// sources, then the immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[enum_tags(public, repr(RawOpCode))]
pub enum Op {
    /// `Self::Set(d, k)` loads `k` into `d`, zeroing every other word.
    Set(RegisterIndex, Immediate),
    /// `Self::AddImmediate(d, s, k)` stores `s + k` in `d`, `k < 10^9`.
    AddImmediate(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::Add(d, a, b)` stores `a + b` in `d`.
    Add(RegisterIndex, RegisterIndex, RegisterIndex),
    /// `Self::SubtractImmediate(d, s, k)` stores `s - k` in `d`, `k < 10^9`.
    SubtractImmediate(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::Subtract(d, a, b)` stores `a - b` in `d`. Requires `a >= b`.
    Subtract(RegisterIndex, RegisterIndex, RegisterIndex),
    /// `Self::MultiplyImmediate(d, s, k)` stores `s * k` in `d`.
    MultiplyImmediate(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::DivideImmediate(d, s, k)` stores `s / k` in `d`, rounding
    /// toward zero.
    DivideImmediate(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::Copy(d, s)` copies `s` into `d`.
    Copy(RegisterIndex, RegisterIndex),
    /// `Self::LeftShift(d, s, k)` stores `s * 10^(9k)` in `d`, dropping the
    /// `k` words that no longer fit.
    LeftShift(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::RightShift(d, s, k)` stores `s / 10^(9k)` in `d`.
    RightShift(RegisterIndex, RegisterIndex, Immediate),
    /// `Self::Output(s)` streams the words of `s` from the most
    /// significant non-zero word down.
    Output(RegisterIndex),
    /// `Self::IsZero(s)` completes with 1 if `s` is zero, else 0.
    IsZero(RegisterIndex),
}

/// The packed form of an [`Op`] as it crosses into the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub control: Word,
    pub immediate: Immediate,
}

impl Op {
    pub const fn opcode(&self) -> RawOpCode {
        self.tag()
    }

    /// Returns `(dest, src1, src2, immediate)`, with unused slots zero.
    pub const fn operands(
        &self,
    ) -> (RegisterIndex, RegisterIndex, RegisterIndex, Immediate) {
        match *self {
            Self::Set(d, k) => (d, 0, 0, k),
            Self::Add(d, a, b) | Self::Subtract(d, a, b) => (d, a, b, 0),
            Self::AddImmediate(d, s, k)
            | Self::SubtractImmediate(d, s, k)
            | Self::MultiplyImmediate(d, s, k)
            | Self::DivideImmediate(d, s, k)
            | Self::LeftShift(d, s, k)
            | Self::RightShift(d, s, k) => (d, s, 0, k),
            Self::Copy(d, s) => (d, s, 0, 0),
            Self::Output(s) | Self::IsZero(s) => (0, s, 0, 0),
        }
    }

    /// Encodes this operation as a [`Request`].
    pub fn encode(&self) -> Request {
        let (dest, src1, src2, immediate) = self.operands();
        Request {
            control: encode!(Word;
                [..8..] = self.opcode(),
                [..8..] = dest,
                [..8..] = src1,
                [..8..] = src2
            ),
            immediate,
        }
    }

    /// Decodes an operation from a [`Request`], rejecting opcodes that name
    /// no operation.
    pub fn decode(request: Request) -> EngineResult<Self> {
        let k = request.immediate;
        decode!(request.control; Word;
            @(
                opcode: RawOpCode = [..8..],
                d: RegisterIndex = [..8..],
                a: RegisterIndex = [..8..],
                b: RegisterIndex = [..8..]
            ) => {
                match opcode {
                    Self::SET_TAG => Ok(Self::Set(d, k)),
                    Self::ADD_IMMEDIATE_TAG => Ok(Self::AddImmediate(d, a, k)),
                    Self::ADD_TAG => Ok(Self::Add(d, a, b)),
                    Self::SUBTRACT_IMMEDIATE_TAG => {
                        Ok(Self::SubtractImmediate(d, a, k))
                    }
                    Self::SUBTRACT_TAG => Ok(Self::Subtract(d, a, b)),
                    Self::MULTIPLY_IMMEDIATE_TAG => {
                        Ok(Self::MultiplyImmediate(d, a, k))
                    }
                    Self::DIVIDE_IMMEDIATE_TAG => {
                        Ok(Self::DivideImmediate(d, a, k))
                    }
                    Self::COPY_TAG => Ok(Self::Copy(d, a)),
                    Self::LEFT_SHIFT_TAG => Ok(Self::LeftShift(d, a, k)),
                    Self::RIGHT_SHIFT_TAG => Ok(Self::RightShift(d, a, k)),
                    Self::OUTPUT_TAG => Ok(Self::Output(a)),
                    Self::IS_ZERO_TAG => Ok(Self::IsZero(a)),
                    other => Err(EngineError::InvalidOpcode(other)),
                }
            }
        )
    }
}

impl From<Op> for Request {
    fn from(op: Op) -> Self {
        op.encode()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        match *self {
            Self::Set(d, k) => write!(f, " r{d}, #{k}"),
            Self::Add(d, a, b) | Self::Subtract(d, a, b) => {
                write!(f, " r{d}, r{a}, r{b}")
            }
            Self::AddImmediate(d, s, k)
            | Self::SubtractImmediate(d, s, k)
            | Self::MultiplyImmediate(d, s, k)
            | Self::DivideImmediate(d, s, k)
            | Self::LeftShift(d, s, k)
            | Self::RightShift(d, s, k) => write!(f, " r{d}, r{s}, #{k}"),
            Self::Copy(d, s) => write!(f, " r{d}, r{s}"),
            Self::Output(s) | Self::IsZero(s) => write!(f, " r{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Op, Request, OPCODE_BITS};
    use crate::{arch::Word, error::EngineError};

    #[test]
    fn encodes_correctly() {
        assert_eq!(
            Request {
                control: 0,
                immediate: 7
            },
            Op::Set(0, 7).encode()
        );
        assert_eq!(
            (Op::ADD_TAG as Word) | (1 << 8) | (2 << 16) | (3 << 24),
            Op::Add(1, 2, 3).encode().control
        );
        assert_eq!(
            (Op::OUTPUT_TAG as Word) | (4 << 16),
            Op::Output(4).encode().control
        );
    }

    #[test]
    fn tags_follow_declaration_order() {
        assert_eq!(0, Op::SET_TAG);
        assert_eq!(11, Op::IS_ZERO_TAG);
        assert_eq!(Op::IS_ZERO_TAG, Op::IsZero(0).tag());
        assert_eq!(
            "divide_immediate",
            Op::DivideImmediate(0, 0, 1).mnemonic()
        );
        assert_eq!("left_shift", Op::LeftShift(0, 0, 1).mnemonic());
    }

    #[test]
    fn decodes_hand_packed_requests() {
        let divide = Request {
            control: (Op::DIVIDE_IMMEDIATE_TAG as Word) | (2 << 8),
            immediate: 57121,
        };
        assert_eq!(Ok(Op::DivideImmediate(2, 0, 57121)), Op::decode(divide));

        // the destination field is ignored by ops that only read
        let output = Request {
            control: (Op::OUTPUT_TAG as Word) | (9 << 8) | (6 << 16),
            immediate: 0,
        };
        assert_eq!(Ok(Op::Output(6)), Op::decode(output));

        let set = Op::Set(1, 1 << 40).encode();
        assert_eq!(Ok(Op::Set(1, 1 << 40)), Op::decode(set));
    }

    #[test]
    fn rejects_unknown_opcodes() {
        let request = Request {
            control: 0xff | (1 << OPCODE_BITS),
            immediate: 0,
        };
        assert_eq!(Err(EngineError::InvalidOpcode(0xff)), Op::decode(request));
    }

    #[test]
    fn displays_as_assembly() {
        assert_eq!("add r3, r4, r5", Op::Add(3, 4, 5).to_string());
        assert_eq!(
            "divide_immediate r2, r0, #239",
            Op::DivideImmediate(2, 0, 239).to_string()
        );
        assert_eq!("is_zero r3", Op::IsZero(3).to_string());
    }
}
