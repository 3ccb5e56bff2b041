// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use thiserror::Error;

use crate::{
    arch::{Address, Immediate},
    op::RawOpCode,
};

/// Contract violations reported by the engine. None of these are
/// transient; a computation that hits one should be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error(
        "address {address} is outside the word store (capacity {capacity})"
    )]
    OutOfRange { address: Address, capacity: usize },

    #[error("immediate {immediate} is out of range for `{op}`")]
    ImmediateOutOfRange {
        op: &'static str,
        immediate: Immediate,
    },

    #[error("invalid opcode {0:#04x}")]
    InvalidOpcode(RawOpCode),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("engine used before `configure`")]
    Unconfigured,

    #[error("engine already configured with a word width of {0}")]
    AlreadyConfigured(usize),

    #[error("word width must be positive")]
    ZeroWordWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("a `{0}` request is still outstanding")]
    RequestOutstanding(&'static str),

    #[error("no request is outstanding")]
    NoRequest,
}

pub type EngineResult<T> = Result<T, EngineError>;
