// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use machin_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PiError {
    #[error("at least one digit must be requested")]
    ZeroDigits,

    #[error("{0} digits do not fit in addressable memory")]
    TooManyDigits(u64),

    #[error(
        "word store of {capacity} words cannot hold {needed} words of \
         registers"
    )]
    CapacityTooSmall { needed: usize, capacity: usize },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type PiResult<T> = Result<T, PiError>;
