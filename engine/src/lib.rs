// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! A microcoded big-integer engine. Registers are fixed-width runs of
//! base-`10^9` words in a flat [`store::WordStore`]; the engine executes one
//! [`op::Op`] at a time against them.

#![forbid(unsafe_code)]

pub mod arch;
pub mod coding;
pub mod error;
pub mod op;
pub mod store;
pub mod vm;

pub use error::{EngineError, EngineResult};
pub use op::{Op, Request};
pub use store::{VecStore, WordStore};
pub use vm::{Completion, Engine, Event};
