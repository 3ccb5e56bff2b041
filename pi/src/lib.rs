// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

//! Digits of pi from Machin's formula, computed entirely by requests to a
//! [`machin_engine::Engine`].

#![forbid(unsafe_code)]

pub mod check;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod render;

pub use check::{CheckReport, Mismatch, ReferenceDigits};
pub use config::PiConfig;
pub use error::{PiError, PiResult};
pub use orchestrator::{PiDigits, PiStats};
pub use render::{render, write_transcript};

/// Starts computing `digits` digits of pi. Nothing is computed until the
/// returned iterator is advanced.
pub fn compute_pi(digits: u64) -> PiResult<PiDigits> {
    PiDigits::new(PiConfig::new(digits)?)
}
