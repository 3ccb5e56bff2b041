// Copyright (C) 2024 Ethan Uppal and Utku Melemetci. All rights reserved.

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use machin_pi::{
    render, write_transcript, PiConfig, PiDigits, ReferenceDigits,
};
use tracing::{info, subscriber::set_global_default};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One zero-padded nine-digit group per line.
    Lines,
    /// A single decimal string.
    Text,
}

/// Computes decimal digits of pi with Machin's formula on a fixed-width
/// big-integer engine.
#[derive(Debug, Parser)]
#[command(name = "machin-pi", version)]
struct Cli {
    /// Number of digits to compute.
    #[arg(short, long, default_value_t = 1000)]
    digits: u64,

    /// How to print the digit groups.
    #[arg(short, long, value_enum, default_value_t = Format::Lines)]
    format: Format,

    /// Word store capacity in words. Defaults to what the registers need.
    #[arg(long)]
    capacity: Option<usize>,

    /// File of known-good digits of pi to check the output against.
    #[arg(long)]
    check: Option<PathBuf>,
}

fn setup_tracing() -> Result<()> {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_timer(fmt::time::uptime());
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer);
    set_global_default(subscriber).context("failed to set tracing subscriber")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing()?;

    let reference = cli
        .check
        .as_ref()
        .map(|path| -> Result<ReferenceDigits> {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            text.parse()
                .with_context(|| format!("failed to parse {}", path.display()))
        })
        .transpose()?;

    let mut config = PiConfig::new(cli.digits)?;
    if let Some(capacity) = cli.capacity {
        config = config.with_capacity(capacity)?;
    }
    let mut pi = PiDigits::new(config)?;

    let groups = pi
        .by_ref()
        .collect::<Result<Vec<_>, _>>()
        .context("pi computation aborted")?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.format {
        Format::Lines => write_transcript(&mut out, groups.iter().copied())?,
        Format::Text => writeln!(out, "{}", render(groups.iter().copied()))?,
    }
    out.flush()?;

    let stats = pi.stats();
    info!(
        terms_5 = stats.terms[0],
        terms_239 = stats.terms[1],
        requests = stats.requests,
        "done"
    );

    if let Some(reference) = reference {
        let report = reference.check(groups, config.leading_group_digits());
        for mismatch in &report.mismatches {
            eprintln!("{mismatch}");
        }
        if !report.passed() {
            bail!(
                "{} of {} groups differ from the reference",
                report.mismatches.len(),
                report.groups
            );
        }
        eprintln!("all {} groups match the reference", report.groups);
    }

    Ok(())
}
