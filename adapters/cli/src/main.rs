#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs stimulus placement trials.
//!
//! Each finished trial is written to stdout as one JSON line.

mod config;
mod logging;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use stimulus_grid_system_placement::{Config, Placement};
use stimulus_grid_system_session::Session;
use stimulus_grid_world::query;
use tracing::info;

use crate::{
    config::{FileConfig, Overrides},
    logging::LogArgs,
};

/// Generates randomized, non-overlapping stimulus layouts on a grid.
#[derive(Debug, Parser)]
#[command(name = "stimulus-grid", version)]
struct Cli {
    /// TOML file with `[grid]`, `[display]` and `[session]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(flatten)]
    log: LogArgs,
}

/// Entry point for the stimulus grid command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = file
        .with_overrides(&cli.overrides)
        .resolve()
        .context("invalid experiment configuration")?;

    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut session = Session::new(
        settings.dimensions,
        settings.display,
        Placement::new(Config::new(seed)),
        settings.layout,
    );
    info!(
        seed,
        columns = settings.dimensions.columns(),
        rows = settings.dimensions.rows(),
        free_cells = query::free_cell_count(session.grid()),
        "session started"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for _ in 0..settings.trials {
        let outcome = session.run_trial(settings.count, settings.practice);
        serde_json::to_writer(&mut out, &outcome.record).context("failed to write trial record")?;
        writeln!(out).context("failed to write trial record")?;
    }
    out.flush().context("failed to flush stdout")?;
    Ok(())
}
