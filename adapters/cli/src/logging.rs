//! Tracing setup for the command-line adapter.
//!
//! Logs go to stderr so stdout carries only trial records.

use std::{env, io};

use clap::Args;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crate targets whose logs we surface by default.
const OUR_CRATES: [&str; 4] = [
    "stimulus_grid",
    "stimulus_grid_world",
    "stimulus_grid_system_placement",
    "stimulus_grid_system_session",
];

/// Logging controls.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct LogArgs {
    /// Set a single log level for our crates (error|warn|info|debug|trace)
    #[arg(long, conflicts_with = "log_filter")]
    pub(crate) log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides RUST_LOG),
    /// e.g. "stimulus_grid_system_placement=debug"
    #[arg(long)]
    pub(crate) log_filter: Option<String>,
}

fn level_spec_for(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    OUR_CRATES
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolves the filter directive.
///
/// Precedence: `--log-filter`, then `--log-level`, then `RUST_LOG`, then
/// crate-scoped `info`.
fn compute_spec(args: &LogArgs, rust_log: Option<String>) -> String {
    if let Some(filter) = &args.log_filter {
        return filter.clone();
    }
    if let Some(level) = &args.log_level {
        return level_spec_for(level);
    }
    rust_log.unwrap_or_else(|| level_spec_for("info"))
}

/// Installs the global subscriber. A subscriber installed earlier wins.
pub(crate) fn init(args: &LogArgs) {
    let spec = compute_spec(args, env::var("RUST_LOG").ok());
    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(spec))
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .try_init();
    if let Err(error) = installed {
        eprintln!("logging already initialised: {error}");
    }
}
