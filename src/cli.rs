//! Command-line argument surface. A thin wrapper around the core: parses
//! requests and search paths, builds the reference gateways, and prints
//! the resolve outcome.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "resolvecore", version, about = "Package resolution core")]
pub struct Cli {
    /// Package requests, e.g. `foo` or `foo-1.2.3` / `foo->=1,<2`.
    pub requests: Vec<String>,

    /// Repository search path, in priority order. Repeatable.
    #[arg(long = "path", required = true)]
    pub paths: Vec<PathBuf>,

    /// Resolve as of this unix timestamp (0 = now/unconstrained).
    #[arg(long, default_value_t = 0)]
    pub timestamp: u64,

    /// Initial per-package version load depth (0 = single unbounded solve).
    #[arg(long = "start-depth", default_value_t = 0)]
    pub start_depth: u32,

    /// Upper bound on the load depth (0 = unbounded).
    #[arg(long = "max-depth", default_value_t = 0)]
    pub max_depth: u32,

    /// Resolve for a build context rather than a runtime one.
    #[arg(long)]
    pub building: bool,

    /// Bypass the resolve cache for this invocation.
    #[arg(long)]
    pub no_cache: bool,

    /// Enable debug-level logging (overridden by `RUST_LOG` if set).
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a config file (defaults to `~/.resolvecore/config.toml`).
    #[arg(long = "config")]
    pub config_path: Option<PathBuf>,
}
