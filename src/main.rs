mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use colored::Colorize;
use resolvecore::cache::FileCacheGateway;
use resolvecore::config::ResolverConfig;
use resolvecore::error::user_friendly_error;
use resolvecore::repo::FilesystemRepoGateway;
use resolvecore::resolver::Resolver;
use resolvecore::solver::reference::RangeMatchSolver;
use resolvecore::solver::SolverAdapter;
use resolvecore::types::{PackageRequest, ResolverStatus};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("off")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let requests = cli
        .requests
        .iter()
        .map(|s| PackageRequest::parse(s))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| "failed to parse a package request".to_string())?;

    let config = ResolverConfig::load(cli.config_path.as_deref()).map_err(|e| {
        user_friendly_error(e).display();
        anyhow::anyhow!("configuration load failed")
    })?;

    let repo = FilesystemRepoGateway::new();
    let solver = RangeMatchSolver::new(Arc::new(FilesystemRepoGateway::new()));
    let adapter = SolverAdapter::new(solver);

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("resolvecore");
    let cache = FileCacheGateway::new(cache_dir);

    let mut resolver = Resolver::construct(
        requests,
        cli.paths,
        &adapter,
        &cache,
        &repo,
        config,
        cli.timestamp,
        cli.building,
        cli.verbose,
        !cli.no_cache,
        cli.start_depth,
        cli.max_depth,
        None,
        None,
    )
    .map_err(|e| {
        user_friendly_error(e).display();
        anyhow::anyhow!("resolver construction failed")
    })?;

    resolver.solve();

    match resolver.status() {
        ResolverStatus::Solved => {
            println!(
                "{} {} package(s) resolved{}",
                "ok:".green().bold(),
                resolver.resolved_packages().len(),
                if resolver.from_cache() { " (cached)" } else { "" }
            );
            for variant in resolver.resolved_packages() {
                println!("  {}", variant.qualified_name);
            }
            Ok(())
        }
        ResolverStatus::Failed => {
            eprintln!(
                "{} {}",
                "failed:".red().bold(),
                resolver.failure_description().unwrap_or("no satisfying assignment")
            );
            std::process::exit(1);
        }
        ResolverStatus::Aborted => {
            eprintln!(
                "{} {}",
                "aborted:".yellow().bold(),
                resolver.failure_description().unwrap_or("resolve was cancelled")
            );
            std::process::exit(2);
        }
        ResolverStatus::Pending => unreachable!("solve() always leaves the resolver non-pending"),
    }
}
