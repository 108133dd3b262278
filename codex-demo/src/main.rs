//! Codex registry demo
//!
//! Builds a small parent/child tree in the registry, then removes a child
//! and the root, printing the registry after each step.
//!
//! Usage:
//!   codex-demo --children 3
//!   codex-demo --config codex.toml --json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use codex::CodexConfig;
use codex_demo::run_scenario;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "codex-demo")]
#[command(about = "Walk a parent/child tree through the codex registry")]
struct Args {
    /// Path to a registry config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of children under the root
    #[arg(short = 'n', long, default_value = "3")]
    children: usize,

    /// Print the reports as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => CodexConfig::try_load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => CodexConfig::default(),
    };
    info!(id_scheme = %config.id_scheme, children = args.children, "Codex demo starting...");

    let scenario = run_scenario(&config, args.children).context("Scenario failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&scenario).context("Failed to encode scenario")?;
        println!("{json}");
    } else {
        println!("Initial tree:\n{}\n", scenario.initial);
        if let Some(child) = scenario.removed_child {
            println!("After removing child {child}:\n{}\n", scenario.after_child_removal);
        }
        println!("After removing root {}:\n{}", scenario.root, scenario.after_root_removal);
    }

    Ok(())
}
