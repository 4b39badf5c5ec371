//! Command-line front end for the confidential ballot ledger
//!
//! `ballot config` prints the resolved configuration; `ballot demo` deploys a
//! ledger in-process, runs one full voting round through the client service,
//! and prints the final view model as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::demo::DemoArgs;

#[derive(Parser)]
#[command(name = "ballot")]
#[command(about = "Confidential ballot ledger tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path [default: ./ballot.toml if present]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration as TOML
    Config,

    /// Run a complete voting round against an in-process ledger
    Demo(DemoArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    let log_filter = if cli.verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    ballot_effects::init_tracing(log_filter)?;

    match cli.command {
        Commands::Config => commands::config::show(&config)?,
        Commands::Demo(args) => commands::demo::run(config, args).await?,
    }
    Ok(())
}
