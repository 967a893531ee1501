//! # Main — CLI Entry Point
//!
//! Parses arguments, initializes structured logging and the global
//! allocator, and dispatches to the `search` or `check` subcommand.

mod cli;

use anyhow::Result;
use clap::Parser;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.log_format);

    match &cli.command {
        Command::Search { .. } => cli::run_search(&cli, &cli.command),
        Command::Check { .. } => cli::run_check(&cli.command),
    }
}
