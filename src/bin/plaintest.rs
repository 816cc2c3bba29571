// src/bin/plaintest.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use plaintest::cli::{Cli, dispatcher};
use std::env;

/// Sets up logging, parses arguments, dispatches, and handles errors centrally.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// The project root is always the current directory.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);
    let root = env::current_dir().context("Could not determine the current directory")?;
    dispatcher::dispatch(cli.args, &root)
}
