// src/cli/handlers/init.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use crate::{cli::args::InitArgs, core::scaffold};

/// The main handler for the `init` command.
pub fn handle(args: Vec<String>, root: &Path) -> Result<()> {
    let init_args = InitArgs::try_parse_from(&args)?;
    let target_dir = match &init_args.path {
        Some(path) => root.join(path),
        None => root.to_path_buf(),
    };
    println!("Initializing project in: {}", target_dir.display());

    let report = scaffold::scaffold(&target_dir, init_args.force)?;
    for path in &report.written {
        println!("  {} {}", "created".green(), path.display());
    }
    for path in &report.skipped {
        println!("  {} {} (use --force to overwrite)", "exists".yellow(), path.display());
    }

    println!("\n{}", "PlainTest project initialized successfully!".green().bold());
    println!("Try: plaintest run smoke");
    println!("Or:  plaintest run --setup get_auth --test api_tests");
    println!("Or:  plaintest run api_tests -d example -r 1-2");
    Ok(())
}
