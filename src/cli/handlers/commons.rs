// src/cli/handlers/commons.rs

// Shared by the `scripts` and `payloads` handlers.

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;
use std::path::Path;

use crate::{
    cli::args::{SyncAction, SyncArgs},
    core::{
        project::Project,
        sync::{SyncReport, Synchronizer},
    },
};

/// What a sync command moves between the collection and the file system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTarget {
    Scripts,
    Payloads,
}

impl SyncTarget {
    fn label(self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Payloads => "payloads",
        }
    }
}

/// Parses `pull|push <collection>` and runs the matching extract or build.
pub fn handle_sync(args: Vec<String>, root: &Path, target: SyncTarget) -> Result<()> {
    let sync_args = SyncArgs::try_parse_from(&args)?;
    let project = Project::load(root)?;
    let synchronizer = Synchronizer::new(&project);

    match &sync_args.action {
        SyncAction::Pull { collection } => {
            let report = match target {
                SyncTarget::Scripts => synchronizer.extract_scripts(collection),
                SyncTarget::Payloads => synchronizer.extract_payloads(collection),
            }
            .map_err(|e| anyhow!("Error pulling {} from '{}': {}", target.label(), collection, e))?;
            print_summary(&report, "extracted");
            let dir = match target {
                SyncTarget::Scripts => project.scripts_dir(),
                SyncTarget::Payloads => project.payloads_dir(),
            };
            println!(
                "Successfully extracted {} from {} to {}",
                target.label(),
                collection.cyan(),
                dir.join(collection).display()
            );
        }
        SyncAction::Push { collection } => {
            let report = match target {
                SyncTarget::Scripts => synchronizer.build_scripts(collection),
                SyncTarget::Payloads => synchronizer.build_payloads(collection),
            }
            .map_err(|e| anyhow!("Error pushing {} into '{}': {}", target.label(), collection, e))?;
            print_summary(&report, "applied");
            println!(
                "Successfully updated {} with {}",
                synchronizer.collection_path(collection).display(),
                target.label()
            );
        }
    }
    Ok(())
}

fn print_summary(report: &SyncReport, verb: &str) {
    let mut line = format!("{} file(s) {}", report.files.len(), verb);
    if report.skipped > 0 {
        line.push_str(&format!(", {} skipped", report.skipped));
    }
    println!("{}", line.dimmed());
}
