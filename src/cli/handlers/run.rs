// src/cli/handlers/run.rs

use anyhow::{Result, bail};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::{
    core::{classifier, discovery, flags, orchestrator::Orchestrator, phases, project::Project},
    models::DiscoveryConfig,
    system::runner::NewmanRunner,
};

/// Entry point for `run`. The argument vector is classified by hand rather than by
/// clap, since every unknown flag belongs to the runner.
pub fn handle(args: Vec<String>, root: &Path) -> Result<()> {
    let project = Project::load(root)?;
    let discovery = discovery::discover_all(&project);

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print!("{}", render_help(&discovery));
        return Ok(());
    }

    let classified = classifier::classify(&args, &discovery)?;
    if classified.setup_links.is_empty() && classified.test_links.is_empty() {
        bail!(
            "Must specify at least one --setup or --test link.\nExamples:\n  plaintest run --test smoke\n  plaintest run --setup auth --test api_tests"
        );
    }

    let execution_phases = phases::sequence(&classified.setup_links, &classified.test_links)?;
    let base_flags = flags::with_default_environment(classified.passthrough, &discovery);
    log::debug!("Runner flags for this run: {:?}", base_flags);

    let runner = NewmanRunner::new(project.config.runner.executable.clone(), project.root.clone())
        .with_debug(classified.options.debug);
    let orchestrator = Orchestrator::new(&runner, &discovery, &project, classified.options)?;
    let outcome = orchestrator.execute(&execution_phases, &base_flags);

    print_report_summary(&outcome.context.generated_reports);
    outcome.result?;
    Ok(())
}

fn print_report_summary(reports: &[PathBuf]) {
    if reports.is_empty() {
        return;
    }
    println!();
    println!("{}", "Generated Reports:".bold());
    for report in reports {
        let label = if report.extension().is_some_and(|ext| ext == "json") {
            "JSON"
        } else {
            "HTML"
        };
        println!("   {}: {}", label, report.display());
    }
}

fn names(map: &std::collections::BTreeMap<String, PathBuf>) -> String {
    if map.is_empty() {
        return "(none)".to_string();
    }
    map.keys().cloned().collect::<Vec<_>>().join(", ")
}

/// Help for `run`, listing what this project actually contains.
fn render_help(discovery: &DiscoveryConfig) -> String {
    format!(
        "Execute API tests using Newman with setup and test phases.

Usage: plaintest run [COLLECTION...] [OPTIONS] [NEWMAN FLAGS...]

Available collections: {}
Available environments: {}
Available data files: {}

Options:
  --setup <LINK>     Setup link, run once without CSV iteration (repeatable)
  --once <LINK>      Same as --setup
  --test <LINK>      Test link, iterates over CSV data (repeatable)
  -r, --rows <SEL>   CSV row selection for test links (2 | 2-5 | 1,3,5)
  --debug            Print each Newman command before running it
  --reports          Generate timestamped HTML and JSON reports

A LINK is `collection` or `collection.Item A,Item B`.
A bare collection name is a test link. Every other flag is passed to Newman;
-e and -d also accept names of discovered environments and data files.

Examples:
  plaintest run smoke
  plaintest run --setup auth --test api_tests -d example
  plaintest run --setup \"auth.Login\" --test \"api tests.User Tests\" -d data/users.csv
  plaintest run --test \"api_tests.Create User,Update User\" -r 2-4
  plaintest run --setup db.Init --setup auth.Login --test api_tests --reports
",
        names(&discovery.collections),
        names(&discovery.environments),
        names(&discovery.data_files)
    )
}
