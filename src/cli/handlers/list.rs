// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    cli::args::{ListArgs, ListKind},
    constants::SCRIPT_EXTENSION,
    core::{discovery, project::Project},
};

/// `list collections|environments|data|scripts`.
pub fn handle(args: Vec<String>, root: &Path) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;
    let project = Project::load(root)?;

    match list_args.kind {
        ListKind::Scripts => print_script_directories(&project.scripts_dir()),
        kind => {
            let found = discovery::discover_all(&project);
            let (label, resources, dir) = match kind {
                ListKind::Environments => ("environments", found.environments, project.environments_dir()),
                ListKind::Data => ("data files", found.data_files, project.data_dir()),
                _ => ("collections", found.collections, project.collections_dir()),
            };
            print_resources(label, &resources, &dir);
        }
    }
    Ok(())
}

fn print_resources(label: &str, resources: &BTreeMap<String, PathBuf>, dir: &Path) {
    if resources.is_empty() {
        println!("No {} found in {}", label, dir.display());
        return;
    }
    println!("Available {}:", label);
    for (name, path) in resources {
        println!("  {} ({})", name.cyan(), path.display());
    }
}

fn print_script_directories(scripts_dir: &Path) {
    let directories = script_directories(scripts_dir);
    if directories.is_empty() {
        println!("No extracted scripts found in {}", scripts_dir.display());
        println!("Use 'plaintest scripts pull <collection>' to extract scripts");
        return;
    }
    println!("Available script directories:");
    for (name, count) in directories {
        println!("  {} ({} script files)", name.cyan(), count);
    }
}

/// Each collection directory under `scripts_dir` with the number of `.js` files it holds.
fn script_directories(scripts_dir: &Path) -> Vec<(String, usize)> {
    WalkDir::new(scripts_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            (name, count_script_files(entry.path()))
        })
        .collect()
}

fn count_script_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == SCRIPT_EXTENSION)
        })
        .count()
}
