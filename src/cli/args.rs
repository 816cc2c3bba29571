// src/cli/args.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arguments of `scripts` and `payloads`.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub action: SyncAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Extract from `collections/<name>.postman_collection.json` into editable files.
    #[command(alias = "extract")]
    Pull { collection: String },
    /// Write the editable files back into the collection.
    #[command(alias = "build")]
    Push { collection: String },
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct ListArgs {
    #[command(subcommand)]
    pub kind: ListKind,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Collections,
    #[command(alias = "envs")]
    Environments,
    Data,
    Scripts,
}

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true)]
pub struct InitArgs {
    /// Directory to scaffold. Defaults to the current directory.
    pub path: Option<PathBuf>,

    /// Overwrite starter files that already exist.
    #[arg(long)]
    pub force: bool,
}
