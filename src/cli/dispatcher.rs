// src/cli/dispatcher.rs

use anyhow::Result;
use std::path::Path;

use crate::cli::handlers;

/// A top-level command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &Path) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "run",
        aliases: &[],
        handler: handlers::run::handle,
    },
    CommandDefinition {
        name: "scripts",
        aliases: &["script"],
        handler: handlers::scripts::handle,
    },
    CommandDefinition {
        name: "payloads",
        aliases: &["payload"],
        handler: handlers::payloads::handle,
    },
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "init",
        aliases: &["new"],
        handler: handlers::init::handle,
    },
    CommandDefinition {
        name: "version",
        aliases: &[],
        handler: handlers::version::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `plaintest <command> [args...]` to its handler, with `root` as the project root.
///
/// Anything that is not a known command is treated as the argument list of `run`,
/// so `plaintest smoke -e dev` is the same as `plaintest run smoke -e dev`.
pub fn dispatch(all_args: Vec<String>, root: &Path) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let Some((first, rest)) = all_args.split_first() else {
        println!("Nothing to do. Try `plaintest --help` or `plaintest run --help`.");
        return Ok(());
    };

    match find_command(first) {
        Some(command) => (command.handler)(rest.to_vec(), root),
        None => handlers::run::handle(all_args, root),
    }
}
