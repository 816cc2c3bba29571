// src/cli/mod.rs

use clap::Parser;

pub mod args;
pub mod dispatcher;
pub mod handlers;

/// Semantic help template. Tags are replaced with ANSI styles at runtime.
const HELP_TEMPLATE: &str = "\
<title>plaintest</title> {version}
Convention-driven Newman runs with setup and test phases.

<title>USAGE:</title>
  <cmd>plaintest run</cmd> [<hl>COLLECTION</hl>...] [--setup <hl>LINK</hl>]... [--test <hl>LINK</hl>]... [<dim>newman flags</dim>...]
  <cmd>plaintest</cmd> <hl>COLLECTION</hl> [...]        <dim>shortcut for `run`</dim>

<title>COMMANDS:</title>
  <group>Testing</group>
    <cmd>run</cmd>                         Run collections through Newman
  <group>Sync</group>
    <cmd>scripts</cmd> pull|push <hl>NAME</hl>      Extract or build collection scripts
    <cmd>payloads</cmd> pull|push <hl>NAME</hl>     Extract or build JSON request bodies
  <group>Project</group>
    <cmd>list</cmd> <hl>KIND</hl>                   List collections, environments, data or scripts
    <cmd>init</cmd> [--force]               Scaffold a project in the current directory
    <cmd>version</cmd>                     Print the version

<dim>Run `plaintest run --help` to see the links available in this project.</dim>
";

/// Builds the color-aware help string at runtime.
fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let hl = if use_colors { "\x1b[1;36m" } else { "" }; // Bold Cyan
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let dim = if use_colors { "\x1b[2m" } else { "" };
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = HELP_TEMPLATE
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<hl>", hl)
        .replace("</hl>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// plaintest: orchestrates Newman runs over a conventional project layout.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The command followed by its arguments. Runner flags are passed through untouched.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}
