// src/system/runner.rs

use crate::constants::EXPORT_ENVIRONMENT_FLAG;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("No collection specified to run.")]
    EmptyCollection,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, #[source] std::io::Error),
}

/// One runner call: `<runner> run <collection> <flags...> [--export-environment <path>]`.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub collection: &'a Path,
    pub flags: &'a [String],
    /// Where the runner should write its final environment, for the next link to pick up.
    pub export_environment: Option<&'a Path>,
}

impl Invocation<'_> {
    /// The full argument vector passed to the runner executable.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.flags.len() + 4);
        args.push("run".to_string());
        args.push(self.collection.to_string_lossy().into_owned());
        args.extend(self.flags.iter().cloned());
        if let Some(path) = self.export_environment {
            args.push(EXPORT_ENVIRONMENT_FLAG.to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        args
    }
}

/// What came back from a finished runner process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr.
    pub output: String,
}

/// The external collection runner. Abstracted so the orchestration can be driven
/// without a real Newman installation.
pub trait Runner {
    /// The program name shown in messages.
    fn executable(&self) -> &str;

    fn is_installed(&self) -> bool;

    /// Runs one invocation to completion. A non-zero exit is reported through
    /// `RunResult::success`, not as an error; errors mean the process never ran.
    fn run(&self, invocation: &Invocation<'_>) -> Result<RunResult, RunnerError>;
}

/// Runs collections with the Newman CLI, blocking until each process exits.
#[derive(Debug, Clone)]
pub struct NewmanRunner {
    executable: String,
    working_dir: PathBuf,
    debug: bool,
}

impl NewmanRunner {
    pub fn new(executable: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            working_dir: working_dir.into(),
            debug: false,
        }
    }

    /// Print every command line before executing it.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl Runner for NewmanRunner {
    fn executable(&self) -> &str {
        &self.executable
    }

    fn is_installed(&self) -> bool {
        which::which_in(
            &self.executable,
            std::env::var_os("PATH"),
            dunce::simplified(&self.working_dir),
        )
        .is_ok()
    }

    fn run(&self, invocation: &Invocation<'_>) -> Result<RunResult, RunnerError> {
        if invocation.collection.as_os_str().is_empty() {
            return Err(RunnerError::EmptyCollection);
        }

        let args = invocation.to_args();
        let printable = shlex::try_join(args.iter().map(String::as_str))
            .unwrap_or_else(|_| args.join(" "));
        let command_line = format!("{} {}", self.executable, printable);

        if self.debug {
            println!("{} {}", "[debug]".dimmed(), command_line);
        }
        log::debug!("Executing runner: {}", command_line);

        let output = StdCommand::new(&self.executable)
            .args(&args)
            .current_dir(dunce::simplified(&self.working_dir))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| RunnerError::CommandFailed(command_line.clone(), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        log::trace!(
            "Runner exited with {:?}, {} bytes of output",
            output.status.code(),
            combined.len()
        );

        Ok(RunResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            output: combined,
        })
    }
}
