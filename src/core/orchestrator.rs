// src/core/orchestrator.rs

//! # Orchestrator
//!
//! Runs sequenced phases link by link against a [`Runner`]. Each link's flags are
//! derived from the shared pass-through flags by the pure rewriters in
//! [`crate::core::flags`]; each non-terminal link hands its exported environment
//! to the next one through an [`EnvironmentChain`] that is cleaned up when the run
//! ends, whatever the outcome.

use crate::{
    constants::REPORT_TIMESTAMP_FORMAT,
    core::{
        env_chain::EnvironmentChain,
        flags,
        phases::{self, LinkParseError},
        project::{Project, ProjectConfigError},
        rows::{self, RowSelection, RowSelectionError},
    },
    models::{DiscoveryConfig, ExecutionPhase, LinkSpec, Phase, RunOptions},
    system::runner::{Invocation, RunResult, Runner, RunnerError},
};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Unknown {kind}: '{name}'. Available: [{}]", .available.join(", "))]
    UnknownResource {
        kind: &'static str,
        name: String,
        available: Vec<String>,
    },
    #[error(transparent)]
    LinkParse(#[from] LinkParseError),
    #[error("'{0}' is not installed. Install with: npm install -g newman newman-reporter-htmlextra")]
    RunnerNotInstalled(String),
    #[error("{phase} link '{link}' failed: {}", failure_reason(.exit_code, .source))]
    ExecutionFailure {
        phase: Phase,
        link: String,
        exit_code: Option<i32>,
        /// Combined runner output, when the runner got far enough to produce any.
        output: Option<String>,
        #[source]
        source: Option<RunnerError>,
    },
    #[error(transparent)]
    Rows(#[from] RowSelectionError),
    #[error(transparent)]
    Config(#[from] ProjectConfigError),
    #[error("Could not create directory '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn failure_reason(exit_code: &Option<i32>, source: &Option<RunnerError>) -> String {
    match (source, exit_code) {
        (Some(e), _) => e.to_string(),
        (None, Some(code)) => format!("tests failed with exit code {}", code),
        (None, None) => "runner was terminated by a signal".to_string(),
    }
}

/// State threaded through one `run` invocation. Created fresh per run and
/// handed back to the caller in a [`RunOutcome`].
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub options: RunOptions,
    /// Report files requested from the runner, in generation order.
    pub generated_reports: Vec<PathBuf>,
    pub links_completed: usize,
}

/// The context of a finished run plus its result. The context is kept even when
/// the run failed, so reports generated before the failure can still be listed.
#[derive(Debug)]
pub struct RunOutcome {
    pub context: RunContext,
    pub result: Result<(), RunError>,
}

/// Where a link sits in the whole run.
#[derive(Debug, Clone, Copy)]
struct LinkStep {
    phase: Phase,
    position: usize,
    total: usize,
}

impl LinkStep {
    fn is_last(self) -> bool {
        self.position >= self.total
    }
}

/// Executes phases sequentially and fail-fast.
pub struct Orchestrator<'a> {
    runner: &'a dyn Runner,
    discovery: &'a DiscoveryConfig,
    options: RunOptions,
    rows: Option<RowSelection>,
    working_dir: PathBuf,
    temp_dir: PathBuf,
    reports_dir: PathBuf,
}

impl std::fmt::Debug for Orchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("runner", &self.runner.executable())
            .field("options", &self.options)
            .field("working_dir", &self.working_dir)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl<'a> Orchestrator<'a> {
    /// Validates the row selector up front so a bad selector fails before any link runs.
    pub fn new(
        runner: &'a dyn Runner,
        discovery: &'a DiscoveryConfig,
        project: &Project,
        options: RunOptions,
    ) -> Result<Self, RunError> {
        let rows = options.rows.as_deref().map(RowSelection::parse).transpose()?;
        let temp_dir = project.temp_dir()?;
        fs::create_dir_all(&temp_dir).map_err(|e| RunError::Io {
            path: temp_dir.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            runner,
            discovery,
            options,
            rows,
            working_dir: project.root.clone(),
            temp_dir,
            reports_dir: project.reports_dir().to_path_buf(),
        })
    }

    /// Runs every link of every phase in order, stopping at the first failure.
    ///
    /// The chained environment file is removed before this returns, on success and
    /// on failure alike.
    pub fn execute(&self, phases: &[ExecutionPhase], base_flags: &[String]) -> RunOutcome {
        let mut context = RunContext {
            options: self.options.clone(),
            ..RunContext::default()
        };

        if !self.runner.is_installed() {
            return RunOutcome {
                context,
                result: Err(RunError::RunnerNotInstalled(self.runner.executable().to_string())),
            };
        }

        let mut chain = scopeguard::guard(
            EnvironmentChain::new(self.temp_dir.clone()),
            EnvironmentChain::cleanup,
        );
        let result = self.execute_links(&mut context, &mut chain, phases, base_flags);

        RunOutcome { context, result }
    }

    fn execute_links(
        &self,
        context: &mut RunContext,
        chain: &mut EnvironmentChain,
        phases: &[ExecutionPhase],
        base_flags: &[String],
    ) -> Result<(), RunError> {
        let total = phases::total_links(phases);
        let mut position = 0;
        // The environment exported by the previous link, consumed by the next one.
        let mut handoff: Option<PathBuf> = None;

        for execution_phase in phases {
            for link in &execution_phase.links {
                position += 1;
                let step = LinkStep {
                    phase: execution_phase.phase,
                    position,
                    total,
                };
                handoff =
                    self.execute_link(context, chain, step, link, base_flags, handoff.as_deref())?;
                context.links_completed += 1;
            }
        }
        Ok(())
    }

    /// Runs one link and returns the environment it exported for the next link, if any.
    fn execute_link(
        &self,
        context: &mut RunContext,
        chain: &mut EnvironmentChain,
        step: LinkStep,
        link: &LinkSpec,
        base_flags: &[String],
        handoff: Option<&Path>,
    ) -> Result<Option<PathBuf>, RunError> {
        let collection_path = self.collection_path(&link.collection)?;
        let link_flags = self.link_flags(context, step.phase, link, base_flags, handoff)?;

        print_link_status(link, step);

        let export = if step.is_last() {
            None
        } else {
            Some(chain.export_path())
        };

        let invocation = Invocation {
            collection: collection_path,
            flags: &link_flags,
            export_environment: export.as_deref(),
        };
        let result = self
            .runner
            .run(&invocation)
            .map_err(|e| RunError::ExecutionFailure {
                phase: step.phase,
                link: link.to_string(),
                exit_code: None,
                output: None,
                source: Some(e),
            })?;

        handle_result(&result, link, step.phase, &link_flags)?;
        Ok(export)
    }

    fn collection_path(&self, name: &str) -> Result<&'a Path, RunError> {
        self.discovery
            .collections
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| RunError::UnknownResource {
                kind: "collection",
                name: name.to_string(),
                available: self.discovery.collection_names(),
            })
    }

    /// Derives the flag list for one link from the shared pass-through flags.
    fn link_flags(
        &self,
        context: &mut RunContext,
        phase: Phase,
        link: &LinkSpec,
        base_flags: &[String],
        handoff: Option<&Path>,
    ) -> Result<Vec<String>, RunError> {
        let mut link_flags = flags::append_folder_flags(base_flags, &link.items);

        match phase {
            Phase::Setup => link_flags = flags::strip_data_flags(&link_flags),
            Phase::Test => {
                if let Some(selection) = &self.rows {
                    link_flags = self.apply_row_selection(&link_flags, selection)?;
                }
            }
        }

        if let Some(previous_env) = handoff {
            link_flags =
                flags::replace_environment_value(&link_flags, &previous_env.to_string_lossy());
        }

        if self.options.reports {
            let reports_dir = self.working_dir.join(&self.reports_dir);
            fs::create_dir_all(&reports_dir).map_err(|e| RunError::Io {
                path: reports_dir.display().to_string(),
                source: e,
            })?;
            let timestamp = chrono::Local::now().format(REPORT_TIMESTAMP_FORMAT).to_string();
            let (with_reports, paths) = flags::inject_report_flags(
                &link_flags,
                &link.collection,
                &timestamp,
                &self.reports_dir,
            );
            context.generated_reports.push(paths.json);
            context.generated_reports.push(paths.html);
            link_flags = with_reports;
        }

        log::debug!("Flags for {} link '{}': {:?}", phase, link, link_flags);
        Ok(link_flags)
    }

    fn apply_row_selection(
        &self,
        link_flags: &[String],
        selection: &RowSelection,
    ) -> Result<Vec<String>, RunError> {
        let Some(csv_file) = flags::data_file_value(link_flags) else {
            log::warn!("Row selection specified but no CSV file found in flags.");
            println!(
                "{}",
                "Warning: Row selection specified but no CSV file found in flags".yellow()
            );
            return Ok(link_flags.to_vec());
        };

        let filtered = rows::filter_rows(&self.working_dir.join(csv_file), selection, &self.temp_dir)?;
        println!(
            "Using row selection: {} from {}",
            selection.as_str().cyan(),
            csv_file
        );
        Ok(flags::replace_data_value(
            link_flags,
            &filtered.to_string_lossy(),
        ))
    }
}

fn print_link_status(link: &LinkSpec, step: LinkStep) {
    println!(
        "{} {}",
        format!("Running {} link {}/{}:", step.phase, step.position, step.total).blue(),
        link.to_string().green()
    );
}

fn handle_result(
    result: &RunResult,
    link: &LinkSpec,
    phase: Phase,
    link_flags: &[String],
) -> Result<(), RunError> {
    if result.success {
        if flags::is_verbose(link_flags) && !result.output.is_empty() {
            println!("{}", result.output);
        } else {
            println!("{} link: {}", link.collection, "All tests passed!".green());
        }
        return Ok(());
    }

    let code = result
        .exit_code
        .map_or_else(|| "none".to_string(), |c| c.to_string());
    println!(
        "{} link: {} {}",
        link.collection,
        "Tests completed with exit code:".red(),
        code
    );
    if !result.output.is_empty() {
        println!("Newman output:");
        println!("{}", result.output);
    }

    Err(RunError::ExecutionFailure {
        phase,
        link: link.to_string(),
        exit_code: result.exit_code,
        output: Some(result.output.clone()),
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::phases::sequence;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Debug, Clone)]
    struct Recorded {
        collection: PathBuf,
        flags: Vec<String>,
        export: Option<PathBuf>,
        export_existed_before: bool,
    }

    /// Records invocations and writes the exported environment like Newman would.
    #[derive(Debug, Default)]
    struct FakeRunner {
        installed: bool,
        /// 1-based call number that returns a failing exit code.
        fail_on_call: Option<usize>,
        calls: RefCell<Vec<Recorded>>,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                installed: true,
                ..Self::default()
            }
        }

        fn failing_on(call: usize) -> Self {
            Self {
                fail_on_call: Some(call),
                ..Self::new()
            }
        }

        fn calls(&self) -> Vec<Recorded> {
            self.calls.borrow().clone()
        }
    }

    impl Runner for FakeRunner {
        fn executable(&self) -> &str {
            "fake-newman"
        }

        fn is_installed(&self) -> bool {
            self.installed
        }

        fn run(&self, invocation: &Invocation<'_>) -> Result<RunResult, RunnerError> {
            let export_existed_before = invocation.export_environment.is_some_and(Path::exists);
            if let Some(path) = invocation.export_environment {
                fs::write(path, r#"{"values":[{"key":"token","value":"abc"}]}"#).unwrap();
            }
            let mut calls = self.calls.borrow_mut();
            calls.push(Recorded {
                collection: invocation.collection.to_path_buf(),
                flags: invocation.flags.to_vec(),
                export: invocation.export_environment.map(Path::to_path_buf),
                export_existed_before,
            });
            let failed = self.fail_on_call == Some(calls.len());
            Ok(RunResult {
                success: !failed,
                exit_code: Some(i32::from(failed)),
                output: if failed { "1 assertion failed".to_string() } else { String::new() },
            })
        }
    }

    struct Fixture {
        dir: TempDir,
        project: Project,
        discovery: DiscoveryConfig,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let mut project = Project::with_defaults(dir.path());
        project.config.temp_dir = Some("tmp".to_string());

        let mut discovery = DiscoveryConfig::default();
        for name in ["auth", "api_tests", "smoke"] {
            discovery.collections.insert(
                name.to_string(),
                PathBuf::from(format!("collections/{}.postman_collection.json", name)),
            );
        }
        Fixture {
            dir,
            project,
            discovery,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn run(
        fixture: &Fixture,
        runner: &FakeRunner,
        options: RunOptions,
        setup: &[&str],
        test: &[&str],
        base_flags: &[&str],
    ) -> RunOutcome {
        let phases = sequence(&strings(setup), &strings(test)).unwrap();
        let orchestrator =
            Orchestrator::new(runner, &fixture.discovery, &fixture.project, options).unwrap();
        orchestrator.execute(&phases, &strings(base_flags))
    }

    #[test]
    fn test_two_links_chain_one_environment_file() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let outcome = run(
            &fixture,
            &runner,
            RunOptions::default(),
            &["auth"],
            &["api_tests"],
            &["-e", "environments/dev.postman_environment.json"],
        );
        assert!(outcome.result.is_ok());
        assert_eq!(outcome.context.links_completed, 2);

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        let export = calls[0].export.clone().expect("first link exports its environment");
        assert!(!calls[0].export_existed_before);
        assert!(export.starts_with(fixture.dir.path().join("tmp")));
        assert_eq!(
            calls[0].flags,
            strings(&["-e", "environments/dev.postman_environment.json"])
        );

        assert_eq!(calls[1].export, None);
        assert_eq!(
            calls[1].flags,
            vec!["-e".to_string(), export.to_string_lossy().into_owned()]
        );
        assert!(!export.exists(), "chained environment must be removed after the run");
    }

    #[test]
    fn test_environment_removed_when_last_link_fails() {
        let fixture = fixture();
        let runner = FakeRunner::failing_on(2);
        let outcome = run(
            &fixture,
            &runner,
            RunOptions::default(),
            &["auth"],
            &["api_tests"],
            &["-e", "dev.json"],
        );

        match outcome.result {
            Err(RunError::ExecutionFailure {
                phase,
                exit_code,
                output,
                ..
            }) => {
                assert_eq!(phase, Phase::Test);
                assert_eq!(exit_code, Some(1));
                assert_eq!(output.as_deref(), Some("1 assertion failed"));
            }
            other => panic!("expected execution failure, got {:?}", other),
        }
        assert_eq!(outcome.context.links_completed, 1);
        let export = runner.calls()[0].export.clone().unwrap();
        assert!(!export.exists());
    }

    #[test]
    fn test_three_links_reuse_the_same_export_path() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let outcome = run(
            &fixture,
            &runner,
            RunOptions::default(),
            &["auth", "smoke"],
            &["api_tests"],
            &["-e", "dev.json"],
        );
        assert!(outcome.result.is_ok());

        let calls = runner.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].export, calls[1].export);
        assert!(calls[1].export_existed_before);
        let export = calls[0].export.clone().unwrap();
        assert_eq!(calls[2].flags[1], export.to_string_lossy());
    }

    #[test]
    fn test_failure_stops_remaining_links_and_phases() {
        let fixture = fixture();
        let runner = FakeRunner::failing_on(1);
        let outcome = run(
            &fixture,
            &runner,
            RunOptions::default(),
            &["auth"],
            &["api_tests", "smoke"],
            &[],
        );
        assert!(matches!(
            outcome.result,
            Err(RunError::ExecutionFailure { phase: Phase::Setup, .. })
        ));
        assert_eq!(runner.calls().len(), 1);
        assert_eq!(outcome.context.links_completed, 0);
    }

    #[test]
    fn test_single_link_never_allocates_environment() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let outcome = run(&fixture, &runner, RunOptions::default(), &[], &["smoke"], &["-e", "x"]);
        assert!(outcome.result.is_ok());
        assert_eq!(runner.calls()[0].export, None);
        assert_eq!(runner.calls()[0].flags, strings(&["-e", "x"]));
    }

    #[test]
    fn test_setup_strips_data_and_items_become_folders() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let outcome = run(
            &fixture,
            &runner,
            RunOptions::default(),
            &["auth.Login"],
            &["api_tests.Create User,Delete User"],
            &["-d", "data/users.csv", "--bail"],
        );
        assert!(outcome.result.is_ok());

        let calls = runner.calls();
        assert_eq!(
            calls[0].collection,
            PathBuf::from("collections/auth.postman_collection.json")
        );
        assert_eq!(calls[0].flags, strings(&["--bail", "--folder", "Login"]));
        assert_eq!(
            calls[1].flags,
            strings(&[
                "-d",
                "data/users.csv",
                "--bail",
                "--folder",
                "Create User",
                "--folder",
                "Delete User"
            ])
        );
    }

    #[test]
    fn test_rows_filter_test_links_only() {
        let fixture = fixture();
        let data_dir = fixture.dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(data_dir.join("users.csv"), "id\n1\n2\n3\n4\n5\n").unwrap();

        let runner = FakeRunner::new();
        let options = RunOptions {
            rows: Some("2-4".to_string()),
            ..RunOptions::default()
        };
        let outcome = run(
            &fixture,
            &runner,
            options,
            &["auth"],
            &["api_tests"],
            &["-d", "data/users.csv"],
        );
        assert!(outcome.result.is_ok());

        let calls = runner.calls();
        assert!(calls[0].flags.is_empty());
        assert_eq!(calls[1].flags[0], "-d");
        let filtered = PathBuf::from(&calls[1].flags[1]);
        assert_eq!(filtered, fixture.dir.path().join("tmp").join("plaintest_rows_2-4.csv"));
        assert_eq!(fs::read_to_string(filtered).unwrap(), "id\n2\n3\n4\n");
    }

    #[test]
    fn test_invalid_rows_fail_before_running() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let options = RunOptions {
            rows: Some("4-2".to_string()),
            ..RunOptions::default()
        };
        let result = Orchestrator::new(&runner, &fixture.discovery, &fixture.project, options);
        assert!(matches!(result, Err(RunError::Rows(RowSelectionError::ReversedRange(_)))));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_reports_are_kept_after_failure() {
        let fixture = fixture();
        let runner = FakeRunner::failing_on(2);
        let options = RunOptions {
            reports: true,
            ..RunOptions::default()
        };
        let outcome = run(&fixture, &runner, options, &[], &["auth", "smoke"], &[]);
        assert!(outcome.result.is_err());

        let reports = &outcome.context.generated_reports;
        assert_eq!(reports.len(), 4);
        assert!(reports[0].to_string_lossy().ends_with(".json"));
        assert!(reports[1].to_string_lossy().ends_with(".html"));
        assert!(reports[0].starts_with("reports"));
        assert!(reports[2].file_name().unwrap().to_string_lossy().starts_with("smoke_"));

        let flags = &runner.calls()[0].flags;
        assert_eq!(&flags[..2], &strings(&["--reporters", "cli,htmlextra,json"])[..]);
        assert!(fixture.dir.path().join("reports").is_dir());
    }

    #[test]
    fn test_unknown_collection_in_link() {
        let fixture = fixture();
        let runner = FakeRunner::new();
        let outcome = run(&fixture, &runner, RunOptions::default(), &[], &["missing.Item"], &[]);
        match outcome.result {
            Err(RunError::UnknownResource { kind, name, available }) => {
                assert_eq!(kind, "collection");
                assert_eq!(name, "missing");
                assert_eq!(available, strings(&["api_tests", "auth", "smoke"]));
            }
            other => panic!("expected unknown resource, got {:?}", other),
        }
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_runner_not_installed_is_checked_first() {
        let fixture = fixture();
        let runner = FakeRunner::default();
        let outcome = run(&fixture, &runner, RunOptions::default(), &[], &["smoke"], &[]);
        assert!(matches!(outcome.result, Err(RunError::RunnerNotInstalled(_))));
        assert!(runner.calls().is_empty());
    }
}
