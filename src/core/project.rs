// src/core/project.rs

//! Project layout and the optional `plaintest.toml` configuration.
//!
//! Every directory is configured relative to the project root. A project with no
//! configuration file uses the conventional layout (`collections/`, `environments/`,
//! `data/`, `scripts/`, `payloads/`, `reports/`) and runs `newman`.

use crate::constants::{
    COLLECTIONS_DIR, DATA_DIR, DEFAULT_RUNNER_EXECUTABLE, ENVIRONMENTS_DIR, PAYLOADS_DIR,
    PROJECT_CONFIG_FILENAME, REPORTS_DIR, SCRIPTS_DIR,
};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectConfigError {
    #[error("Could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Failed to expand path '{template}': {message}")]
    Expand { template: String, message: String },
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Program name or path of the collection runner.
    pub executable: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            executable: DEFAULT_RUNNER_EXECUTABLE.to_string(),
        }
    }
}

/// The deserialized structure of a `plaintest.toml` file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    pub collections_dir: PathBuf,
    pub environments_dir: PathBuf,
    pub data_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub payloads_dir: PathBuf,
    pub reports_dir: PathBuf,
    /// Where chained environments and filtered CSVs are written.
    /// Supports `~` and `$VAR`. Defaults to the system temp directory.
    pub temp_dir: Option<String>,
    pub runner: RunnerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            collections_dir: PathBuf::from(COLLECTIONS_DIR),
            environments_dir: PathBuf::from(ENVIRONMENTS_DIR),
            data_dir: PathBuf::from(DATA_DIR),
            scripts_dir: PathBuf::from(SCRIPTS_DIR),
            payloads_dir: PathBuf::from(PAYLOADS_DIR),
            reports_dir: PathBuf::from(REPORTS_DIR),
            temp_dir: None,
            runner: RunnerConfig::default(),
        }
    }
}

/// A project root together with its resolved configuration.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// A project at `root` using the conventional layout.
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: ProjectConfig::default(),
        }
    }

    /// Loads `plaintest.toml` from `root` if present; otherwise uses defaults.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self, ProjectConfigError> {
        let root = root.into();
        let config_path = root.join(PROJECT_CONFIG_FILENAME);

        let config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ProjectConfigError::Parse {
                path: config_path.display().to_string(),
                source: e,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No {} found in '{}', using defaults.", PROJECT_CONFIG_FILENAME, root.display());
                ProjectConfig::default()
            }
            Err(e) => {
                return Err(ProjectConfigError::Read {
                    path: config_path.display().to_string(),
                    source: e,
                });
            }
        };

        log::debug!("Project config for '{}': {:?}", root.display(), config);
        Ok(Self { root, config })
    }

    pub fn collections_dir(&self) -> PathBuf {
        self.root.join(&self.config.collections_dir)
    }

    pub fn environments_dir(&self) -> PathBuf {
        self.root.join(&self.config.environments_dir)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.config.data_dir)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(&self.config.scripts_dir)
    }

    pub fn payloads_dir(&self) -> PathBuf {
        self.root.join(&self.config.payloads_dir)
    }

    /// Reports are passed to the runner, which runs in the project root, so this stays relative.
    pub fn reports_dir(&self) -> &Path {
        &self.config.reports_dir
    }

    /// The directory for temporary run files, with `~` and environment variables expanded.
    pub fn temp_dir(&self) -> Result<PathBuf, ProjectConfigError> {
        let Some(template) = &self.config.temp_dir else {
            return Ok(std::env::temp_dir());
        };
        let expanded = shellexpand::full(template).map_err(|e| ProjectConfigError::Expand {
            template: template.clone(),
            message: e.to_string(),
        })?;
        Ok(self.root.join(expanded.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.config, ProjectConfig::default());
        assert_eq!(project.collections_dir(), dir.path().join("collections"));
        assert_eq!(project.config.runner.executable, "newman");
        assert_eq!(project.temp_dir().unwrap(), std::env::temp_dir());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG_FILENAME),
            "scripts_dir = \"src/scripts\"\ntemp_dir = \"tmp\"\n\n[runner]\nexecutable = \"./node_modules/.bin/newman\"\n",
        )
        .unwrap();

        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.scripts_dir(), dir.path().join("src/scripts"));
        assert_eq!(project.payloads_dir(), dir.path().join("payloads"));
        assert_eq!(project.config.runner.executable, "./node_modules/.bin/newman");
        assert_eq!(project.temp_dir().unwrap(), dir.path().join("tmp"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG_FILENAME), "collection_dir = \"x\"\n").unwrap();

        let err = Project::load(dir.path()).unwrap_err();
        assert!(matches!(err, ProjectConfigError::Parse { .. }));
        assert!(err.to_string().contains(PROJECT_CONFIG_FILENAME));
    }
}
