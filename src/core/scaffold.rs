// src/core/scaffold.rs

//! Project scaffolding for `plaintest init`.

use crate::constants::{
    COLLECTIONS_DIR, DATA_DIR, ENVIRONMENTS_DIR, PAYLOADS_DIR, REPORTS_DIR, SCRIPTS_DIR,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScaffoldError {
    #[error("Could not create '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

const DIRECTORIES: &[&str] = &[
    COLLECTIONS_DIR,
    SCRIPTS_DIR,
    PAYLOADS_DIR,
    DATA_DIR,
    ENVIRONMENTS_DIR,
    REPORTS_DIR,
];

/// Starter files, relative to the project root.
const TEMPLATES: &[(&str, &str)] = &[
    (
        "collections/get_auth.postman_collection.json",
        include_str!("../../templates/collections/get_auth.postman_collection.json"),
    ),
    (
        "collections/api_tests.postman_collection.json",
        include_str!("../../templates/collections/api_tests.postman_collection.json"),
    ),
    (
        "collections/smoke.postman_collection.json",
        include_str!("../../templates/collections/smoke.postman_collection.json"),
    ),
    (
        "environments/dummyjson.postman_environment.json",
        include_str!("../../templates/environments/dummyjson.postman_environment.json"),
    ),
    ("data/example.csv", include_str!("../../templates/data/example.csv")),
];

/// What `scaffold` did to each starter file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub written: Vec<PathBuf>,
    /// Existing files left alone because `force` was off.
    pub skipped: Vec<PathBuf>,
}

/// Creates the conventional directories under `root` and writes the starter files.
pub fn scaffold(root: &Path, force: bool) -> Result<ScaffoldReport, ScaffoldError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| ScaffoldError::Io { path, source }
    };

    for dir in DIRECTORIES {
        let path = root.join(dir);
        fs::create_dir_all(&path).map_err(io_err(&path))?;
    }

    let mut report = ScaffoldReport::default();
    for (relative, content) in TEMPLATES {
        let path = root.join(relative);
        if path.exists() && !force {
            log::debug!("Keeping existing '{}'", path.display());
            report.skipped.push(path);
            continue;
        }
        fs::write(&path, content).map_err(io_err(&path))?;
        report.written.push(path);
    }
    Ok(report)
}
