// src/core/flags.rs

//! Pure rewrites over a runner flag list.
//!
//! Every function here returns a new list and preserves the relative order of
//! the tokens it does not touch. A flag immediately followed by another
//! flag-looking token is treated as a boolean flag: the following token is
//! never consumed as its value.

use crate::constants::{
    DATA_LONG_FLAG, DATA_SHORT_FLAG, DEFAULT_REPORTERS, ENV_LONG_FLAG, ENV_SHORT_FLAG,
    FOLDER_FLAG, HTML_EXPORT_FLAG, JSON_EXPORT_FLAG, JSON_REPORTER, REPORTERS_FLAG, VERBOSE_FLAG,
};
use crate::models::DiscoveryConfig;
use std::path::{Path, PathBuf};

/// Whether a token is a flag rather than a value.
pub fn looks_like_flag(token: &str) -> bool {
    token.starts_with('-')
}

fn is_data_flag(token: &str) -> bool {
    token == DATA_SHORT_FLAG || token == DATA_LONG_FLAG
}

fn is_env_flag(token: &str) -> bool {
    token == ENV_SHORT_FLAG || token == ENV_LONG_FLAG
}

/// Index of the value belonging to the flag at `flag_index`, if it has one.
fn value_index(flags: &[String], flag_index: usize) -> Option<usize> {
    let next = flag_index + 1;
    flags
        .get(next)
        .filter(|token| !looks_like_flag(token))
        .map(|_| next)
}

/// Overwrites the value of every occurrence of a flag matched by `is_target`.
fn replace_value(flags: &[String], is_target: fn(&str) -> bool, new_value: &str) -> Vec<String> {
    let mut result = flags.to_vec();
    for i in 0..flags.len() {
        let matches = flags.get(i).is_some_and(|f| is_target(f));
        if !matches {
            continue;
        }
        if let Some(slot) = value_index(flags, i).and_then(|vi| result.get_mut(vi)) {
            *slot = new_value.to_string();
        }
    }
    result
}

/// Removes `-d`/`--iteration-data` together with its value.
/// Used to suppress CSV iteration during the setup phase.
pub fn strip_data_flags(flags: &[String]) -> Vec<String> {
    let mut result = Vec::with_capacity(flags.len());
    let mut iter = flags.iter().peekable();
    while let Some(flag) = iter.next() {
        if is_data_flag(flag) {
            if iter.peek().is_some_and(|next| !looks_like_flag(next)) {
                iter.next();
            }
            continue;
        }
        result.push(flag.clone());
    }
    result
}

/// Overwrites the value of the data flag in place. Used to substitute a row-filtered CSV.
pub fn replace_data_value(flags: &[String], new_csv: &str) -> Vec<String> {
    replace_value(flags, is_data_flag, new_csv)
}

/// Overwrites the value of the environment flag in place.
/// The list is returned unchanged when the flag is absent or has no value.
pub fn replace_environment_value(flags: &[String], new_env: &str) -> Vec<String> {
    replace_value(flags, is_env_flag, new_env)
}

/// The CSV file passed through the data flag, if any.
pub fn data_file_value(flags: &[String]) -> Option<&str> {
    let index = flags.iter().position(|f| is_data_flag(f))?;
    value_index(flags, index)
        .and_then(|vi| flags.get(vi))
        .map(String::as_str)
}

pub fn has_environment_flag(flags: &[String]) -> bool {
    flags.iter().any(|f| is_env_flag(f))
}

pub fn is_verbose(flags: &[String]) -> bool {
    flags.iter().any(|f| f == VERBOSE_FLAG)
}

/// Appends `--folder <item>` for each selected item of a link.
pub fn append_folder_flags(flags: &[String], items: &[String]) -> Vec<String> {
    let mut result = flags.to_vec();
    for item in items {
        result.push(FOLDER_FLAG.to_string());
        result.push(item.clone());
    }
    result
}

/// Adds `-e <path>` when no environment was given and exactly one environment exists.
pub fn with_default_environment(flags: Vec<String>, discovery: &DiscoveryConfig) -> Vec<String> {
    if has_environment_flag(&flags) || discovery.environments.len() != 1 {
        return flags;
    }
    let Some((name, path)) = discovery.environments.iter().next() else {
        return flags;
    };
    log::debug!("Using the only available environment '{}' by default.", name);
    let mut flags = flags;
    flags.push(ENV_SHORT_FLAG.to_string());
    flags.push(path.to_string_lossy().into_owned());
    flags
}

/// The report files requested from the runner for one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Makes sure the `--reporters` list contains the JSON reporter.
fn ensure_json_reporter(flags: &[String]) -> Vec<String> {
    let mut result = flags.to_vec();
    let Some(index) = flags.iter().position(|f| f == REPORTERS_FLAG) else {
        result.push(REPORTERS_FLAG.to_string());
        result.push(DEFAULT_REPORTERS.to_string());
        return result;
    };

    match value_index(flags, index).and_then(|vi| result.get_mut(vi)) {
        Some(value) => {
            if !value.split(',').any(|r| r.trim() == JSON_REPORTER) {
                value.push(',');
                value.push_str(JSON_REPORTER);
            }
        }
        None => result.insert(index + 1, DEFAULT_REPORTERS.to_string()),
    }
    result
}

/// Ensures a JSON reporter is configured and appends JSON/HTML export paths
/// built from the collection name and a timestamp. Returns the rewritten flags
/// and the generated paths so the caller can list them after the run.
pub fn inject_report_flags(
    flags: &[String],
    collection: &str,
    timestamp: &str,
    reports_dir: &Path,
) -> (Vec<String>, ReportPaths) {
    let mut result = ensure_json_reporter(flags);
    let paths = ReportPaths {
        json: reports_dir.join(format!("{}_{}.json", collection, timestamp)),
        html: reports_dir.join(format!("{}_{}.html", collection, timestamp)),
    };

    result.push(JSON_EXPORT_FLAG.to_string());
    result.push(paths.json.to_string_lossy().into_owned());
    result.push(HTML_EXPORT_FLAG.to_string());
    result.push(paths.html.to_string_lossy().into_owned());
    (result, paths)
}
