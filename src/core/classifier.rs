// src/core/classifier.rs

use crate::constants::{
    DATA_LONG_FLAG, DATA_SHORT_FLAG, DEBUG_FLAG, ENV_LONG_FLAG, ENV_SHORT_FLAG, ONCE_FLAG,
    REPORTS_FLAG, ROWS_LONG_FLAG, ROWS_SHORT_FLAG, SETUP_FLAG, TEST_FLAG,
};
use crate::core::flags::looks_like_flag;
use crate::models::{DiscoveryConfig, RunOptions};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Unknown collection or argument: '{token}'. Available collections: [{}]", .available.join(", "))]
    UnknownArgument {
        token: String,
        available: Vec<String>,
    },
    #[error("Flag '{flag}' requires a value.")]
    MissingValue { flag: String },
}

/// The result of splitting a `run` argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedArgs {
    /// Raw selectors from `--setup` and `--once`, in order of appearance.
    pub setup_links: Vec<String>,
    /// Raw selectors from `--test` and bare collection names, in order of appearance.
    pub test_links: Vec<String>,
    pub options: RunOptions,
    /// Flags forwarded to the runner, path-valued flags already resolved.
    pub passthrough: Vec<String>,
}

/// Tool-only flags, consumed and never forwarded.
#[derive(Debug, Clone, Copy)]
enum ToolFlag {
    Setup,
    Test,
    Rows,
    Debug,
    Reports,
}

impl ToolFlag {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            SETUP_FLAG | ONCE_FLAG => Some(Self::Setup),
            TEST_FLAG => Some(Self::Test),
            ROWS_SHORT_FLAG | ROWS_LONG_FLAG => Some(Self::Rows),
            DEBUG_FLAG => Some(Self::Debug),
            REPORTS_FLAG => Some(Self::Reports),
            _ => None,
        }
    }

    fn takes_value(self) -> bool {
        matches!(self, Self::Setup | Self::Test | Self::Rows)
    }
}

/// The name → path lookup used to resolve the value of a path-valued runner flag.
fn lookup_for<'c>(flag: &str, config: &'c DiscoveryConfig) -> Option<&'c BTreeMap<String, PathBuf>> {
    match flag {
        ENV_SHORT_FLAG | ENV_LONG_FLAG => Some(&config.environments),
        DATA_SHORT_FLAG | DATA_LONG_FLAG => Some(&config.data_files),
        _ => None,
    }
}

/// Resolves a resource name to its discovered path, or keeps the literal value
/// (it may already be a path).
fn resolve_name(value: &str, lookup: &BTreeMap<String, PathBuf>) -> String {
    match lookup.get(value) {
        Some(path) => path.to_string_lossy().into_owned(),
        None => value.to_string(),
    }
}

/// Splits a raw `run` argument list into tool flags, selected collections and runner flags.
///
/// # Logic
/// A single left-to-right scan with one token of lookahead:
/// - Tool flags (`--setup`, `--test`, `--once`, `-r/--rows`, `--debug`, `--reports`)
///   are consumed together with their value.
/// - A token equal to a known collection name selects that collection as a test link.
/// - Any other flag is forwarded. If the next token does not look like a flag it is
///   forwarded as the flag's value; for `-e`/`-d` (and long forms) the value is first
///   resolved through the environment / data-file lookup.
/// - Anything else is an error that lists every known collection.
pub fn classify(args: &[String], config: &DiscoveryConfig) -> Result<ClassifiedArgs, ClassifyError> {
    let mut classified = ClassifiedArgs::default();
    let mut iter = args.iter().peekable();

    while let Some(arg) = iter.next() {
        if let Some(tool_flag) = ToolFlag::from_token(arg) {
            let value = if tool_flag.takes_value() {
                match iter.next_if(|next| !looks_like_flag(next)) {
                    Some(v) => Some(v.clone()),
                    None => return Err(ClassifyError::MissingValue { flag: arg.clone() }),
                }
            } else {
                None
            };

            match tool_flag {
                ToolFlag::Setup => classified.setup_links.extend(value),
                ToolFlag::Test => classified.test_links.extend(value),
                ToolFlag::Rows => classified.options.rows = value,
                ToolFlag::Debug => classified.options.debug = true,
                ToolFlag::Reports => classified.options.reports = true,
            }
            continue;
        }

        if config.collections.contains_key(arg.as_str()) {
            classified.test_links.push(arg.clone());
            continue;
        }

        if looks_like_flag(arg) {
            classified.passthrough.push(arg.clone());
            if let Some(value) = iter.next_if(|next| !looks_like_flag(next)) {
                let forwarded = match lookup_for(arg, config) {
                    Some(lookup) => resolve_name(value, lookup),
                    None => value.clone(),
                };
                classified.passthrough.push(forwarded);
            }
            continue;
        }

        return Err(ClassifyError::UnknownArgument {
            token: arg.clone(),
            available: config.collection_names(),
        });
    }

    log::debug!("Classified run arguments: {:?}", classified);
    Ok(classified)
}
