// src/core/env_chain.rs

use crate::constants::TEMP_ENV_PREFIX;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChainState {
    Unallocated,
    /// The runner exports its environment here; the file itself is written by the runner.
    Allocated(PathBuf),
}

/// Carries runner environment state from one invocation to the next through a
/// single temporary file.
///
/// The path is allocated on first use and reused for every later link. Call
/// [`EnvironmentChain::cleanup`] when the run ends, whatever its outcome; the
/// orchestrator does this through a scope guard.
#[derive(Debug)]
pub struct EnvironmentChain {
    temp_dir: PathBuf,
    state: ChainState,
}

impl EnvironmentChain {
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            state: ChainState::Unallocated,
        }
    }

    /// The export path, allocating a time-unique one on the first call.
    pub fn export_path(&mut self) -> PathBuf {
        if let ChainState::Allocated(path) = &self.state {
            return path.clone();
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = self
            .temp_dir
            .join(format!("{}{}.json", TEMP_ENV_PREFIX, nanos));
        log::debug!("Allocated chained environment file '{}'", path.display());
        self.state = ChainState::Allocated(path.clone());
        path
    }

    /// The allocated path, if any link has needed one yet.
    pub fn allocated(&self) -> Option<&Path> {
        match &self.state {
            ChainState::Unallocated => None,
            ChainState::Allocated(path) => Some(path),
        }
    }

    /// Removes the exported environment file if one was ever allocated.
    pub fn cleanup(self) {
        let ChainState::Allocated(path) = self.state else {
            return;
        };
        match fs::remove_file(&path) {
            Ok(()) => log::debug!("Removed chained environment file '{}'", path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove temporary environment file '{}': {}",
                path.display(),
                e
            ),
        }
    }
}
