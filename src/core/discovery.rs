// src/core/discovery.rs

use crate::constants::{COLLECTIONS_BUILD_SUBDIR, COLLECTION_SUFFIX, DATA_SUFFIX, ENVIRONMENT_SUFFIX};
use crate::core::project::Project;
use crate::models::DiscoveryConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Maps `<name><suffix>` files directly inside `dir` to `name → path`.
fn scan_dir(dir: &Path, suffix: &str) -> BTreeMap<String, PathBuf> {
    let mut found = BTreeMap::new();
    if !dir.is_dir() {
        return found;
    }

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Could not scan '{}': {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry
            .file_name()
            .to_string_lossy()
            .strip_suffix(suffix)
            .map(str::to_string);
        if let Some(name) = name {
            found.insert(name, entry.into_path());
        }
    }
    found
}

/// Scans `dirs` in priority order. The first directory with any match wins;
/// later directories are not merged in.
pub fn discover_files(dirs: &[PathBuf], suffix: &str) -> BTreeMap<String, PathBuf> {
    for dir in dirs {
        let found = scan_dir(dir, suffix);
        if !found.is_empty() {
            log::debug!("Discovered {} '*{}' file(s) in '{}'", found.len(), suffix, dir.display());
            return found;
        }
    }
    BTreeMap::new()
}

/// Discovers collections (build output first), environments and CSV data files.
pub fn discover_all(project: &Project) -> DiscoveryConfig {
    let collections_dir = project.collections_dir();
    DiscoveryConfig {
        collections: discover_files(
            &[collections_dir.join(COLLECTIONS_BUILD_SUBDIR), collections_dir],
            COLLECTION_SUFFIX,
        ),
        environments: discover_files(&[project.environments_dir()], ENVIRONMENT_SUFFIX),
        data_files: discover_files(&[project.data_dir()], DATA_SUFFIX),
    }
}
