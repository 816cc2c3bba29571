// src/models.rs

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// --- RUN SELECTION MODELS ---

/// One selected collection, optionally restricted to named sub-items (folders or requests).
///
/// `items` is never absent: an empty selection is an empty vector, so two
/// item-less specs for the same collection compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkSpec {
    pub collection: String,
    pub items: Vec<String>,
}

impl fmt::Display for LinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            write!(f, "{}", self.collection)
        } else {
            write!(f, "{}.{}", self.collection, self.items.join(","))
        }
    }
}

/// The two execution phases. Setup runs without data iteration, Test iterates over CSV rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Test,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// An ordered group of links that share a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPhase {
    pub phase: Phase,
    pub links: Vec<LinkSpec>,
}

// --- DISCOVERY MODELS ---

/// Name → path lookups for every resource found in the project.
///
/// `BTreeMap` keeps name listings (help text, error messages) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub collections: BTreeMap<String, PathBuf>,
    pub environments: BTreeMap<String, PathBuf>,
    pub data_files: BTreeMap<String, PathBuf>,
}

impl DiscoveryConfig {
    /// Sorted collection names, used when reporting unknown names.
    pub fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }
}

// --- RUN OPTIONS ---

/// Tool-only switches for a `run` invocation. These never reach the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// CSV row selector (`2`, `2-5`, `1,3,5`), applied to test links only.
    pub rows: Option<String>,
    /// Print every runner command line before executing it.
    pub debug: bool,
    /// Generate timestamped JSON and HTML reports.
    pub reports: bool,
}
