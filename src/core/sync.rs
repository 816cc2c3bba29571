// src/core/sync.rs

//! # Extract / Build Synchronizer
//!
//! Moves embedded scripts and JSON request payloads between a collection file and
//! individually editable files, and back.
//!
//! - Scripts live at `scripts/<collection>/<folders...>/<leaf>__<listen>.js`;
//!   collection-level scripts use `_collection__<listen>.js`.
//! - Payloads live at `payloads/<collection>/<ancestry joined by "__">.json`.
//!
//! Path components are passed through [`sanitize`], which never produces `_`, so
//! the `__` separator and the `_collection` label cannot collide with a node name.

use crate::{
    constants::{
        COLLECTION_SCRIPT_LABEL, COLLECTION_SUFFIX, PATH_SEPARATOR, PAYLOAD_EXTENSION,
        SCRIPT_EXTENSION, UNNAMED,
    },
    core::{
        collection::{Body, Collection, Event, Item, Request, RequestDetail, RequestField, ScriptSource},
        project::Project,
    },
};
use colored::Colorize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid collection name '{0}': expected a single name without path separators.")]
    InvalidCollectionName(String),
    #[error("Collection not found: '{path}'")]
    CollectionNotFound { path: String },
    #[error("'{path}' is not a valid collection: {source}")]
    InvalidCollection {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid JSON in payload file '{path}': {source}")]
    InvalidPayloadJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to {op} '{path}': {source}")]
    Io {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    fn io(op: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.display().to_string();
        move |source| Self::Io { op, path, source }
    }
}

/// Normalizes a node name into a file-system friendly path component.
///
/// Lowercase ASCII letters, digits and `-` are kept; everything else becomes `-`.
/// Leading and trailing dashes are trimmed, and an empty result is `unnamed`.
pub fn sanitize(name: &str) -> String {
    let mapped: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '-',
        })
        .collect();
    let trimmed = mapped.trim_matches('-');
    if trimmed.is_empty() {
        UNNAMED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// The node owning a set of events.
#[derive(Debug, Clone, Copy)]
pub enum ScriptOwner<'a> {
    Collection,
    /// A folder or request, identified by its ancestry (root first, itself last).
    Node(&'a [String]),
}

/// Script file for one event of one node.
pub fn script_path(scripts_root: &Path, collection: &str, owner: ScriptOwner<'_>, listen: &str) -> PathBuf {
    let mut path = scripts_root.join(collection);
    let leaf = match owner {
        ScriptOwner::Node(ancestry) => match ancestry.split_last() {
            Some((last, folders)) => {
                for folder in folders {
                    path.push(sanitize(folder));
                }
                sanitize(last)
            }
            None => COLLECTION_SCRIPT_LABEL.to_string(),
        },
        ScriptOwner::Collection => COLLECTION_SCRIPT_LABEL.to_string(),
    };
    path.push(format!(
        "{}{}{}.{}",
        leaf,
        PATH_SEPARATOR,
        sanitize(listen),
        SCRIPT_EXTENSION
    ));
    path
}

/// Payload file for the request at `ancestry` (root first, the request last).
pub fn payload_path(payloads_root: &Path, collection: &str, ancestry: &[String]) -> PathBuf {
    let stem = ancestry
        .iter()
        .map(|name| sanitize(name))
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR);
    payloads_root
        .join(collection)
        .join(format!("{}.{}", stem, PAYLOAD_EXTENSION))
}

/// Normalizes line endings and ends the content with exactly one newline.
fn script_file_content(source: &str) -> String {
    let normalized = source.replace("\r\n", "\n");
    format!("{}\n", normalized.trim_end_matches('\n'))
}

/// Splits a script file back into `exec` lines. An empty file is a single empty line.
fn script_lines(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n");
    normalized
        .trim_end_matches('\n')
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// What a sync pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files written by extract, or files applied by build.
    pub files: Vec<PathBuf>,
    /// Nodes skipped (non-JSON bodies, missing files, URL-only requests).
    pub skipped: usize,
}

/// Extracts and builds scripts and payloads for collections of one project.
#[derive(Debug, Clone, Copy)]
pub struct Synchronizer<'a> {
    project: &'a Project,
}

impl<'a> Synchronizer<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// The source collection file; extract and build always work on the raw collection.
    pub fn collection_path(&self, name: &str) -> PathBuf {
        self.project
            .collections_dir()
            .join(format!("{}{}", name, COLLECTION_SUFFIX))
    }

    fn load(&self, name: &str) -> Result<(PathBuf, Collection), SyncError> {
        validate_collection_name(name)?;
        let path = self.collection_path(name);
        if !path.is_file() {
            return Err(SyncError::CollectionNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(&path).map_err(SyncError::io("read", &path))?;
        let collection = serde_json::from_str(&content).map_err(|e| SyncError::InvalidCollection {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok((path, collection))
    }

    fn save(path: &Path, collection: &Collection) -> Result<(), SyncError> {
        let content = serde_json::to_string_pretty(collection).map_err(|e| SyncError::InvalidCollection {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(path, content).map_err(SyncError::io("write", path))
    }

    // --- SCRIPTS ---

    /// Writes every event script of the collection to its own `.js` file, overwriting existing files.
    pub fn extract_scripts(&self, name: &str) -> Result<SyncReport, SyncError> {
        let (path, collection) = self.load(name)?;
        println!("Extracting scripts from {}:", file_label(&path));

        let scripts_root = self.project.scripts_dir();
        let mut report = SyncReport::default();
        extract_events(&scripts_root, name, ScriptOwner::Collection, collection.events(), &mut report)?;

        walk_items(collection.items(), &mut Vec::new(), &mut |ancestry: &[String], item: &Item| {
            extract_events(&scripts_root, name, ScriptOwner::Node(ancestry), item.events(), &mut report)
        })?;

        println!("{}", "Extraction complete".green());
        Ok(report)
    }

    /// Replaces each event's script source with the content of its `.js` file.
    pub fn build_scripts(&self, name: &str) -> Result<SyncReport, SyncError> {
        let (path, mut collection) = self.load(name)?;
        println!("Building {} from scripts:", file_label(&path));

        let scripts_root = self.project.scripts_dir();
        let mut report = SyncReport::default();
        build_events(&scripts_root, name, ScriptOwner::Collection, collection.events_mut(), &mut report)?;

        walk_items_mut(collection.items_mut(), &mut Vec::new(), &mut |ancestry: &[String], item: &mut Item| {
            build_events(&scripts_root, name, ScriptOwner::Node(ancestry), item.events_mut(), &mut report)
        })?;

        Self::save(&path, &collection)?;
        println!("{}", "Build complete".green());
        Ok(report)
    }

    // --- PAYLOADS ---

    /// Writes every JSON request body to a pretty-printed `.json` file.
    pub fn extract_payloads(&self, name: &str) -> Result<SyncReport, SyncError> {
        let (path, collection) = self.load(name)?;
        println!("Extracting payloads from {}:", file_label(&path));

        let payloads_root = self.project.payloads_dir();
        let mut report = SyncReport::default();
        walk_items(collection.items(), &mut Vec::new(), &mut |ancestry: &[String], item: &Item| {
            let Item::Request(request) = item else {
                return Ok(());
            };
            extract_payload(&payloads_root, name, ancestry, request, &mut report)
        })?;

        println!("{}", "Extraction complete".green());
        Ok(report)
    }

    /// Writes each payload file, compacted, into its request's raw body.
    pub fn build_payloads(&self, name: &str) -> Result<SyncReport, SyncError> {
        let (path, mut collection) = self.load(name)?;
        println!("Building {} from payloads:", file_label(&path));

        let payloads_root = self.project.payloads_dir();
        let mut report = SyncReport::default();
        walk_items_mut(collection.items_mut(), &mut Vec::new(), &mut |ancestry: &[String], item: &mut Item| {
            let Item::Request(request) = item else {
                return Ok(());
            };
            build_payload(&payloads_root, name, ancestry, request, &mut report)
        })?;

        Self::save(&path, &collection)?;
        println!("{}", "Build complete".green());
        Ok(report)
    }
}

/// A collection name becomes a directory under `scripts/` and `payloads/`, so it
/// must be exactly one plain path component.
fn validate_collection_name(name: &str) -> Result<(), SyncError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(()),
        _ => Err(SyncError::InvalidCollectionName(name.to_string())),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Depth-first pre-order walk. `ancestry` holds the names from the root down to the visited item.
fn walk_items<F>(items: &[Item], ancestry: &mut Vec<String>, visit: &mut F) -> Result<(), SyncError>
where
    F: FnMut(&[String], &Item) -> Result<(), SyncError>,
{
    for item in items {
        ancestry.push(item.name().to_string());
        visit(ancestry, item)?;
        if let Item::Folder(folder) = item {
            walk_items(&folder.item, ancestry, visit)?;
        }
        ancestry.pop();
    }
    Ok(())
}

fn walk_items_mut<F>(items: &mut [Item], ancestry: &mut Vec<String>, visit: &mut F) -> Result<(), SyncError>
where
    F: FnMut(&[String], &mut Item) -> Result<(), SyncError>,
{
    for item in items {
        ancestry.push(item.name().to_string());
        visit(ancestry, item)?;
        if let Item::Folder(folder) = item {
            walk_items_mut(&mut folder.item, ancestry, visit)?;
        }
        ancestry.pop();
    }
    Ok(())
}

fn extract_events(
    scripts_root: &Path,
    collection: &str,
    owner: ScriptOwner<'_>,
    events: &[Event],
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    for event in events {
        let Some(script) = &event.script else {
            continue;
        };
        let source = script.exec.as_ref().map(ScriptSource::joined).unwrap_or_default();
        let path = script_path(scripts_root, collection, owner, &event.listen);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(SyncError::io("create directory", parent))?;
        }
        fs::write(&path, script_file_content(&source)).map_err(SyncError::io("write", &path))?;

        println!("{} Extracted: {}", "✓".green(), file_label(&path));
        report.files.push(path);
    }
    Ok(())
}

fn build_events(
    scripts_root: &Path,
    collection: &str,
    owner: ScriptOwner<'_>,
    events: &mut [Event],
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    for event in events {
        let Some(script) = &mut event.script else {
            continue;
        };
        let path = script_path(scripts_root, collection, owner, &event.listen);
        if !path.is_file() {
            log::debug!("No script file at '{}', leaving event untouched.", path.display());
            report.skipped += 1;
            continue;
        }

        let content = fs::read_to_string(&path).map_err(SyncError::io("read", &path))?;
        script.exec = Some(ScriptSource::Lines(script_lines(&content)));

        println!("{} Injected: {}", "✓".green(), file_label(&path));
        report.files.push(path);
    }
    Ok(())
}

fn extract_payload(
    payloads_root: &Path,
    collection: &str,
    ancestry: &[String],
    request: &Request,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let Some(raw) = request.raw_body() else {
        return Ok(());
    };
    let Ok(payload) = serde_json::from_str::<serde_json::Value>(&raw) else {
        log::debug!("Body of '{}' is not JSON, skipping.", request.name);
        report.skipped += 1;
        return Ok(());
    };

    let path = payload_path(payloads_root, collection, ancestry);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(SyncError::io("create directory", parent))?;
    }
    let pretty = serde_json::to_string_pretty(&payload).map_err(|e| SyncError::InvalidPayloadJson {
        path: path.display().to_string(),
        source: e,
    })?;
    fs::write(&path, pretty).map_err(SyncError::io("write", &path))?;

    println!("{} Extracted: {}", "✓".green(), file_label(&path));
    report.files.push(path);
    Ok(())
}

fn build_payload(
    payloads_root: &Path,
    collection: &str,
    ancestry: &[String],
    request: &mut Request,
    report: &mut SyncReport,
) -> Result<(), SyncError> {
    let path = payload_path(payloads_root, collection, ancestry);
    if !path.is_file() {
        return Ok(());
    }

    let content = fs::read_to_string(&path).map_err(SyncError::io("read", &path))?;
    let invalid = |e| SyncError::InvalidPayloadJson {
        path: path.display().to_string(),
        source: e,
    };
    let payload: serde_json::Value = serde_json::from_str(&content).map_err(invalid)?;
    let compact = serde_json::to_string(&payload).map_err(invalid)?;

    let detail = match request.request.get_or_insert_with(|| RequestField::Detailed(RequestDetail::default())) {
        RequestField::Detailed(detail) => detail,
        RequestField::Url(_) => {
            log::warn!(
                "Request '{}' is a plain URL and has no body; skipping '{}'.",
                request.name,
                path.display()
            );
            report.skipped += 1;
            return Ok(());
        }
    };
    let mut body = detail.body().unwrap_or_else(|| Body {
        mode: Some("raw".to_string()),
        ..Body::default()
    });
    if !body.is_raw() {
        log::warn!(
            "Request '{}' has a non-raw body; skipping '{}'.",
            request.name,
            path.display()
        );
        report.skipped += 1;
        return Ok(());
    }
    body.raw = Some(compact);
    detail.set_body(&body).map_err(invalid)?;

    println!("{} Injected: {}", "✓".green(), file_label(&path));
    report.files.push(path);
    Ok(())
}
