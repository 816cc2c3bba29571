// src/constants.rs

/// The optional project configuration file, looked up in the project root.
pub const PROJECT_CONFIG_FILENAME: &str = "plaintest.toml";

/// The executable invoked for every collection run.
pub const DEFAULT_RUNNER_EXECUTABLE: &str = "newman";

// --- Conventional directories ---

pub const COLLECTIONS_DIR: &str = "collections";
/// Build output inside the collections directory. Takes priority over raw collections.
pub const COLLECTIONS_BUILD_SUBDIR: &str = "build";
pub const ENVIRONMENTS_DIR: &str = "environments";
pub const DATA_DIR: &str = "data";
pub const SCRIPTS_DIR: &str = "scripts";
pub const PAYLOADS_DIR: &str = "payloads";
pub const REPORTS_DIR: &str = "reports";

// --- File suffixes used for discovery ---

pub const COLLECTION_SUFFIX: &str = ".postman_collection.json";
pub const ENVIRONMENT_SUFFIX: &str = ".postman_environment.json";
pub const DATA_SUFFIX: &str = ".csv";
pub const SCRIPT_EXTENSION: &str = "js";
pub const PAYLOAD_EXTENSION: &str = "json";

// --- Runner flags ---

pub const ENV_SHORT_FLAG: &str = "-e";
pub const ENV_LONG_FLAG: &str = "--environment";
pub const DATA_SHORT_FLAG: &str = "-d";
pub const DATA_LONG_FLAG: &str = "--iteration-data";
pub const FOLDER_FLAG: &str = "--folder";
pub const VERBOSE_FLAG: &str = "--verbose";
pub const EXPORT_ENVIRONMENT_FLAG: &str = "--export-environment";
pub const REPORTERS_FLAG: &str = "--reporters";
pub const JSON_REPORTER: &str = "json";
pub const DEFAULT_REPORTERS: &str = "cli,htmlextra,json";
pub const JSON_EXPORT_FLAG: &str = "--reporter-json-export";
pub const HTML_EXPORT_FLAG: &str = "--reporter-htmlextra-export";

// --- Tool-only flags (never forwarded to the runner) ---

pub const SETUP_FLAG: &str = "--setup";
pub const TEST_FLAG: &str = "--test";
pub const ONCE_FLAG: &str = "--once";
pub const ROWS_SHORT_FLAG: &str = "-r";
pub const ROWS_LONG_FLAG: &str = "--rows";
pub const DEBUG_FLAG: &str = "--debug";
pub const REPORTS_FLAG: &str = "--reports";

// --- Temporary files & naming ---

pub const TEMP_ENV_PREFIX: &str = "plaintest_env_";
pub const TEMP_ROWS_PREFIX: &str = "plaintest_rows_";
/// `chrono` format for report file names, e.g. `20250101T120000`.
pub const REPORT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";

// --- Synchronizer naming ---

/// Label used for scripts attached to the collection root.
pub const COLLECTION_SCRIPT_LABEL: &str = "_collection";
/// Joins sanitized names inside a flat file name.
pub const PATH_SEPARATOR: &str = "__";
/// Substituted for names that sanitize to nothing.
pub const UNNAMED: &str = "unnamed";
