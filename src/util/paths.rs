//! Path utilities for the bundle location and changeset-bundle data directories

use std::path::{Path, PathBuf};

/// Environment variable that overrides the data directory (~/.changeset-bundle)
pub const DATA_DIR_ENV: &str = "CHANGESET_BUNDLE_HOME";

/// Bundle directory, relative to the repository root
pub const BUNDLE_DIR: &str = ".codex/gemini";

/// Bundle file name inside [`BUNDLE_DIR`]
pub const BUNDLE_FILE_NAME: &str = "changed_files.zip";

/// Get the default data directory path (~/.changeset-bundle)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".changeset-bundle"))
        .unwrap_or_else(|| PathBuf::from(".changeset-bundle"))
}

/// Get the base data directory.
/// Returns `$CHANGESET_BUNDLE_HOME` if set and non-empty, otherwise ~/.changeset-bundle
pub fn data_dir() -> PathBuf {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_data_dir(),
    }
}

/// Get the config file path (~/.changeset-bundle/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Directory the bundle is written into (`<root>/.codex/gemini`)
pub fn bundle_dir(root: &Path) -> PathBuf {
    root.join(BUNDLE_DIR)
}

/// Fixed bundle location (`<root>/.codex/gemini/changed_files.zip`)
pub fn bundle_path(root: &Path) -> PathBuf {
    bundle_dir(root).join(BUNDLE_FILE_NAME)
}

/// The bundle path as git would report it, relative to the repository root
pub fn bundle_relative_path() -> String {
    format!("{BUNDLE_DIR}/{BUNDLE_FILE_NAME}")
}
