//! Git executable detection
//!
//! Change discovery shells out to git. The executable comes from the
//! `[tools]` section of config.toml when that path is usable, otherwise from
//! `PATH`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Binary name looked up on `PATH`
pub const GIT_BINARY: &str = "git";

/// Status of the git executable's availability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolStatus {
    /// Tool is available at the given path
    Available(PathBuf),
    /// Tool was not found in PATH or configured location
    #[default]
    NotFound,
    /// A path was configured in config.toml but it's invalid
    ConfiguredPathInvalid(PathBuf),
}

/// Configuration for tool paths from config.toml
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ToolPaths {
    pub git: Option<PathBuf>,
}

impl ToolPaths {
    /// Detect git availability
    ///
    /// 1. If a path is configured, validate that it exists and is executable
    /// 2. Otherwise use `which` to find it in PATH
    pub fn detect_git(&self) -> ToolStatus {
        if let Some(path) = &self.git {
            if is_valid_executable(path) {
                return ToolStatus::Available(path.clone());
            } else {
                return ToolStatus::ConfiguredPathInvalid(path.clone());
            }
        }

        match which::which(GIT_BINARY) {
            Ok(path) => ToolStatus::Available(path),
            Err(_) => ToolStatus::NotFound,
        }
    }

    /// Program to spawn for git queries.
    ///
    /// Falls back to the bare binary name when detection fails; spawning it
    /// then fails and discovery degrades to an empty result.
    pub fn git_program(&self) -> PathBuf {
        match self.detect_git() {
            ToolStatus::Available(path) => path,
            ToolStatus::ConfiguredPathInvalid(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "Configured git path is not an executable, falling back to PATH"
                );
                which::which(GIT_BINARY).unwrap_or_else(|_| PathBuf::from(GIT_BINARY))
            }
            ToolStatus::NotFound => {
                tracing::warn!("git not found in PATH");
                PathBuf::from(GIT_BINARY)
            }
        }
    }
}

/// Check if a path points to a valid executable
fn is_valid_executable(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    // On Unix, check if the file is executable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = path.metadata() {
            return metadata.is_file() && metadata.permissions().mode() & 0o111 != 0;
        }
        false
    }

    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
