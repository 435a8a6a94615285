use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::git::GitChangeSource;
use crate::util::paths::config_path;
use crate::util::tools::ToolPaths;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Repository root that discovery and emission run against
    pub working_dir: PathBuf,
    /// Configured paths for external tools (git)
    pub tool_paths: ToolPaths,
}

/// TOML representation of config.toml
#[derive(Debug, Clone, Default, Deserialize)]
struct TomlConfig {
    tools: Option<ToolPaths>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            tool_paths: ToolPaths::default(),
        }
    }
}

impl Config {
    /// Load configuration from ~/.changeset-bundle/config.toml.
    ///
    /// A missing file yields the defaults; a malformed one is logged and ignored.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load configuration from a specific file
    pub fn load_from(config_file: &Path) -> Self {
        let mut config = Config::default();

        if !config_file.exists() {
            return config;
        }

        let contents = match fs::read_to_string(config_file) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %e,
                    "Failed to read config file"
                );
                return config;
            }
        };

        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => {
                // Load tool paths if configured
                if let Some(tools) = toml_config.tools {
                    config.tool_paths = tools;
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %e,
                    "Ignoring malformed config file"
                );
            }
        }

        config
    }

    /// Use a different repository root
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    /// Change source for the configured repository and git executable
    pub fn git_source(&self) -> GitChangeSource {
        GitChangeSource::with_program(&self.working_dir, self.tool_paths.git_program())
    }
}
