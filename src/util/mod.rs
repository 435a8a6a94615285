//! Utility modules

pub mod paths;
pub mod tools;

pub use paths::{bundle_dir, bundle_path, config_path, data_dir};
pub use tools::{ToolPaths, ToolStatus};
