use std::fmt;
use std::path::{Path, PathBuf};

use crate::bundle::archive::BundleWriter;
use crate::bundle::error::BundleError;
use crate::bundle::path_set::PathSet;
use crate::git::{discover, ChangeSource};

/// Sentinel printed when there is nothing to bundle
pub const NO_CHANGES: &str = "NO_CHANGES";

/// What a bundle run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOutcome {
    /// Discovery found no changed paths; no archive was touched
    NoChanges,
    /// The archive was written
    Written {
        /// Absolute path of the archive
        path: PathBuf,
        /// Archive entry names, sorted
        entries: Vec<String>,
    },
}

impl BundleOutcome {
    pub fn archive_path(&self) -> Option<&Path> {
        match self {
            BundleOutcome::NoChanges => None,
            BundleOutcome::Written { path, .. } => Some(path),
        }
    }
}

/// The single line reported to the caller
impl fmt::Display for BundleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleOutcome::NoChanges => f.write_str(NO_CHANGES),
            BundleOutcome::Written { path, .. } => write!(f, "{}", path.display()),
        }
    }
}

/// Discovers changed paths and archives them.
///
/// The repository root is explicit so the whole pipeline can run against any
/// directory with any [`ChangeSource`].
pub struct BundleBuilder<S> {
    root: PathBuf,
    source: S,
}

impl<S: ChangeSource> BundleBuilder<S> {
    pub fn new(root: impl Into<PathBuf>, source: S) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run discovery and aggregation without writing anything
    pub fn collect(&self) -> PathSet {
        let lists = discover(&self.source);
        let paths = PathSet::from_lists(&lists);
        tracing::debug!(
            root = %self.root.display(),
            paths = paths.len(),
            "Aggregated changed paths"
        );
        paths
    }

    /// Discover, aggregate, and write the bundle
    pub fn build(&self) -> Result<BundleOutcome, BundleError> {
        let paths = self.collect();
        if paths.is_empty() {
            tracing::info!(root = %self.root.display(), "No changes to bundle");
            return Ok(BundleOutcome::NoChanges);
        }

        let written = BundleWriter::new(&self.root).write(&paths)?;
        Ok(BundleOutcome::Written {
            path: written.path,
            entries: written.entries,
        })
    }
}
