//! Change discovery: asks git which paths differ from the tracked baseline
//!
//! Every query is best-effort. A missing git binary, a directory that is not
//! a repository, or a failing command all produce an empty listing instead of
//! an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One of the three listings that make up a change set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeQuery {
    /// Working tree differences not yet staged
    Unstaged,
    /// Index differences staged for the next commit
    Staged,
    /// Files on disk that are neither tracked nor ignored
    Untracked,
}

impl ChangeQuery {
    /// All queries, in the order discovery runs them
    pub fn all() -> &'static [ChangeQuery] {
        &[
            ChangeQuery::Unstaged,
            ChangeQuery::Staged,
            ChangeQuery::Untracked,
        ]
    }

    /// Git arguments producing a NUL-delimited path listing.
    ///
    /// Every listing is relative to the directory git runs in and limited to
    /// it, matching how `ls-files` reports untracked files.
    pub fn git_args(&self) -> &'static [&'static str] {
        match self {
            ChangeQuery::Unstaged => &["diff", "--name-only", "--relative", "-z"],
            ChangeQuery::Staged => &["diff", "--name-only", "--cached", "--relative", "-z"],
            ChangeQuery::Untracked => &["ls-files", "--others", "--exclude-standard", "-z"],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChangeQuery::Unstaged => "unstaged",
            ChangeQuery::Staged => "staged",
            ChangeQuery::Untracked => "untracked",
        }
    }
}

/// Something that can list changed paths for a repository.
///
/// Implementations return the raw NUL-delimited listing for a query and an
/// empty buffer when the listing cannot be produced.
pub trait ChangeSource {
    fn list(&self, query: ChangeQuery) -> Vec<u8>;
}

/// Raw output of the three discovery queries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLists {
    pub unstaged: Vec<u8>,
    pub staged: Vec<u8>,
    pub untracked: Vec<u8>,
}

impl ChangeLists {
    /// Raw output for a single query
    pub fn get(&self, query: ChangeQuery) -> &[u8] {
        match query {
            ChangeQuery::Unstaged => &self.unstaged,
            ChangeQuery::Staged => &self.staged,
            ChangeQuery::Untracked => &self.untracked,
        }
    }

    fn set(&mut self, query: ChangeQuery, output: Vec<u8>) {
        match query {
            ChangeQuery::Unstaged => self.unstaged = output,
            ChangeQuery::Staged => self.staged = output,
            ChangeQuery::Untracked => self.untracked = output,
        }
    }

    /// Check if every query came back empty
    pub fn is_empty(&self) -> bool {
        ChangeQuery::all().iter().all(|q| self.get(*q).is_empty())
    }
}

/// Run all three queries against a source
pub fn discover(source: &dyn ChangeSource) -> ChangeLists {
    let mut lists = ChangeLists::default();
    for &query in ChangeQuery::all() {
        let output = source.list(query);
        tracing::debug!(
            query = query.name(),
            bytes = output.len(),
            "Change query finished"
        );
        lists.set(query, output);
    }
    lists
}

/// Change source backed by the git command line
#[derive(Debug, Clone)]
pub struct GitChangeSource {
    /// Repository root (or any directory inside the work tree)
    root: PathBuf,
    /// Git executable to spawn
    program: PathBuf,
}

impl GitChangeSource {
    /// Create a source that runs `git` from `PATH`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_program(root, crate::util::tools::GIT_BINARY)
    }

    /// Create a source that runs a specific git executable
    pub fn with_program(root: impl Into<PathBuf>, program: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            program: program.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ChangeSource for GitChangeSource {
    fn list(&self, query: ChangeQuery) -> Vec<u8> {
        let output = Command::new(&self.program)
            .args(query.git_args())
            .current_dir(&self.root)
            .output();

        match output {
            Ok(o) if o.status.success() => o.stdout,
            Ok(o) => {
                tracing::warn!(
                    query = query.name(),
                    status = %o.status,
                    stderr = %String::from_utf8_lossy(&o.stderr).trim(),
                    "Git change query failed"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(
                    query = query.name(),
                    program = %self.program.display(),
                    error = %e,
                    "Failed to run git"
                );
                Vec::new()
            }
        }
    }
}

/// In-memory change source with fixed listings per query
#[derive(Debug, Clone, Default)]
pub struct FixedChangeSource {
    listings: HashMap<ChangeQuery, Vec<Vec<u8>>>,
}

impl FixedChangeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add paths to the listing for a query
    pub fn with_paths<I, P>(mut self, query: ChangeQuery, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        self.listings
            .entry(query)
            .or_default()
            .extend(paths.into_iter().map(|p| p.as_ref().to_vec()));
        self
    }
}

impl ChangeSource for FixedChangeSource {
    fn list(&self, query: ChangeQuery) -> Vec<u8> {
        let mut out = Vec::new();
        for path in self.listings.get(&query).into_iter().flatten() {
            out.extend_from_slice(path);
            out.push(0);
        }
        out
    }
}
