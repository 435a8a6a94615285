//! Aggregation of discovery output into a sorted, deduplicated path set

use std::borrow::Cow;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};

use crate::git::{ChangeLists, ChangeQuery};

/// A repository-relative, slash-delimited path exactly as git reported it.
///
/// The raw bytes are kept so names that are not valid UTF-8 still resolve to
/// the right file on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChangedPath(Vec<u8>);

impl ChangedPath {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the path is valid UTF-8 and can be used verbatim as an entry name
    pub fn is_utf8(&self) -> bool {
        std::str::from_utf8(&self.0).is_ok()
    }

    /// Archive entry name.
    ///
    /// Bytes that are not valid UTF-8 are written as `%XX`, so distinct raw
    /// names keep distinct entry names.
    pub fn entry_name(&self) -> Cow<'_, str> {
        match std::str::from_utf8(&self.0) {
            Ok(name) => Cow::Borrowed(name),
            Err(_) => Cow::Owned(escape_invalid_utf8(&self.0)),
        }
    }

    /// Relative filesystem path, byte-for-byte on Unix
    pub fn to_path_buf(&self) -> PathBuf {
        #[cfg(unix)]
        {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;
            PathBuf::from(OsStr::from_bytes(&self.0))
        }

        #[cfg(not(unix))]
        {
            PathBuf::from(String::from_utf8_lossy(&self.0).into_owned())
        }
    }

    /// Resolve against the repository root
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.to_path_buf())
    }
}

fn escape_invalid_utf8(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 8);
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.push_str(&String::from_utf8_lossy(valid));
                let bad_len = e.error_len().unwrap_or(rest.len());
                for b in &rest[..bad_len] {
                    let _ = write!(out, "%{b:02X}");
                }
                bytes = &rest[bad_len..];
            }
        }
    }
}

impl fmt::Display for ChangedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entry_name())
    }
}

impl From<&str> for ChangedPath {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

/// Deduplicated set of changed paths, iterated in sorted order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSet {
    paths: BTreeSet<ChangedPath>,
}

impl PathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge all three discovery listings
    pub fn from_lists(lists: &ChangeLists) -> Self {
        let mut set = Self::new();
        for &query in ChangeQuery::all() {
            set.extend_from_nul_output(lists.get(query));
        }
        set
    }

    /// Split a NUL-delimited listing and add every non-empty entry
    pub fn extend_from_nul_output(&mut self, output: &[u8]) {
        for entry in output.split(|b| *b == 0).filter(|e| !e.is_empty()) {
            self.paths.insert(ChangedPath::new(entry));
        }
    }

    pub fn insert(&mut self, path: ChangedPath) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &ChangedPath) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ChangedPath> {
        self.paths.iter()
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a ChangedPath;
    type IntoIter = btree_set::Iter<'a, ChangedPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<ChangedPath> for PathSet {
    fn from_iter<T: IntoIterator<Item = ChangedPath>>(iter: T) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
