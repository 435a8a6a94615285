//! Archive emission: writes the changed files into the fixed bundle location

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::bundle::error::BundleError;
use crate::bundle::path_set::{ChangedPath, PathSet};
use crate::util::paths::{bundle_dir, bundle_path, bundle_relative_path};

/// Result of a successful archive write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenBundle {
    /// Absolute path of the archive
    pub path: PathBuf,
    /// Entry names in the order they were written
    pub entries: Vec<String>,
    /// Paths that were not regular files at write time, or whose entry name
    /// was already taken
    pub skipped: Vec<ChangedPath>,
}

/// Writes a [`PathSet`] into `<root>/.codex/gemini/changed_files.zip`
#[derive(Debug, Clone)]
pub struct BundleWriter {
    root: PathBuf,
}

impl BundleWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the archive will be written
    pub fn output_path(&self) -> PathBuf {
        bundle_path(&self.root)
    }

    /// Replace the bundle with a fresh archive of `paths`.
    ///
    /// The archive is assembled in a temporary file next to the bundle and
    /// moved into place only once it is complete.
    pub fn write(&self, paths: &PathSet) -> Result<WrittenBundle, BundleError> {
        let dir = bundle_dir(&self.root);
        fs::create_dir_all(&dir).map_err(|source| BundleError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let out_path = self.output_path();
        remove_existing(&out_path)?;

        let temp = NamedTempFile::new_in(&dir).map_err(|source| BundleError::CreateArchive {
            path: dir.clone(),
            source,
        })?;

        let mut zip = ZipWriter::new(temp);
        let own_entry = bundle_relative_path();
        let mut entries = Vec::new();
        let mut skipped = Vec::new();
        let mut written_names = HashSet::new();

        for path in paths {
            if path.as_bytes() == own_entry.as_bytes() {
                tracing::debug!(path = %path, "Skipping the bundle itself");
                skipped.push(path.clone());
                continue;
            }

            let name = path.entry_name().into_owned();
            if written_names.contains(&name) {
                tracing::warn!(
                    path = %path,
                    entry = %name,
                    "Entry name already used by another path, skipping"
                );
                skipped.push(path.clone());
                continue;
            }

            if append_file(&mut zip, &self.root, path, &name)? {
                written_names.insert(name.clone());
                entries.push(name);
            } else {
                skipped.push(path.clone());
            }
        }

        let mut temp = zip.finish()?;
        temp.flush()?;
        temp.persist(&out_path)?;

        let path = fs::canonicalize(&out_path).unwrap_or(out_path);
        tracing::info!(
            path = %path.display(),
            entries = entries.len(),
            skipped = skipped.len(),
            "Wrote change bundle"
        );

        Ok(WrittenBundle {
            path,
            entries,
            skipped,
        })
    }
}

fn remove_existing(path: &Path) -> Result<(), BundleError> {
    match fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Removed previous bundle");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BundleError::RemoveExisting {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Add one path to the archive. Returns `false` if it was skipped.
fn append_file<W: Write + io::Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    path: &ChangedPath,
    name: &str,
) -> Result<bool, BundleError> {
    let full = path.resolve(root);

    // Follows symlinks, so a dangling link reads as missing
    let metadata = match fs::metadata(&full) {
        Ok(m) if m.is_file() => m,
        Ok(_) => {
            tracing::debug!(path = %path, "Skipping non-regular file");
            return Ok(false);
        }
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Skipping missing path");
            return Ok(false);
        }
    };

    let mut file = match File::open(&full) {
        Ok(f) => f,
        // Deleted between the metadata check and the open
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path, "Path vanished before it could be read");
            return Ok(false);
        }
        Err(source) => return Err(BundleError::ReadEntry { path: full, source }),
    };

    if !path.is_utf8() {
        tracing::warn!(
            path = %path,
            entry = %name,
            "Path is not valid UTF-8; archiving under a percent-escaped entry name"
        );
    }

    let options = entry_options(&metadata);
    zip.start_file(name, options)?;
    io::copy(&mut file, zip)?;
    Ok(true)
}

fn entry_options(metadata: &fs::Metadata) -> FileOptions {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(metadata.len() >= u64::from(u32::MAX));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        options.unix_permissions(metadata.permissions().mode())
    }

    #[cfg(not(unix))]
    {
        options
    }
}
