use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors while emitting a bundle.
///
/// Discovery problems never surface here; they degrade to an empty listing.
#[derive(Error, Debug)]
pub enum BundleError {
    #[error("Failed to create bundle directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove previous bundle {path}: {source}")]
    RemoveExisting {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create archive in {path}: {source}")]
    CreateArchive {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read {path}: {source}")]
    ReadEntry {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Failed to move archive into place: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
