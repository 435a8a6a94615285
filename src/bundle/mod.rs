//! Change bundles: aggregate discovered paths and archive them into a zip.

pub mod archive;
pub mod builder;
pub mod error;
pub mod path_set;

pub use archive::{BundleWriter, WrittenBundle};
pub use builder::{BundleBuilder, BundleOutcome, NO_CHANGES};
pub use error::BundleError;
pub use path_set::{ChangedPath, PathSet};
