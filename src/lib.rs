pub mod bundle;
pub mod config;
pub mod git;
pub mod util;

pub use bundle::{
    BundleBuilder, BundleError, BundleOutcome, BundleWriter, ChangedPath, PathSet, NO_CHANGES,
};
pub use config::Config;
pub use git::{ChangeQuery, ChangeSource, FixedChangeSource, GitChangeSource};
