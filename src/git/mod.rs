//! Git operations module

mod changes;

pub use changes::{
    discover, ChangeLists, ChangeQuery, ChangeSource, FixedChangeSource, GitChangeSource,
};
