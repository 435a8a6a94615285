//! Integration tests for the discover → aggregate → archive flow
//!
//! Uses real git through `GitChangeSource` against temporary repositories.

use super::common::archive::{entry_names, read_entries};
use super::common::git_fixtures::{git_available, TestRepo};
use changeset_bundle::{
    BundleBuilder, BundleOutcome, ChangeQuery, ChangeSource, ChangedPath, GitChangeSource,
};
use std::fs;
use tempfile::TempDir;

fn build(repo: &TestRepo) -> BundleOutcome {
    BundleBuilder::new(&repo.path, GitChangeSource::new(&repo.path))
        .build()
        .expect("bundle build failed")
}

/// Modified, staged and untracked files are bundled; ignored ones are not
#[test]
fn test_every_change_kind_is_bundled() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::with_every_change_kind();

    let outcome = build(&repo);

    assert_eq!(outcome.to_string(), repo.bundle_path().display().to_string());
    let entries = read_entries(&repo.bundle_path());
    assert_eq!(
        entries.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["a.txt", "b.txt", "c.txt"]
    );
    assert_eq!(entries["a.txt"], b"modified a\n");
    assert_eq!(entries["b.txt"], b"staged b\n");
    assert_eq!(entries["c.txt"], b"untracked c\n");
}

/// A clean repository produces the sentinel and no archive
#[test]
fn test_clean_repository_reports_no_changes() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();

    let outcome = build(&repo);

    assert_eq!(outcome, BundleOutcome::NoChanges);
    assert_eq!(outcome.to_string(), "NO_CHANGES");
    assert!(!repo.path.join(".codex").exists());
}

/// A directory outside any repository is treated as having no changes
#[test]
fn test_non_repository_reports_no_changes() {
    if !git_available() {
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("loose.txt"), "not tracked by anything").unwrap();

    let outcome = BundleBuilder::new(dir.path(), GitChangeSource::new(dir.path()))
        .build()
        .unwrap();

    assert_eq!(outcome, BundleOutcome::NoChanges);
}

/// A file staged and then modified again shows up in two queries but once in the archive
#[test]
fn test_staged_then_modified_file_is_archived_once() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.create_file("twice.txt", "first\n");
    repo.stage_file("twice.txt");
    repo.create_file("twice.txt", "second\n");

    let source = GitChangeSource::new(&repo.path);
    assert!(!source.list(ChangeQuery::Staged).is_empty());

    build(&repo);

    let names = entry_names(&repo.bundle_path());
    assert_eq!(names, vec!["twice.txt"]);
    assert_eq!(read_entries(&repo.bundle_path())["twice.txt"], b"second\n");
}

/// Staged files deleted from disk before emission are skipped without error
#[test]
fn test_staged_file_deleted_before_emission_is_skipped() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.create_file("kept.txt", "kept\n");
    repo.create_file("doomed.txt", "doomed\n");
    repo.stage_file("kept.txt");
    repo.stage_file("doomed.txt");
    repo.delete_file("doomed.txt");

    let builder = BundleBuilder::new(&repo.path, GitChangeSource::new(&repo.path));
    assert!(builder.collect().contains(&ChangedPath::from("doomed.txt")));

    builder.build().unwrap();

    assert_eq!(entry_names(&repo.bundle_path()), vec!["kept.txt"]);
}

/// Deleting a tracked file reports it as changed, but there is nothing to archive
#[test]
fn test_deleted_tracked_file_is_not_archived() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.commit_file("old.txt", "old\n", "Add old");
    repo.delete_file("old.txt");
    repo.create_file("new.txt", "new\n");

    build(&repo);

    assert_eq!(entry_names(&repo.bundle_path()), vec!["new.txt"]);
}

/// Two runs without working-tree changes produce the same names and contents
#[test]
fn test_repeated_runs_are_idempotent() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::with_every_change_kind();

    build(&repo);
    let first = read_entries(&repo.bundle_path());
    build(&repo);
    let second = read_entries(&repo.bundle_path());

    assert_eq!(first, second);
    assert!(!second.contains_key(".codex/gemini/changed_files.zip"));
}

/// The old archive is replaced, never appended to
#[test]
fn test_previous_archive_is_replaced() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.create_file("first.txt", "1\n");
    build(&repo);
    assert!(entry_names(&repo.bundle_path()).contains(&"first.txt".to_string()));

    repo.delete_file("first.txt");
    repo.create_file("second.txt", "2\n");
    build(&repo);

    assert_eq!(entry_names(&repo.bundle_path()), vec!["second.txt"]);

    // Same result when the previous archive was removed by hand
    fs::remove_file(repo.bundle_path()).unwrap();
    build(&repo);
    assert_eq!(entry_names(&repo.bundle_path()), vec!["second.txt"]);
}

/// Running from a subdirectory bundles only changes beneath it, resolved correctly
#[test]
fn test_build_from_subdirectory_uses_matching_paths() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.commit_file("a.txt", "top original\n", "Add top a");
    repo.commit_file("sub/a.txt", "sub unchanged\n", "Add sub a");
    repo.commit_file("sub/tracked.txt", "tracked original\n", "Add sub tracked");

    repo.create_file("a.txt", "top modified\n");
    repo.create_file("sub/tracked.txt", "tracked modified\n");
    repo.create_file("sub/staged.txt", "staged\n");
    repo.stage_file("sub/staged.txt");
    repo.create_file("sub/new.txt", "untracked\n");

    let sub = repo.path.join("sub");
    BundleBuilder::new(&sub, GitChangeSource::new(&sub))
        .build()
        .unwrap();

    let bundle = fs::canonicalize(&sub)
        .unwrap()
        .join(".codex/gemini/changed_files.zip");
    let entries = read_entries(&bundle);
    assert_eq!(
        entries.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["new.txt", "staged.txt", "tracked.txt"]
    );
    assert_eq!(entries["tracked.txt"], b"tracked modified\n");
    assert!(!entries.contains_key("a.txt"));
    assert!(!repo.path.join(".codex").exists());
}

/// Names with spaces, unicode and nested directories keep their exact form
#[test]
fn test_unusual_names_are_archived_verbatim() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.create_file("with space.txt", "space\n");
    repo.create_file("ünïcødé/日本語.md", "unicode\n");
    repo.create_file("deep/nested/dir/file.rs", "fn main() {}\n");
    repo.stage_file("with space.txt");

    build(&repo);

    let entries = read_entries(&repo.bundle_path());
    assert_eq!(entries["with space.txt"], b"space\n");
    assert_eq!(entries["ünïcødé/日本語.md"], b"unicode\n");
    assert_eq!(entries["deep/nested/dir/file.rs"], b"fn main() {}\n");
}

#[cfg(unix)]
#[test]
fn test_newline_in_name_is_archived() {
    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    repo.create_file("line\nbreak.txt", "nl\n");

    build(&repo);

    assert_eq!(entry_names(&repo.bundle_path()), vec!["line\nbreak.txt"]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_non_utf8_name_is_discovered_and_archived() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    if !git_available() {
        return;
    }
    let repo = TestRepo::new();
    fs::write(repo.path.join(OsStr::from_bytes(b"raw\xffbytes.bin")), "raw\n").unwrap();

    let builder = BundleBuilder::new(&repo.path, GitChangeSource::new(&repo.path));
    assert!(builder
        .collect()
        .contains(&ChangedPath::new(b"raw\xffbytes.bin".to_vec())));

    builder.build().unwrap();

    assert_eq!(
        read_entries(&repo.bundle_path())["raw%FFbytes.bin"],
        b"raw\n"
    );
}
