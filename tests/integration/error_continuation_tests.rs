use filedup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use filedup::scanner::{Digest, FileHasher, HashError, ScanError, Sha256Hasher};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

/// Real SHA-256, except files named `poison*` fail as if permission was denied.
fn poisoned_hasher() -> Arc<dyn FileHasher> {
    let inner = Sha256Hasher::new();
    Arc::new(move |path: &Path| -> Result<Digest, HashError> {
        let poisoned = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with("poison"));
        if poisoned {
            Err(HashError::PermissionDenied(path.to_path_buf()))
        } else {
            inner.digest(path)
        }
    })
}

#[test]
fn test_hash_failure_skips_file_and_reports_it() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"dup");
    let b = write(dir.path(), "b.txt", b"dup");
    let poison = write(dir.path(), "poison.txt", b"dup");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .with_hasher(poisoned_hasher())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.membership(), vec![vec![a, b]]);
    assert!(summary.is_partial());
    assert_eq!(summary.errors.len(), 1);
    match &summary.errors[0] {
        ScanError::Hash(HashError::PermissionDenied(path)) => assert_eq!(path, &poison),
        other => panic!("Expected PermissionDenied hash error, got: {:?}", other),
    }
}

#[test]
fn test_hash_failure_does_not_void_sibling_groups() {
    let dir = tempdir().unwrap();
    write(dir.path(), "poison_1", b"first");
    write(dir.path(), "poison_2", b"first");
    write(dir.path(), "x", b"second!");
    write(dir.path(), "y", b"second!");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .with_hasher(poisoned_hasher())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(summary.errors.len(), 2);
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_strict_mode_fails_fast_on_hash_error() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "poison.txt", b"dup");

    let result = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .with_hasher(poisoned_hasher())
        .find_duplicates(&[dir.path().to_path_buf()]);

    match result {
        Err(FinderError::Hash(HashError::PermissionDenied(_))) => {}
        other => panic!("Expected strict-mode hash error, got: {:?}", other.map(|r| r.0)),
    }
}

#[test]
fn test_strict_mode_without_errors_succeeds() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");

    let (groups, summary) = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(!summary.is_partial());
}

#[test]
fn test_unique_sizes_never_reach_failing_hasher() {
    let dir = tempdir().unwrap();
    write(dir.path(), "poison_small", b"1");
    write(dir.path(), "poison_big", b"22");

    let (groups, summary) = DuplicateFinder::new(FinderConfig::default().with_strict(true))
        .with_hasher(poisoned_hasher())
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.hashed_files, 0);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"dup");
    let b = write(dir.path(), "b.txt", b"dup");
    let locked = write(dir.path(), "locked.txt", b"dup");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read(&locked).is_ok() {
        // Running with elevated privileges; permissions are not enforced.
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(&[dir.path().to_path_buf()]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.membership(), vec![vec![a, b]]);
    assert_eq!(summary.errors.len(), 1);
    assert!(matches!(
        summary.errors[0],
        ScanError::Hash(HashError::PermissionDenied(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_subdirectory_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "b.txt", b"dup");
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write(&locked, "hidden.txt", b"dup");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(&[dir.path().to_path_buf()]);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
    assert!(summary.is_partial());
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_is_not_an_error() {
    use filedup::scanner::WalkerConfig;

    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"x");
    let b = write(dir.path(), "b.txt", b"x");
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    for follow in [false, true] {
        let config = FinderConfig::default().with_walker_config(WalkerConfig::new(follow));
        let (groups, summary) = DuplicateFinder::new(config)
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(groups.membership(), vec![vec![a.clone(), b.clone()]]);
        assert_eq!(summary.total_files, 2);
        assert!(summary.errors.is_empty(), "follow={}: {:?}", follow, summary.errors);
    }
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_does_not_abort_strict_run() {
    use filedup::scanner::WalkerConfig;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"x");
    write(dir.path(), "b.txt", b"x");
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();

    for follow in [false, true] {
        let config = FinderConfig::default()
            .with_strict(true)
            .with_walker_config(WalkerConfig::new(follow));
        let (groups, _) = DuplicateFinder::new(config)
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(groups.len(), 1);
    }
}
