use filedup::duplicates::{find_duplicates, DuplicateFinder, Duplicates, FinderConfig};
use filedup::scanner::{Blake3Hasher, Digest, HashError, Sha256Hasher};
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

fn roots(dir: &Path) -> Vec<PathBuf> {
    vec![dir.to_path_buf()]
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_empty_directory_skip_hash() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("only_dirs")).unwrap();

    let dups = find_duplicates(&roots(dir.path()), true, Arc::new(Sha256Hasher::new())).unwrap();

    assert_eq!(dups, Duplicates::BySize(Default::default()));
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content bb");
    write(dir.path(), "c.txt", b"content ccc");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    // Distinct sizes: nothing is ever hashed
    assert_eq!(summary.candidate_files, 0);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_scan_reference_scenario() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"X");
    let b = write(dir.path(), "b.txt", b"X");
    write(dir.path(), "c.txt", b"Y");
    write(dir.path(), "d.txt", b"XX");

    let dups = find_duplicates(&roots(dir.path()), false, Arc::new(Sha256Hasher::new())).unwrap();

    let Duplicates::ByDigest(groups) = dups else {
        panic!("expected digest groups");
    };
    assert_eq!(groups.len(), 1);
    // sha256("X")
    let files = &groups["4b68ab3847feda7d6c62c1fbcbeebfa35eab7351ed5e78f4ddadea5df64b8015"];
    assert_eq!(files, &vec![a, b]);
}

#[test]
fn test_scan_reference_scenario_skip_hash() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a.txt", b"X");
    let b = write(dir.path(), "b.txt", b"X");
    let c = write(dir.path(), "c.txt", b"Y");
    write(dir.path(), "d.txt", b"XX");

    let dups = find_duplicates(&roots(dir.path()), true, Arc::new(Sha256Hasher::new())).unwrap();

    let Duplicates::BySize(groups) = dups else {
        panic!("expected size groups");
    };
    assert_eq!(groups.len(), 1);
    assert!(!groups.contains_key(&2));
    let mut files = groups[&1].clone();
    files.sort();
    assert_eq!(files, vec![a, b, c]);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    write(dir.path(), "a.txt", b"nested dup");
    write(&sub, "b.txt", b"nested dup");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 10);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.bin", b"aaaa");
    write(dir.path(), "b.bin", b"bbbb");
    write(dir.path(), "c.bin", b"cccc");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.candidate_files, 3);
    assert_eq!(summary.hashed_files, 3);
}

#[test]
fn test_scan_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
}

#[test]
fn test_scan_large_multi_chunk_files() {
    let dir = tempdir().unwrap();
    let big = vec![7u8; 3 * 64 * 1024 + 11];
    let mut other = big.clone();
    *other.last_mut().unwrap() = 8;

    write(dir.path(), "big1", &big);
    write(dir.path(), "big2", &big);
    write(dir.path(), "big3", &other);

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
}

#[test]
fn test_scan_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("dup{}", i), b"same bytes");
        write(dir.path(), &format!("uniq{}", i), format!("unique {}", i).as_bytes());
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_threads(3));
    let (first, _) = finder.find_duplicates(&roots(dir.path())).unwrap();
    let (second, _) = finder.find_duplicates(&roots(dir.path())).unwrap();

    assert_eq!(first.membership(), second.membership());
    assert_eq!(first, second);
}

#[test]
fn test_scan_hasher_swap_keeps_membership() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"one");
    write(dir.path(), "b", b"one");
    write(dir.path(), "c", b"two");

    let sha = find_duplicates(&roots(dir.path()), false, Arc::new(Sha256Hasher::new())).unwrap();
    let blake = find_duplicates(&roots(dir.path()), false, Arc::new(Blake3Hasher::new())).unwrap();

    assert_eq!(sha.membership(), blake.membership());
    assert_ne!(sha, blake);
}

#[test]
fn test_scan_with_stub_hasher() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"11");
    write(dir.path(), "b", b"22");
    write(dir.path(), "c", b"333");

    // A stub that only looks at the first byte
    let stub = |path: &Path| -> Result<Digest, HashError> {
        let bytes = fs::read(path).map_err(|e| HashError::from_io(path, e))?;
        Ok(format!("{:02x}", bytes[0]))
    };

    let dups = find_duplicates(&roots(dir.path()), false, Arc::new(stub)).unwrap();

    // a and b share a size but differ in the first byte; c never reaches the hasher
    assert!(dups.is_empty());
}

#[test]
fn test_scan_thread_counts_agree() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(dir.path(), &format!("f{}", i), format!("{}", i % 4).as_bytes());
    }

    let one = DuplicateFinder::new(FinderConfig::default().with_threads(1))
        .find_duplicates(&roots(dir.path()))
        .unwrap()
        .0;
    let many = DuplicateFinder::new(FinderConfig::default().with_threads(8))
        .find_duplicates(&roots(dir.path()))
        .unwrap()
        .0;

    assert_eq!(one.len(), 4);
    assert_eq!(one.membership(), many.membership());
}

#[cfg(unix)]
#[test]
fn test_scan_file_symlink_counts_as_file_by_default() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(
        groups.membership(),
        vec![vec![dir.path().join("link.txt"), target]]
    );
}

#[cfg(unix)]
#[test]
fn test_scan_does_not_descend_symlinked_dirs_by_default() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write(&sub, "only.txt", b"once");
    std::os::unix::fs::symlink(&sub, dir.path().join("alias")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
    assert!(!summary.is_partial());
}

#[cfg(unix)]
#[test]
fn test_scan_follow_symlinks_groups_link_with_target() {
    use filedup::scanner::WalkerConfig;

    let dir = tempdir().unwrap();
    let target = write(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(true));
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(&roots(dir.path()))
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups.file_count(), 2);
}
