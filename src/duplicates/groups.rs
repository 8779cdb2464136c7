//! Size and digest grouping.
//!
//! # Overview
//!
//! Phase 1 groups files by exact byte size. A size becomes a *candidate* the
//! moment its second file arrives, and every later file of that size joins
//! it. Phase 2 groups candidate files by content digest and drops groups
//! with a single member.
//!
//! # Example
//!
//! ```
//! use filedup::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     (PathBuf::from("/a.txt"), 1),
//!     (PathBuf::from("/b.txt"), 1),
//!     (PathBuf::from("/d.txt"), 2),
//! ];
//!
//! let (groups, stats) = group_by_size(files);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[&1].len(), 2);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::Digest;

/// Accumulates files by size and tracks which sizes have become candidates.
///
/// Files keep their discovery order inside each size.
#[derive(Debug, Default)]
pub struct SizeGrouper {
    by_size: HashMap<u64, Vec<PathBuf>>,
    candidates: usize,
    total_files: usize,
    total_size: u64,
}

impl SizeGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, returning `true` if this insert turned its size into a candidate.
    pub fn insert(&mut self, path: PathBuf, size: u64) -> bool {
        self.total_files += 1;
        self.total_size += size;

        let files = self.by_size.entry(size).or_default();
        files.push(path);
        if files.len() == 2 {
            self.candidates += 1;
            true
        } else {
            false
        }
    }

    /// Number of candidate sizes so far.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates
    }

    /// Consume the grouper, keeping only candidate sizes.
    #[must_use]
    pub fn into_candidates(self) -> (HashMap<u64, Vec<PathBuf>>, GroupingStats) {
        let mut stats = GroupingStats {
            total_files: self.total_files,
            total_size: self.total_size,
            unique_sizes: self.by_size.len(),
            ..Default::default()
        };

        let groups: HashMap<u64, Vec<PathBuf>> = self
            .by_size
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .collect();

        stats.duplicate_groups = groups.len();
        stats.potential_duplicates = groups.values().map(Vec::len).sum();
        stats.eliminated_unique = stats.total_files - stats.potential_duplicates;
        (groups, stats)
    }
}

/// Statistics from size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files in candidate groups
    pub potential_duplicates: usize,
    /// Number of files eliminated because no other file shares their size
    pub eliminated_unique: usize,
    /// Number of candidate size groups
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group `(path, size)` pairs by size (Phase 1 of duplicate detection).
///
/// Returns only sizes shared by two or more files.
#[must_use]
pub fn group_by_size<I>(files: I) -> (HashMap<u64, Vec<PathBuf>>, GroupingStats)
where
    I: IntoIterator<Item = (PathBuf, u64)>,
{
    let mut grouper = SizeGrouper::new();
    for (path, size) in files {
        grouper.insert(path, size);
    }
    grouper.into_candidates()
}

/// Group `(path, digest)` pairs by digest, dropping singleton groups.
#[must_use]
pub fn group_by_digest<I>(hashed: I) -> HashMap<Digest, Vec<PathBuf>>
where
    I: IntoIterator<Item = (PathBuf, Digest)>,
{
    let mut groups: HashMap<Digest, Vec<PathBuf>> = HashMap::new();
    for (path, digest) in hashed {
        groups.entry(digest).or_default().push(path);
    }
    groups.retain(|digest, files| {
        if files.len() > 1 {
            true
        } else {
            log::trace!("Dropping unique digest {}: {}", digest, files[0].display());
            false
        }
    });
    groups
}

/// Key of a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// Byte size, when hashing was skipped
    Size(u64),
    /// Content digest
    Digest(Digest),
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Size(size) => write!(f, "{}", size),
            Self::Digest(digest) => f.write_str(digest),
        }
    }
}

/// Result of a duplicate search.
///
/// The key type depends on whether content hashing ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Duplicates {
    /// Size-collision groups; produced when hashing is skipped.
    BySize(HashMap<u64, Vec<PathBuf>>),
    /// Confirmed duplicate groups keyed by content digest.
    ByDigest(HashMap<Digest, Vec<PathBuf>>),
}

impl Default for Duplicates {
    fn default() -> Self {
        Self::ByDigest(HashMap::new())
    }
}

impl Duplicates {
    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::BySize(groups) => groups.len(),
            Self::ByDigest(groups) => groups.len(),
        }
    }

    /// Whether no groups were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.iter().map(|(_, files)| files.len()).sum()
    }

    /// Iterate groups in arbitrary order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = (GroupKey, &[PathBuf])> + '_> {
        match self {
            Self::BySize(groups) => Box::new(
                groups
                    .iter()
                    .map(|(size, files)| (GroupKey::Size(*size), files.as_slice())),
            ),
            Self::ByDigest(groups) => Box::new(
                groups
                    .iter()
                    .map(|(digest, files)| (GroupKey::Digest(digest.clone()), files.as_slice())),
            ),
        }
    }

    /// Groups sorted by key, for stable presentation.
    #[must_use]
    pub fn sorted(&self) -> Vec<(GroupKey, &[PathBuf])> {
        let mut groups: Vec<_> = self.iter().collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        groups
    }

    /// Group memberships as sorted path sets, independent of keys and order.
    ///
    /// Useful for comparing two runs whose keys differ, e.g. with another hasher.
    #[must_use]
    pub fn membership(&self) -> Vec<Vec<PathBuf>> {
        let mut sets: Vec<Vec<PathBuf>> = self
            .iter()
            .map(|(_, files)| {
                let mut files = files.to_vec();
                files.sort();
                files
            })
            .collect();
        sets.sort();
        sets
    }

    /// Whether the groups are keyed by size.
    #[must_use]
    pub fn is_by_size(&self) -> bool {
        matches!(self, Self::BySize(_))
    }
}
