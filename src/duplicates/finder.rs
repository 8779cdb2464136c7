//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - Discover every file below the supplied roots
//! 2. **Phase 1 - Size grouping**: Query sizes on the worker pool and keep
//!    sizes shared by two or more files (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Content hashing**: Digest every candidate file on the
//!    worker pool and keep digests shared by two or more files
//!
//! Both phases run on one bounded rayon pool. Workers only produce
//! `(path, size)` or `(path, digest)` results; all grouping happens on the
//! calling thread after the parallel step has been collected.
//!
//! # Error policy
//!
//! A file whose metadata or content cannot be read is skipped and recorded
//! in [`ScanSummary::errors`]. With [`FinderConfig::strict`] the first such
//! failure aborts the run instead. A root that cannot be opened always
//! aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use filedup::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_threads(4));
//! let (duplicates, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! for (key, files) in duplicates.sorted() {
//!     println!("{}: {} files", key, files.len());
//! }
//! println!("{} files skipped", summary.errors.len());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;

use super::groups::{group_by_digest, Duplicates, GroupKey, GroupingStats, SizeGrouper};
use crate::progress::ProgressCallback;
use crate::scanner::walker::is_dangling_symlink;
use crate::scanner::{
    dedupe_roots, Digest, FileHasher, HashError, ScanError, Sha256Hasher, WalkError, Walker,
    WalkerConfig,
};

/// Threshold for logging large files.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Worker pool size; 0 uses the available parallelism.
    pub threads: usize,
    /// Stop after size grouping and return size-collision groups.
    pub skip_hash: bool,
    /// Fail-fast on the first per-file error instead of skipping the file.
    pub strict: bool,
    /// Canonicalise roots and drop repeated or nested ones before walking.
    pub dedupe_roots: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("threads", &self.threads)
            .field("skip_hash", &self.skip_hash)
            .field("strict", &self.strict)
            .field("dedupe_roots", &self.dedupe_roots)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the worker pool size (0 = available parallelism).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Skip content hashing and return size groups.
    #[must_use]
    pub fn with_skip_hash(mut self, skip_hash: bool) -> Self {
        self.skip_hash = skip_hash;
        self
    }

    /// Set fail-fast on any per-file error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Deduplicate overlapping roots before walking.
    #[must_use]
    pub fn with_dedupe_roots(mut self, dedupe: bool) -> Self {
        self.dedupe_roots = dedupe;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn phase_start(&self, phase: &str, total: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(phase, total);
        }
    }

    fn phase_end(&self, phase: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(phase);
        }
    }
}

/// Outcome of one worker task.
enum Outcome<T> {
    Done(PathBuf, T),
    Skipped,
    Failed(ScanError),
    Interrupted,
}

/// Statistics from the size phase.
#[derive(Debug, Clone, Default)]
pub struct SizeStats {
    /// Grouping statistics
    pub grouping: GroupingStats,
    /// Discovered entries that were not regular files
    pub non_regular: usize,
    /// Files whose metadata could not be read
    pub errors: Vec<ScanError>,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Query sizes of `paths` on `pool` and group them (Phase 1).
///
/// Sizes are read through symlinks, so a link to a regular file counts as
/// that file. Non-regular files and dangling links are dropped silently.
/// Other metadata failures are returned in [`SizeStats::errors`].
#[must_use]
pub fn phase1_size_groups(
    paths: Vec<PathBuf>,
    pool: &ThreadPool,
    config: &FinderConfig,
) -> (HashMap<u64, Vec<PathBuf>>, SizeStats) {
    let mut stats = SizeStats::default();
    if paths.is_empty() {
        log::debug!("Phase 1: No files to process");
        return (HashMap::new(), stats);
    }

    config.phase_start("sizing", paths.len());
    log::info!("Phase 1: Querying sizes of {} files", paths.len());

    let outcomes: Vec<Outcome<u64>> = pool.install(|| {
        paths
            .into_par_iter()
            .enumerate()
            .map(|(idx, path)| {
                if config.is_shutdown_requested() {
                    return Outcome::Interrupted;
                }
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                }
                size_of(path)
            })
            .collect()
    });

    // Single aggregation point: workers never touch the map.
    let mut grouper = SizeGrouper::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Done(path, size) => {
                if grouper.insert(path, size) {
                    log::trace!("Size {} became a candidate group", size);
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_message(&format!(
                            "{} candidate sizes",
                            grouper.candidate_count()
                        ));
                    }
                }
            }
            Outcome::Skipped => stats.non_regular += 1,
            Outcome::Failed(e) => stats.errors.push(e),
            Outcome::Interrupted => stats.interrupted = true,
        }
    }

    let candidate_sizes = grouper.candidate_count();
    let (groups, grouping) = grouper.into_candidates();
    stats.grouping = grouping;

    config.phase_end("sizing");
    log::info!(
        "Phase 1 complete: {} → {} files in {} size groups ({:.1}% eliminated)",
        stats.grouping.total_files,
        stats.grouping.potential_duplicates,
        candidate_sizes,
        stats.grouping.elimination_rate()
    );

    (groups, stats)
}

/// Size of one discovered path, following symlinks.
fn size_of(path: PathBuf) -> Outcome<u64> {
    match std::fs::metadata(&path) {
        Ok(m) if m.is_file() => Outcome::Done(path, m.len()),
        Ok(_) => {
            log::trace!("Skipping non-regular file: {}", path.display());
            Outcome::Skipped
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && is_dangling_symlink(&path) => {
            log::trace!("Skipping dangling symlink: {}", path.display());
            Outcome::Skipped
        }
        Err(e) => {
            log::warn!("Cannot stat {}: {}", path.display(), e);
            Outcome::Failed(ScanError::from_io(path, e))
        }
    }
}

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Files that entered Phase 2
    pub input_files: usize,
    /// Files successfully hashed
    pub hashed_files: usize,
    /// Total bytes hashed
    pub bytes_hashed: u64,
    /// Files that could not be read
    pub errors: Vec<HashError>,
    /// Confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Duplicate files, excluding one original per group
    pub duplicate_files: usize,
    /// Bytes held by the duplicate copies
    pub wasted_space: u64,
    /// File size of each confirmed duplicate group
    pub group_sizes: HashMap<Digest, u64>,
    /// Whether the phase was interrupted by shutdown
    pub interrupted: bool,
}

/// Digest every file of every candidate group on `pool` (Phase 2).
#[must_use]
pub fn phase2_digest_groups(
    candidates: HashMap<u64, Vec<PathBuf>>,
    hasher: &dyn FileHasher,
    pool: &ThreadPool,
    config: &FinderConfig,
) -> (HashMap<Digest, Vec<PathBuf>>, HashStats) {
    let all_files: Vec<(PathBuf, u64)> = candidates
        .into_iter()
        .flat_map(|(size, files)| files.into_iter().map(move |path| (path, size)))
        .collect();

    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };
    if all_files.is_empty() {
        log::debug!("Phase 2: No files to process");
        return (HashMap::new(), stats);
    }

    config.phase_start("hashing", all_files.len());
    log::info!(
        "Phase 2: Computing {} digests for {} files",
        hasher.name(),
        all_files.len()
    );

    let outcomes: Vec<Outcome<(Digest, u64)>> = pool.install(|| {
        all_files
            .into_par_iter()
            .enumerate()
            .map(|(idx, (path, size))| {
                if config.is_shutdown_requested() {
                    return Outcome::Interrupted;
                }
                if size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({} MB): {}",
                        size / (1024 * 1024),
                        path.display()
                    );
                }
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(idx + 1, path.to_string_lossy().as_ref());
                }

                match hasher.digest(&path) {
                    Ok(digest) => {
                        if let Some(ref callback) = config.progress_callback {
                            callback.on_item_completed(size);
                        }
                        Outcome::Done(path, (digest, size))
                    }
                    Err(HashError::Interrupted(_)) => Outcome::Interrupted,
                    Err(e) => {
                        log::warn!("Failed to hash {}: {}", path.display(), e);
                        Outcome::Failed(ScanError::Hash(e))
                    }
                }
            })
            .collect()
    });

    let mut sizes: HashMap<Digest, u64> = HashMap::new();
    let mut hashed = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Outcome::Done(path, (digest, size)) => {
                stats.hashed_files += 1;
                stats.bytes_hashed += size;
                sizes.entry(digest.clone()).or_insert(size);
                hashed.push((path, digest));
            }
            Outcome::Failed(ScanError::Hash(e)) => stats.errors.push(e),
            Outcome::Failed(_) | Outcome::Skipped => {}
            Outcome::Interrupted => stats.interrupted = true,
        }
    }

    let groups = group_by_digest(hashed);
    stats.duplicate_groups = groups.len();
    for (digest, files) in &groups {
        let copies = files.len() - 1;
        let size = sizes.get(digest).copied().unwrap_or(0);
        stats.duplicate_files += copies;
        stats.wasted_space += size * copies as u64;
        stats.group_sizes.insert(digest.clone(), size);
        log::debug!(
            "Duplicate group {}: {} files of {} bytes",
            digest,
            files.len(),
            size
        );
    }

    config.phase_end("hashing");
    log::info!(
        "Phase 2 complete: {} groups, {} duplicates, {} files skipped",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.errors.len()
    );

    (groups, stats)
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Roots actually walked
    pub roots: Vec<PathBuf>,
    /// Regular files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files that shared a size with another file
    pub candidate_files: usize,
    /// Files whose content was hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of result groups
    pub duplicate_groups: usize,
    /// Files in result groups, excluding one original per group
    pub duplicate_files: usize,
    /// Space held by the duplicate copies
    pub reclaimable_space: u64,
    /// Name of the digest algorithm, `None` when hashing was skipped
    pub hash_algorithm: Option<&'static str>,
    /// File size of each digest group, as measured during the scan
    pub group_sizes: HashMap<Digest, u64>,
    /// Files that were skipped because they could not be read
    pub errors: Vec<ScanError>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether any file was skipped because of an error.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Size of the files in the group with `key`.
    ///
    /// Size keys carry their own size; digest keys are looked up in the
    /// sizes recorded while hashing.
    #[must_use]
    pub fn group_size(&self, key: &GroupKey) -> Option<u64> {
        match key {
            GroupKey::Size(size) => Some(*size),
            GroupKey::Digest(digest) => self.group_sizes.get(digest).copied(),
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        bytesize::ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        bytesize::ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that abort a duplicate search.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// A root directory could not be read.
    #[error("Cannot read root directory {path}: {source}")]
    RootInaccessible {
        /// The root that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The worker pool could not be created.
    #[error("Failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A traversal or metadata error in strict mode.
    #[error(transparent)]
    Scan(ScanError),

    /// A file read error in strict mode.
    #[error(transparent)]
    Hash(HashError),
}

impl From<ScanError> for FinderError {
    fn from(error: ScanError) -> Self {
        match error {
            ScanError::Hash(e) => Self::Hash(e),
            other => Self::Scan(other),
        }
    }
}

/// Duplicate finder that orchestrates the two-phase detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<dyn FileHasher>,
}

impl DuplicateFinder {
    /// Create a finder using the default SHA-256 hasher.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Sha256Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Replace the content hasher.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn FileHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicate files below `roots`.
    ///
    /// Roots are assumed to be existing directories; validating them is
    /// the caller's job. Each call is self-contained.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError`] if a root cannot be read, the worker pool
    /// cannot be built, shutdown is requested, or (in strict mode) any
    /// file cannot be read.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Duplicates, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        let roots = if self.config.dedupe_roots {
            dedupe_roots(roots)
        } else {
            roots.to_vec()
        };
        summary.roots = roots.clone();

        if roots.is_empty() {
            log::warn!("No roots provided for scanning");
            return Ok((self.empty_result(), summary));
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .thread_name(|idx| format!("filedup-worker-{}", idx))
            .build()?;
        log::debug!("Worker pool ready with {} threads", pool.current_num_threads());

        // Walk all roots and collect candidate paths
        self.config.phase_start("walking", 0);
        log::info!("Scanning {} root(s)", roots.len());

        let mut walker = Walker::new(roots, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut paths = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(path) => paths.push(path),
                Err(WalkError::RootUnreadable { path, source }) => {
                    return Err(FinderError::RootInaccessible { path, source });
                }
                Err(WalkError::Entry(e)) => self.record_error(&mut summary, e)?,
            }
        }
        self.config.phase_end("walking");

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Phase 1: Group by size
        let (candidates, size_stats) = phase1_size_groups(paths, &pool, &self.config);
        if size_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        for e in size_stats.errors {
            self.record_error(&mut summary, e)?;
        }

        summary.total_files = size_stats.grouping.total_files;
        summary.total_size = size_stats.grouping.total_size;
        summary.candidate_files = size_stats.grouping.potential_duplicates;

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        if self.config.skip_hash {
            summary.duplicate_groups = candidates.len();
            for (size, files) in &candidates {
                let copies = files.len() - 1;
                summary.duplicate_files += copies;
                summary.reclaimable_space += size * copies as u64;
            }
            summary.scan_duration = start_time.elapsed();
            log::info!(
                "Hashing skipped: {} size groups, {} files",
                summary.duplicate_groups,
                summary.candidate_files
            );
            return Ok((Duplicates::BySize(candidates), summary));
        }

        // Phase 2: Hash candidates
        summary.hash_algorithm = Some(self.hasher.name());
        let (groups, hash_stats) =
            phase2_digest_groups(candidates, self.hasher.as_ref(), &pool, &self.config);
        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        for e in hash_stats.errors {
            self.record_error(&mut summary, ScanError::Hash(e))?;
        }

        summary.hashed_files = hash_stats.hashed_files;
        summary.bytes_hashed = hash_stats.bytes_hashed;
        summary.duplicate_groups = hash_stats.duplicate_groups;
        summary.duplicate_files = hash_stats.duplicate_files;
        summary.reclaimable_space = hash_stats.wasted_space;
        summary.group_sizes = hash_stats.group_sizes;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((Duplicates::ByDigest(groups), summary))
    }

    fn empty_result(&self) -> Duplicates {
        if self.config.skip_hash {
            Duplicates::BySize(HashMap::new())
        } else {
            Duplicates::ByDigest(HashMap::new())
        }
    }

    /// Skip-and-report, or fail fast in strict mode.
    fn record_error(&self, summary: &mut ScanSummary, error: ScanError) -> Result<(), FinderError> {
        if self.config.strict {
            return Err(error.into());
        }
        summary.errors.push(error);
        Ok(())
    }
}

/// Find duplicate files below `roots` with default settings.
///
/// When `skip_hash` is true the result holds size-collision groups keyed by
/// size; otherwise it holds confirmed duplicates keyed by the digest that
/// `hasher` produced. Unreadable files are skipped.
///
/// # Errors
///
/// See [`DuplicateFinder::find_duplicates`].
///
/// # Example
///
/// ```no_run
/// use filedup::duplicates::find_duplicates;
/// use filedup::scanner::Sha256Hasher;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// let dups = find_duplicates(&[PathBuf::from(".")], false, Arc::new(Sha256Hasher::new())).unwrap();
/// println!("{} duplicate groups", dups.len());
/// ```
pub fn find_duplicates(
    roots: &[PathBuf],
    skip_hash: bool,
    hasher: Arc<dyn FileHasher>,
) -> Result<Duplicates, FinderError> {
    let finder = DuplicateFinder::new(FinderConfig::default().with_skip_hash(skip_hash))
        .with_hasher(hasher);
    finder.find_duplicates(roots).map(|(dups, _)| dups)
}
