//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for enumerating every
//! non-directory entry reachable from a set of roots. Roots are walked in
//! the order given and are not deduplicated here; see
//! [`dedupe_roots`](super::dedupe_roots) for that.
//!
//! The walker only discovers paths. Sizes are queried afterwards by the
//! finder's worker pool, which is also where special files and dangling
//! symlinks are dropped. Symlinks are always yielded; `follow_symlinks`
//! only decides whether symlinked directories are descended into.
//!
//! # Example
//!
//! ```no_run
//! use filedup::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/home/user/Downloads"), PathBuf::from("/tmp")];
//! let walker = Walker::new(roots, WalkerConfig::default());
//! let paths: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Discovered {} entries", paths.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use jwalk::WalkDir;

use super::{ScanError, WalkerConfig};
use crate::progress::ProgressCallback;

/// An entry produced by [`Walker::walk`].
pub type WalkResult = Result<PathBuf, WalkError>;

/// A traversal failure, split by whether the whole run can survive it.
#[derive(thiserror::Error, Debug)]
pub enum WalkError {
    /// A root directory could not be read at all.
    #[error("Cannot read root directory {path}: {source}")]
    RootUnreadable {
        /// The root that failed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A single entry below a root could not be read.
    #[error(transparent)]
    Entry(#[from] ScanError),
}

/// Directory walker for parallel file discovery across several roots.
pub struct Walker {
    /// Root paths to walk, in caller order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("roots", &self.roots)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given roots.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots,
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, yielding candidate file paths.
    ///
    /// Directories are never yielded. Unreadable entries come back as
    /// [`WalkError::Entry`]; a root that cannot be opened comes back as
    /// [`WalkError::RootUnreadable`].
    pub fn walk(&self) -> impl Iterator<Item = WalkResult> + '_ {
        let mut discovered = 0usize;
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root))
            .inspect(move |entry| {
                if let (Ok(path), Some(callback)) = (entry, &self.progress_callback) {
                    discovered += 1;
                    callback.on_progress(discovered, path.to_string_lossy().as_ref());
                }
            })
    }

    fn walk_root<'a>(&'a self, root: &'a Path) -> Box<dyn Iterator<Item = WalkResult> + 'a> {
        if let Err(source) = std::fs::read_dir(root) {
            log::error!("Cannot read root {}: {}", root.display(), source);
            return Box::new(std::iter::once(Err(WalkError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })));
        }

        log::debug!("Walking root {}", root.display());

        let walk_dir = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(false)
            .sort(true);

        Box::new(walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    if entry.file_type().is_dir() {
                        return None;
                    }
                    Some(Ok(entry.path()))
                }
                Err(e) if e.path().is_some_and(is_dangling_symlink) => {
                    log::trace!("Skipping dangling symlink: {}", e);
                    None
                }
                Err(e) => Some(Err(self.convert_jwalk_error(root, e))),
            }
        }))
    }

    fn convert_jwalk_error(&self, root: &Path, error: jwalk::Error) -> WalkError {
        let path = error
            .path()
            .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        let kind = error
            .io_error()
            .map_or(std::io::ErrorKind::Other, std::io::Error::kind);
        let io_error = std::io::Error::new(kind, error.to_string());

        if path == root {
            log::error!("Walker error on root {}: {}", path.display(), error);
            return WalkError::RootUnreadable {
                path,
                source: io_error,
            };
        }

        log::warn!("Walker error for {}: {}", path.display(), error);
        WalkError::Entry(ScanError::from_io(path, io_error))
    }
}

/// Whether `path` is a symlink whose target does not exist.
pub(crate) fn is_dangling_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
        && !path.exists()
}
