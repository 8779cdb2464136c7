//! Streaming file hashers.
//!
//! # Overview
//! Every backend implements [`FileHasher`], which maps a file path to a
//! hex-encoded [`Digest`]. Content is read in [`CHUNK_SIZE`] pieces so memory
//! use stays flat regardless of file size.
//!
//! Closures with the signature `Fn(&Path) -> Result<Digest, HashError>` are
//! hashers too, which keeps the grouping logic testable with cheap stubs.
//!
//! # Example
//!
//! ```no_run
//! use filedup::scanner::{FileHasher, Sha256Hasher};
//! use std::path::Path;
//!
//! let hasher = Sha256Hasher::new();
//! let digest = hasher.digest(Path::new("Cargo.toml")).unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::Digest as _;

use super::HashError;

/// Read buffer size used when streaming file content.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded content digest.
pub type Digest = String;

/// Maps a file path to a content digest.
pub trait FileHasher: Send + Sync {
    /// Compute the digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    fn digest(&self, path: &Path) -> Result<Digest, HashError>;

    /// Short name of the algorithm, used in logs and JSON output.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> FileHasher for F
where
    F: Fn(&Path) -> Result<Digest, HashError> + Send + Sync,
{
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        self(path)
    }
}

/// Supported built-in digest algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256 (256-bit, collision resistant)
    #[default]
    Sha256,
    /// BLAKE3 (256-bit, considerably faster)
    Blake3,
}

impl HashAlgorithm {
    /// Build the hasher for this algorithm.
    #[must_use]
    pub fn hasher(self, shutdown_flag: Option<Arc<AtomicBool>>) -> Arc<dyn FileHasher> {
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256Hasher::new();
                if let Some(flag) = shutdown_flag {
                    hasher = hasher.with_shutdown_flag(flag);
                }
                Arc::new(hasher)
            }
            Self::Blake3 => {
                let mut hasher = Blake3Hasher::new();
                if let Some(flag) = shutdown_flag {
                    hasher = hasher.with_shutdown_flag(flag);
                }
                Arc::new(hasher)
            }
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// Feed a file through `update` chunk by chunk.
fn stream_file(
    path: &Path,
    shutdown_flag: Option<&AtomicBool>,
    mut update: impl FnMut(&[u8]),
) -> Result<(), HashError> {
    let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        if shutdown_flag.is_some_and(|f| f.load(Ordering::SeqCst)) {
            return Err(HashError::Interrupted(path.to_path_buf()));
        }
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::from_io(path, e)),
        };
        update(&buffer[..read]);
    }
    Ok(())
}

/// SHA-256 file hasher, the default backend.
#[derive(Debug, Clone, Default)]
pub struct Sha256Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Sha256Hasher {
    /// Create a new SHA-256 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-flight reads once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

impl FileHasher for Sha256Hasher {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let mut hasher = sha2::Sha256::new();
        stream_file(path, self.shutdown_flag.as_deref(), |chunk| {
            hasher.update(chunk);
        })?;
        Ok(format!("{:x}", hasher.finalize()))
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}

/// BLAKE3 file hasher.
#[derive(Debug, Clone, Default)]
pub struct Blake3Hasher {
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Blake3Hasher {
    /// Create a new BLAKE3 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort in-flight reads once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

impl FileHasher for Blake3Hasher {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let mut hasher = blake3::Hasher::new();
        stream_file(path, self.shutdown_flag.as_deref(), |chunk| {
            hasher.update(chunk);
        })?;
        Ok(hasher.finalize().to_hex().to_string())
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}
