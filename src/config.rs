//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. Environment variables prefixed with `FILEDUP_` (e.g. `FILEDUP_THREADS=8`)
//! 4. Command-line flags ([`Config::apply_cli`])
//!
//! A missing default config file is ignored; a file that exists but does not
//! parse is an error.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::FinderConfig;
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FILEDUP_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Worker threads; 0 uses the available parallelism.
    pub threads: usize,
    /// Digest algorithm.
    pub algorithm: HashAlgorithm,
    /// Report size groups without hashing.
    pub skip_hash: bool,
    /// Descend into symlinked directories.
    pub follow_symlinks: bool,
    /// Drop repeated and nested roots.
    pub dedupe_roots: bool,
    /// Abort on the first unreadable file.
    pub strict: bool,
    /// Result format.
    pub output: OutputFormat,
    /// Show progress bars.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 0,
            algorithm: HashAlgorithm::Sha256,
            skip_hash: false,
            follow_symlinks: false,
            dedupe_roots: false,
            strict: false,
            output: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from defaults, file and environment.
    ///
    /// `path` overrides the platform default location and must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or if any layer
    /// fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => {
                if !p.is_file() {
                    anyhow::bail!("Config file not found: {}", p.display());
                }
                Some(p.to_path_buf())
            }
            None => Self::config_path().filter(|p| p.is_file()),
        };

        if let Some(ref f) = file {
            log::debug!("Loading config from {}", f.display());
        }

        Self::figment(file.as_deref())
            .extract()
            .context("Invalid configuration")
    }

    /// Build the figment chain without extracting it.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "filedup").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay command-line flags.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        self.skip_hash |= cli.skip_hash;
        self.follow_symlinks |= cli.follow_symlinks;
        self.dedupe_roots |= cli.dedupe_roots;
        self.strict |= cli.strict;
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Whether progress bars should be drawn.
    ///
    /// JSON output keeps stderr quiet so it can be piped alongside.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.progress && self.output == OutputFormat::Text
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_threads(self.threads)
            .with_skip_hash(self.skip_hash)
            .with_strict(self.strict)
            .with_dedupe_roots(self.dedupe_roots)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks))
    }
}
