//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Content digest comparison (Phase 2)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    find_duplicates, phase1_size_groups, phase2_digest_groups, DuplicateFinder, FinderConfig,
    FinderError, HashStats, ScanSummary, SizeStats,
};
pub use groups::{
    group_by_digest, group_by_size, Duplicates, GroupKey, GroupingStats, SizeGrouper,
};
