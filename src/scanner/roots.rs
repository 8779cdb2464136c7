//! Root directory handling.
//!
//! By default the finder walks roots exactly as given, so a root nested
//! inside another root has its files discovered once per root. When root
//! deduplication is enabled, [`dedupe_roots`] canonicalises the roots and
//! drops repeats and nested roots before traversal.

use std::path::PathBuf;

/// Canonicalise `roots`, dropping exact repeats and roots nested in another root.
///
/// The order of the surviving roots follows their first appearance. Roots
/// that cannot be canonicalised are kept as given and logged, so the walk
/// can still report them.
///
/// # Example
///
/// ```no_run
/// use filedup::scanner::dedupe_roots;
/// use std::path::PathBuf;
///
/// let roots = dedupe_roots(&[PathBuf::from("/data"), PathBuf::from("/data/photos")]);
/// assert_eq!(roots, vec![PathBuf::from("/data")]);
/// ```
#[must_use]
pub fn dedupe_roots(roots: &[PathBuf]) -> Vec<PathBuf> {
    let canonical: Vec<PathBuf> = roots
        .iter()
        .map(|root| match root.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Cannot canonicalize {}: {}", root.display(), e);
                root.clone()
            }
        })
        .collect();

    let mut kept: Vec<PathBuf> = Vec::with_capacity(canonical.len());
    for (idx, root) in canonical.iter().enumerate() {
        if kept.contains(root) {
            log::debug!("Dropping repeated root {}", root.display());
            continue;
        }
        let nested = canonical
            .iter()
            .enumerate()
            .any(|(other_idx, other)| other_idx != idx && other != root && root.starts_with(other));
        if nested {
            log::info!(
                "Dropping root {} because it is inside another root",
                root.display()
            );
            continue;
        }
        kept.push(root.clone());
    }
    kept
}
