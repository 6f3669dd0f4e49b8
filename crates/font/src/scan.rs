//! Filesystem scan for candidate font files.
//!
//! Files qualify by name keyword, then split into two buckets by
//! extension. The bucket split is load-bearing: every directly-usable
//! file (.ttf/.otf) is tried before any collection file (.ttc),
//! regardless of which search root it came from.

use std::fs;
use std::path::{Path, PathBuf};

/// Qualifying font files, bucketed by format.
#[derive(Debug, Default)]
pub struct ScanHits {
    /// Single-program files (.ttf/.otf), in traversal order.
    pub direct: Vec<PathBuf>,
    /// Collection files (.ttc), in traversal order.
    pub collections: Vec<PathBuf>,
}

impl ScanHits {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.collections.is_empty()
    }

    pub fn total(&self) -> usize {
        self.direct.len() + self.collections.len()
    }
}

/// Recursively walk `roots` collecting font files whose lowercased
/// file name contains at least one of `keywords`. Missing or
/// unreadable roots are skipped. Entries are visited in sorted order
/// so repeated scans of an unchanged tree yield identical results.
pub fn scan_font_files(roots: &[PathBuf], keywords: &[String]) -> ScanHits {
    let mut hits = ScanHits::default();
    for root in roots {
        if !root.is_dir() {
            continue;
        }
        walk(root, keywords, &mut hits);
    }
    hits
}

fn walk(dir: &Path, keywords: &[String], hits: &mut ScanHits) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if path.is_dir() {
            walk(&path, keywords, hits);
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let lower = name.to_ascii_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        if is_direct_format(&path) {
            hits.direct.push(path);
        } else if is_collection_format(&path) {
            hits.collections.push(path);
        }
    }
}

/// True for single-program formats safe as a global family default.
pub(crate) fn is_direct_format(path: &Path) -> bool {
    matches!(ext_lower(path).as_deref(), Some("ttf") | Some("otf"))
}

/// True for collection files that need a per-element font handle.
pub(crate) fn is_collection_format(path: &Path) -> bool {
    ext_lower(path).as_deref() == Some("ttc")
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
