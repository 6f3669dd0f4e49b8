//! Environment diagnostics for CJK font availability.
//!
//! Answers "why are my chart labels boxes" in one pass: what the font
//! index already knows, what qualifying files exist on disk, and what
//! the resolution procedure actually selects.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::resolver::{ResolveRequest, ResolvedFont, Resolver};
use crate::scan::{is_collection_format, scan_font_files};

/// A family present in the font index, with its backing file.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedFamily {
    pub name: String,
    pub path: PathBuf,
    /// Appears in the request's candidate list.
    pub candidate: bool,
    /// Backed by a collection file.
    pub collection: bool,
}

/// One scan attempt, flattened for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub path: PathBuf,
    pub family: Option<String>,
    pub error: Option<String>,
}

/// Full availability report.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// CJK-relevant families already in the index, sorted by name.
    pub indexed: Vec<IndexedFamily>,
    /// Qualifying direct-format files on disk.
    pub disk_direct: Vec<PathBuf>,
    /// Qualifying collection files on disk.
    pub disk_collections: Vec<PathBuf>,
    /// Files tried during resolution, in order.
    pub attempts: Vec<AttemptReport>,
    /// The selected font, if any.
    pub font: Option<ResolvedFont>,
    /// Whether per-element handles are required.
    pub collection_mode: bool,
    /// Install suggestion, present when nothing was selected.
    pub hint: Option<String>,
}

/// Family-name markers beyond the file-name keywords; index entries
/// often use region tags rather than vendor names.
const EXTRA_MARKERS: &[&str] = &["cjk", "chinese", "sc", "tc", "jp", "kr"];

fn is_cjk_relevant(name_lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| name_lower.contains(k.as_str()))
        || EXTRA_MARKERS.iter().any(|m| name_lower.contains(m))
}

impl Resolver {
    /// Produce a [`DiagnosticReport`] for the given request. Runs the
    /// resolution procedure as its final step, so the resolver is left
    /// configured exactly as a plain [`Resolver::resolve`] would leave it.
    pub fn diagnose(&mut self, req: &ResolveRequest) -> DiagnosticReport {
        let mut families: BTreeMap<String, (PathBuf, bool)> = BTreeMap::new();
        for face in self.db().faces() {
            let path = match &face.source {
                fontdb::Source::File(p) => p.clone(),
                fontdb::Source::SharedFile(p, _) => p.clone(),
                fontdb::Source::Binary(_) => continue,
            };
            for (family, _) in &face.families {
                if !is_cjk_relevant(&family.to_lowercase(), &req.keywords) {
                    continue;
                }
                let collection = is_collection_format(&path);
                families
                    .entry(family.clone())
                    .or_insert_with(|| (path.clone(), collection));
            }
        }
        let indexed = families
            .into_iter()
            .map(|(name, (path, collection))| IndexedFamily {
                candidate: req.candidates.iter().any(|c| c == &name),
                name,
                path,
                collection,
            })
            .collect();

        let mut roots = req.roots.clone();
        roots.extend(req.extra_paths.iter().cloned());
        let hits = scan_font_files(&roots, &req.keywords);

        let resolution = self.resolve(req);
        let attempts = resolution
            .attempts
            .iter()
            .map(|a| AttemptReport {
                path: a.path.clone(),
                family: a.outcome.as_ref().ok().cloned(),
                error: a.outcome.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        DiagnosticReport {
            indexed,
            disk_direct: hits.direct,
            disk_collections: hits.collections,
            attempts,
            font: resolution.font,
            collection_mode: self.is_collection_mode(),
            hint: resolution.hint,
        }
    }
}
