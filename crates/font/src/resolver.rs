//! The font resolution procedure.
//!
//! Strictly ordered and short-circuiting: fonts already in the index
//! are cheapest (no extra indirection), so they win over anything on
//! disk; among disk hits every direct-format file is tried before any
//! collection file. The selected font travels as an explicit
//! [`Resolution`] value; there is no process-global state, and a
//! second `Resolver` is completely independent of the first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::hint::install_hint;
use crate::loader::{FontLoader, LoadError, TtfLoader};
use crate::scan::{is_direct_format, scan_font_files};
use crate::{default_search_paths, DEFAULT_CANDIDATES, FILE_KEYWORDS};

/// How a selected font file can be wired into text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FontKind {
    /// Single font program (.ttf/.otf), safe as a global family default.
    Direct,
    /// Collection file (.ttc); must be referenced per text element.
    Collection,
}

/// Inputs to one resolution pass.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Preferred family names, earlier = preferred.
    pub candidates: Vec<String>,
    /// Search roots for the filesystem scan.
    pub roots: Vec<PathBuf>,
    /// Extra directories appended after `roots`.
    pub extra_paths: Vec<PathBuf>,
    /// Substrings a file name must contain to qualify for the scan.
    pub keywords: Vec<String>,
}

impl Default for ResolveRequest {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            roots: default_search_paths(),
            extra_paths: Vec::new(),
            keywords: FILE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The selected font. `name` and `path` always travel together; the
/// absence of a selection is the absence of the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedFont {
    pub name: String,
    pub path: PathBuf,
    pub kind: FontKind,
}

impl ResolvedFont {
    /// Rendering configuration for this font, to be threaded into
    /// chart code by the caller. For collection files the family
    /// chain may not take effect; use [`Resolver::font_handle`]
    /// per text element instead.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            family_chain: vec![
                self.name.clone(),
                "DejaVu Sans".to_string(),
                "sans-serif".to_string(),
            ],
            ascii_minus: true,
        }
    }
}

/// Explicit replacement for process-global rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSettings {
    /// Family fallback chain for sans-serif text.
    pub family_chain: Vec<String>,
    /// Render minus signs as ASCII hyphen-minus; U+2212 is missing
    /// from most CJK fonts and would show as a box.
    pub ascii_minus: bool,
}

/// Font reference bound to a file path, for per-element use. The only
/// reliable rendering path for collection files; harmless for the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FontHandle {
    /// Backing file, if a font is selected.
    pub path: Option<PathBuf>,
    /// Face index within the file.
    pub index: u32,
}

impl FontHandle {
    pub fn is_bound(&self) -> bool {
        self.path.is_some()
    }
}

/// One register-and-name attempt from the filesystem scan.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub path: PathBuf,
    pub kind: FontKind,
    pub outcome: Result<String, LoadError>,
}

/// Outcome of one resolution pass.
#[derive(Debug)]
pub struct Resolution {
    /// The selected font, if any.
    pub font: Option<ResolvedFont>,
    /// Every file tried during the scan, in order, with outcomes.
    /// Empty when the index lookup short-circuited.
    pub attempts: Vec<Attempt>,
    /// Install suggestion, present exactly when `font` is absent.
    pub hint: Option<String>,
}

impl Resolution {
    pub fn font_name(&self) -> Option<&str> {
        self.font.as_ref().map(|f| f.name.as_str())
    }

    pub fn settings(&self) -> Option<RenderSettings> {
        self.font.as_ref().map(|f| f.render_settings())
    }
}

/// Resolves and holds the selected CJK font for one call site.
pub struct Resolver {
    db: fontdb::Database,
    loader: Box<dyn FontLoader>,
    selected: Option<ResolvedFont>,
}

impl Resolver {
    /// Resolver over the system font index.
    pub fn new() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        Self {
            db,
            loader: Box::new(TtfLoader),
            selected: None,
        }
    }

    /// Resolver with an empty index and a custom loader. The seam for
    /// tests and for embedders that manage their own font parsing.
    pub fn with_loader(loader: Box<dyn FontLoader>) -> Self {
        Self {
            db: fontdb::Database::new(),
            loader,
            selected: None,
        }
    }

    /// Run the resolution procedure. Short-circuits at the first
    /// success; "nothing found" is a normal outcome carrying an
    /// install hint, never an error.
    pub fn resolve(&mut self, req: &ResolveRequest) -> Resolution {
        // Already-indexed fonts in a directly-usable format.
        let available = self.indexed_direct_families();
        if let Some((name, path)) = pick_candidate(&available, &req.candidates) {
            let font = ResolvedFont {
                name: name.to_string(),
                path: path.to_path_buf(),
                kind: FontKind::Direct,
            };
            log::info!("CJK font configured from index: {}", font.name);
            self.selected = Some(font.clone());
            return Resolution {
                font: Some(font),
                attempts: Vec::new(),
                hint: None,
            };
        }

        // Scan the filesystem: direct formats before collections.
        let mut roots = req.roots.clone();
        roots.extend(req.extra_paths.iter().cloned());
        let hits = scan_font_files(&roots, &req.keywords);

        let mut attempts = Vec::new();
        let buckets = [
            (&hits.direct, FontKind::Direct),
            (&hits.collections, FontKind::Collection),
        ];
        for (paths, kind) in buckets {
            for path in paths {
                match self.loader.load(path) {
                    Ok(face) => {
                        // Register with the index so later lookups see it.
                        let _ = self.db.load_font_file(path);
                        attempts.push(Attempt {
                            path: path.clone(),
                            kind,
                            outcome: Ok(face.family.clone()),
                        });
                        let font = ResolvedFont {
                            name: face.family,
                            path: path.clone(),
                            kind,
                        };
                        if kind == FontKind::Collection {
                            log::warn!(
                                "{} is a font collection; the family chain may not take effect, pass the font handle to each text element",
                                path.display()
                            );
                        }
                        log::info!(
                            "CJK font configured from scan: {} ({})",
                            font.name,
                            path.display()
                        );
                        self.selected = Some(font.clone());
                        return Resolution {
                            font: Some(font),
                            attempts,
                            hint: None,
                        };
                    }
                    Err(err) => {
                        attempts.push(Attempt {
                            path: path.clone(),
                            kind,
                            outcome: Err(err),
                        });
                    }
                }
            }
        }

        log::warn!("no usable CJK font found; CJK text will render as boxes");
        Resolution {
            font: None,
            attempts,
            hint: Some(install_hint()),
        }
    }

    /// Handle bound to the selected font file, or a default handle if
    /// nothing is selected. Pass this to individual text elements when
    /// [`Resolver::is_collection_mode`] is true.
    pub fn font_handle(&self) -> FontHandle {
        FontHandle {
            path: self.selected.as_ref().map(|f| f.path.clone()),
            index: 0,
        }
    }

    /// True iff the last successful resolution selected a collection
    /// file, meaning the family chain alone cannot be trusted.
    pub fn is_collection_mode(&self) -> bool {
        matches!(
            self.selected,
            Some(ResolvedFont {
                kind: FontKind::Collection,
                ..
            })
        )
    }

    /// The currently selected font, if any.
    pub fn selected(&self) -> Option<&ResolvedFont> {
        self.selected.as_ref()
    }

    pub(crate) fn db(&self) -> &fontdb::Database {
        &self.db
    }

    /// Family-name → backing-file map over indexed faces whose file is
    /// in a directly-usable format.
    fn indexed_direct_families(&self) -> BTreeMap<String, PathBuf> {
        let mut map = BTreeMap::new();
        for face in self.db.faces() {
            let path = match &face.source {
                fontdb::Source::File(p) => p.clone(),
                fontdb::Source::SharedFile(p, _) => p.clone(),
                fontdb::Source::Binary(_) => continue,
            };
            if !is_direct_format(&path) {
                continue;
            }
            for (family, _) in &face.families {
                map.entry(family.clone()).or_insert_with(|| path.clone());
            }
        }
        map
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// First candidate (in priority order) present in the map.
pub(crate) fn pick_candidate<'a>(
    available: &'a BTreeMap<String, PathBuf>,
    candidates: &[String],
) -> Option<(&'a str, &'a Path)> {
    for name in candidates {
        if let Some((name, path)) = available.get_key_value(name) {
            return Some((name.as_str(), path.as_path()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Deterministic loader: knows a fixed path → family mapping,
    /// rejects everything else as unparseable.
    struct StubLoader {
        names: HashMap<PathBuf, String>,
    }

    impl StubLoader {
        fn new(entries: &[(&Path, &str)]) -> Box<Self> {
            Box::new(Self {
                names: entries
                    .iter()
                    .map(|(p, n)| (p.to_path_buf(), n.to_string()))
                    .collect(),
            })
        }
    }

    impl FontLoader for StubLoader {
        fn load(&mut self, path: &Path) -> Result<crate::LoadedFace, LoadError> {
            match self.names.get(path) {
                Some(family) => Ok(crate::LoadedFace {
                    family: family.clone(),
                }),
                None => Err(LoadError::Parse("unknown fixture".into())),
            }
        }
    }

    fn request_for(dir: &Path) -> ResolveRequest {
        ResolveRequest {
            roots: vec![dir.to_path_buf()],
            ..ResolveRequest::default()
        }
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn candidate_lookup_returns_first_present() {
        let mut available = BTreeMap::new();
        available.insert("FontB".to_string(), PathBuf::from("/fonts/b.otf"));

        let candidates = vec!["FontA".to_string(), "FontB".to_string()];
        let (name, path) = pick_candidate(&available, &candidates).unwrap();
        assert_eq!(name, "FontB");
        assert_eq!(path, Path::new("/fonts/b.otf"));
    }

    #[test]
    fn candidate_priority_is_list_order() {
        let mut available = BTreeMap::new();
        available.insert("FontA".to_string(), PathBuf::from("/fonts/a.ttf"));
        available.insert("FontB".to_string(), PathBuf::from("/fonts/b.otf"));

        let candidates = vec!["FontB".to_string(), "FontA".to_string()];
        let (name, _) = pick_candidate(&available, &candidates).unwrap();
        assert_eq!(name, "FontB");
    }

    #[test]
    fn candidate_lookup_never_invents_names() {
        let available = BTreeMap::new();
        let candidates = vec!["FontA".to_string()];
        assert!(pick_candidate(&available, &candidates).is_none());
    }

    #[test]
    fn direct_file_wins_over_collection() {
        let dir = tempfile::tempdir().unwrap();
        let ttf = dir.path().join("noto-cjk.ttf");
        let ttc = dir.path().join("han-serif.ttc");
        touch(&ttf);
        touch(&ttc);

        let loader = StubLoader::new(&[(&ttf, "Noto Sans CJK SC"), (&ttc, "Han Serif")]);
        let mut resolver = Resolver::with_loader(loader);
        let resolution = resolver.resolve(&request_for(dir.path()));

        assert_eq!(resolution.font_name(), Some("Noto Sans CJK SC"));
        assert!(!resolver.is_collection_mode());
        // The direct bucket succeeded, so the collection bucket was
        // never consulted.
        assert!(resolution
            .attempts
            .iter()
            .all(|a| a.kind == FontKind::Direct));
    }

    #[test]
    fn collection_only_sets_collection_mode() {
        let dir = tempfile::tempdir().unwrap();
        let ttc = dir.path().join("wenquan.ttc");
        touch(&ttc);

        let loader = StubLoader::new(&[(&ttc, "WenQuanYi Micro Hei")]);
        let mut resolver = Resolver::with_loader(loader);
        let resolution = resolver.resolve(&request_for(dir.path()));

        assert_eq!(resolution.font_name(), Some("WenQuanYi Micro Hei"));
        assert!(resolver.is_collection_mode());
        assert!(resolver.font_handle().is_bound());
        assert_eq!(resolver.font_handle().path.as_deref(), Some(ttc.as_path()));
    }

    #[test]
    fn unparseable_files_are_skipped_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let bad_ttf = dir.path().join("noto-broken.ttf");
        let good_ttf = dir.path().join("source-han.ttf");
        touch(&bad_ttf);
        touch(&good_ttf);

        let loader = StubLoader::new(&[(&good_ttf, "Source Han Sans SC")]);
        let mut resolver = Resolver::with_loader(loader);
        let resolution = resolver.resolve(&request_for(dir.path()));

        assert_eq!(resolution.font_name(), Some("Source Han Sans SC"));
        assert_eq!(resolution.attempts.len(), 2);
        assert!(resolution.attempts[0].outcome.is_err());
        assert_eq!(resolution.attempts[0].path, bad_ttf);
        assert!(resolution.attempts[1].outcome.is_ok());
    }

    #[test]
    fn nothing_found_reports_hint_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("noto-corrupt.ttf");
        touch(&bad);

        let loader = StubLoader::new(&[]);
        let mut resolver = Resolver::with_loader(loader);
        let resolution = resolver.resolve(&request_for(dir.path()));

        assert!(resolution.font.is_none());
        assert!(!resolution.hint.as_deref().unwrap_or("").is_empty());
        assert_eq!(resolution.attempts.len(), 1);
        assert!(!resolver.font_handle().is_bound());
        assert!(!resolver.is_collection_mode());
    }

    #[test]
    fn resolve_is_idempotent_for_unchanged_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let ttc = dir.path().join("fangsong.ttc");
        touch(&ttc);

        let loader = StubLoader::new(&[(&ttc, "FangSong")]);
        let mut resolver = Resolver::with_loader(loader);
        let req = request_for(dir.path());

        let first = resolver.resolve(&req);
        let second = resolver.resolve(&req);
        assert_eq!(first.font, second.font);
        assert!(resolver.is_collection_mode());
    }

    #[test]
    fn render_settings_chain_starts_with_selected_family() {
        let font = ResolvedFont {
            name: "Noto Sans SC".to_string(),
            path: PathBuf::from("/fonts/noto.otf"),
            kind: FontKind::Direct,
        };
        let settings = font.render_settings();
        assert_eq!(settings.family_chain[0], "Noto Sans SC");
        assert_eq!(settings.family_chain.last().map(String::as_str), Some("sans-serif"));
        assert!(settings.ascii_minus);
    }

    #[test]
    fn default_handle_is_unbound() {
        assert!(!FontHandle::default().is_bound());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn name_strategy() -> impl Strategy<Value = String> {
            prop::sample::select(vec![
                "FontA".to_string(),
                "FontB".to_string(),
                "FontC".to_string(),
                "FontD".to_string(),
            ])
        }

        proptest! {
            // Whatever the map contents, the pick is always the first
            // candidate that is actually present, never an absent name.
            #[test]
            fn pick_is_first_present_candidate(
                candidates in prop::collection::vec(name_strategy(), 0..6),
                present in prop::collection::btree_set(name_strategy(), 0..4),
            ) {
                let available: BTreeMap<String, PathBuf> = present
                    .iter()
                    .map(|n| (n.clone(), PathBuf::from(format!("/fonts/{}.ttf", n))))
                    .collect();

                let picked = pick_candidate(&available, &candidates).map(|(n, _)| n.to_string());
                let expected = candidates.iter().find(|c| available.contains_key(*c)).cloned();
                prop_assert_eq!(picked, expected);
            }
        }
    }
}
