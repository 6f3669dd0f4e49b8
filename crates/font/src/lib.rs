//! CJK font discovery and configuration.
//!
//! Chart text on a bare host renders CJK glyphs as empty boxes unless a
//! CJK-capable font is found and wired in. This crate locates one:
//! first among the fonts already in the process font index, then by
//! scanning the usual font directories. Single-program formats
//! (.ttf/.otf) are preferred because they can back a global family
//! chain; collection files (.ttc) are a last resort that must be
//! referenced per text element through a [`FontHandle`].
//!
//! ```no_run
//! use reportkit_font::{ResolveRequest, Resolver};
//!
//! let mut resolver = Resolver::new();
//! let resolution = resolver.resolve(&ResolveRequest::default());
//! match &resolution.font {
//!     Some(font) => println!("using {}", font.name),
//!     None => eprintln!("{}", resolution.hint.as_deref().unwrap_or("")),
//! }
//! ```
//!
//! "Not found" is a normal outcome, reported through the resolution,
//! never an error. Per-file parse failures are recorded in the attempt
//! log and skipped.

mod diagnose;
mod hint;
mod loader;
mod resolver;
mod scan;

pub use diagnose::{AttemptReport, DiagnosticReport, IndexedFamily};
pub use hint::install_hint;
pub use loader::{FontLoader, LoadError, LoadedFace, TtfLoader};
pub use resolver::{
    Attempt, FontHandle, FontKind, RenderSettings, ResolveRequest, Resolution, ResolvedFont,
    Resolver,
};
pub use scan::{scan_font_files, ScanHits};

use std::path::PathBuf;

/// Known-good CJK families, in priority order.
pub const DEFAULT_CANDIDATES: &[&str] = &[
    "Noto Sans CJK SC",
    "Noto Sans SC",
    "Source Han Sans SC",
    "WenQuanYi Micro Hei",
    "WenQuanYi Zen Hei",
    "Droid Sans Fallback",
    "AR PL UMing CN",
    "SimHei",
    "Microsoft YaHei",
    "PingFang SC",
    "STHeiti",
    "Hiragino Sans GB",
];

/// Substrings that mark a font file name as a likely CJK font.
pub const FILE_KEYWORDS: &[&str] = &[
    "noto", "cjk", "hei", "han", "wenquan", "droid", "source", "fang", "song", "ming", "yahei",
];

/// Built-in font search roots: system directories, the user's font
/// directories, and a project-local `fonts/` directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
    ];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".local/share/fonts"));
        paths.push(home.join(".fonts"));
    }
    paths.push(PathBuf::from("fonts"));
    paths
}
