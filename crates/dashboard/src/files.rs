//! Request-path to filesystem mapping.
//!
//! `.` and `..` components are dropped rather than resolved, so a
//! mapped path can never escape the served root.

use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped when emitting hrefs in directory listings.
const HREF_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#');

/// Outcome of mapping a request target onto the served tree.
#[derive(Debug, PartialEq)]
pub enum ResolvedPath {
    /// Serve this file.
    File(PathBuf),
    /// Serve this generated directory listing.
    Listing(String),
    /// Redirect to this location (directory missing its slash).
    Redirect(String),
    NotFound,
    BadRequest,
}

/// Map a request target (percent-encoded, possibly carrying a query
/// string) onto the root. Directories prefer `index.html`/`index.htm`
/// over a generated listing.
pub fn resolve_path(root: &Path, target: &str) -> ResolvedPath {
    let path_part = target.split(['?', '#']).next().unwrap_or("");
    let Ok(decoded) = percent_decode_str(path_part).decode_utf8() else {
        return ResolvedPath::BadRequest;
    };
    if decoded.contains('\0') {
        return ResolvedPath::BadRequest;
    }

    let trailing_slash = decoded.ends_with('/');
    let mut fs_path = root.to_path_buf();
    for component in Path::new(decoded.as_ref()).components() {
        if let Component::Normal(part) = component {
            fs_path.push(part);
        }
    }

    if fs_path.is_dir() {
        if !trailing_slash {
            return ResolvedPath::Redirect(format!("{}/", path_part));
        }
        for index in ["index.html", "index.htm"] {
            let candidate = fs_path.join(index);
            if candidate.is_file() {
                return ResolvedPath::File(candidate);
            }
        }
        return match directory_listing(&fs_path, &decoded) {
            Some(html) => ResolvedPath::Listing(html),
            None => ResolvedPath::NotFound,
        };
    }
    if fs_path.is_file() {
        return ResolvedPath::File(fs_path);
    }
    ResolvedPath::NotFound
}

fn directory_listing(dir: &Path, display_path: &str) -> Option<String> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| {
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.path().is_dir() {
                name.push('/');
            }
            name
        })
        .collect();
    names.sort();

    let title = format!("Directory listing for {}", display_path);
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{0}</title></head>\n<body>\n<h1>{0}</h1>\n<hr>\n<ul>\n",
        escape_html(&title)
    );
    for name in &names {
        let _ = write!(
            html,
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(name, HREF_ESCAPE),
            escape_html(name)
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Some(html)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Content type by file extension; unknown extensions are served as
/// opaque bytes.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("csv") => "text/csv; charset=utf-8",
        Some("txt" | "log") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("xml") => "application/xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.html"), "<html></html>").unwrap();

        let resolved = resolve_path(dir.path(), "/report.html");
        assert_eq!(resolved, ResolvedPath::File(dir.path().join("report.html")));
    }

    #[test]
    fn query_string_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("data.json"), "{}").unwrap();

        let resolved = resolve_path(dir.path(), "/data.json?ts=12345");
        assert_eq!(resolved, ResolvedPath::File(dir.path().join("data.json")));
    }

    #[test]
    fn percent_decoding() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("my report.txt"), "x").unwrap();

        let resolved = resolve_path(dir.path(), "/my%20report.txt");
        assert_eq!(
            resolved,
            ResolvedPath::File(dir.path().join("my report.txt"))
        );
    }

    #[test]
    fn traversal_components_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("safe.txt"), "x").unwrap();

        // ".." components vanish, so this maps to <root>/safe.txt.
        let resolved = resolve_path(dir.path(), "/../../safe.txt");
        assert_eq!(resolved, ResolvedPath::File(dir.path().join("safe.txt")));

        // And an escape attempt toward a real file outside the root
        // cannot leave it.
        let resolved = resolve_path(dir.path(), "/../../../etc/hostname");
        assert_eq!(resolved, ResolvedPath::NotFound);
    }

    #[test]
    fn directory_without_slash_redirects() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dashboard")).unwrap();

        let resolved = resolve_path(dir.path(), "/dashboard");
        assert_eq!(resolved, ResolvedPath::Redirect("/dashboard/".to_string()));
    }

    #[test]
    fn directory_prefers_index_html() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("dashboard")).unwrap();
        std::fs::write(dir.path().join("dashboard/index.html"), "<html></html>").unwrap();

        let resolved = resolve_path(dir.path(), "/dashboard/");
        assert_eq!(
            resolved,
            ResolvedPath::File(dir.path().join("dashboard/index.html"))
        );
    }

    #[test]
    fn directory_listing_is_sorted_and_marks_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();

        let ResolvedPath::Listing(html) = resolve_path(dir.path(), "/") else {
            panic!("expected listing");
        };
        let a_pos = html.find("a/").unwrap();
        let b_pos = html.find("b.txt").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn invalid_utf8_escape_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_path(dir.path(), "/%FF%FE"), ResolvedPath::BadRequest);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_path(dir.path(), "/nope.html"), ResolvedPath::NotFound);
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("a.json")), "application/json");
        assert_eq!(content_type(Path::new("a.PNG")), "image/png");
        assert_eq!(content_type(Path::new("a.bin")), "application/octet-stream");
        assert_eq!(content_type(Path::new("noext")), "application/octet-stream");
    }
}
