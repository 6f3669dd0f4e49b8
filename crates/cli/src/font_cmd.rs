//! Font subcommands: `rkit font setup`, `rkit font diagnose`.

use std::path::PathBuf;

use reportkit_font::{ResolveRequest, Resolver};

use crate::exit_codes::*;
use crate::util::{display_width, pad_right, truncate_display};
use crate::CliError;

pub fn cmd_setup(
    candidates: Vec<String>,
    paths: Vec<PathBuf>,
    json: bool,
) -> Result<(), CliError> {
    // Scripted callers (non-TTY) get JSON unless told otherwise.
    let json = json || !atty::is(atty::Stream::Stdout);

    let mut request = ResolveRequest::default();
    if !candidates.is_empty() {
        request.candidates = candidates;
    }
    request.extra_paths = paths;

    let mut resolver = Resolver::new();
    let resolution = resolver.resolve(&request);

    match &resolution.font {
        Some(font) => {
            if json {
                let settings = font.render_settings();
                let out = serde_json::json!({
                    "name": font.name,
                    "path": font.path,
                    "collection": resolver.is_collection_mode(),
                    "family_chain": settings.family_chain,
                    "ascii_minus": settings.ascii_minus,
                });
                println!("{}", out);
            } else {
                println!("CJK font configured: {} ({})", font.name, font.path.display());
                if resolver.is_collection_mode() {
                    eprintln!(
                        "note: collection file (.ttc): pass the font handle to every text \
                         element; a global family chain may not take effect"
                    );
                }
            }
            Ok(())
        }
        None => Err(CliError {
            code: EXIT_FONT_NOT_FOUND,
            message: "no usable CJK font found; CJK text may render as boxes".into(),
            hint: resolution.hint.clone(),
        }),
    }
}

pub fn cmd_diagnose(json: bool) -> Result<(), CliError> {
    let json = json || !atty::is(atty::Stream::Stdout);

    let request = ResolveRequest::default();
    let mut resolver = Resolver::new();
    let report = resolver.diagnose(&request);

    if json {
        let out = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: e.to_string(),
            hint: None,
        })?;
        println!("{}", out);
        return Ok(());
    }

    println!("Indexed CJK-relevant families ({}):", report.indexed.len());
    let name_width = report
        .indexed
        .iter()
        .map(|f| display_width(&f.name))
        .max()
        .unwrap_or(0)
        .min(40);
    for family in &report.indexed {
        let marker = if family.candidate { "*" } else { " " };
        let format_note = if family.collection {
            "  (ttc, per-element handle required)"
        } else {
            ""
        };
        println!(
            "  {} {}  {}{}",
            marker,
            pad_right(&family.name, name_width),
            truncate_display(&family.path.to_string_lossy(), 60),
            format_note
        );
    }
    if report.indexed.is_empty() {
        println!("  (none)");
    } else {
        println!("  (* = in the default candidate list)");
    }

    println!();
    println!(
        "Font files on disk ({} direct, {} collections):",
        report.disk_direct.len(),
        report.disk_collections.len()
    );
    for path in &report.disk_direct {
        println!("  ttf  {}", path.display());
    }
    for path in &report.disk_collections {
        println!("  ttc  {}", path.display());
    }
    if report.disk_direct.is_empty() && report.disk_collections.is_empty() {
        println!("  (none)");
    }

    if !report.attempts.is_empty() {
        println!();
        println!("Scan attempts:");
        for attempt in &report.attempts {
            match (&attempt.family, &attempt.error) {
                (Some(family), _) => println!("  ok    {} -> {}", attempt.path.display(), family),
                (None, Some(error)) => println!("  skip  {}: {}", attempt.path.display(), error),
                (None, None) => {}
            }
        }
    }

    println!();
    match &report.font {
        Some(font) => {
            println!("Selected: {} ({})", font.name, font.path.display());
            println!(
                "Mode: {}",
                if report.collection_mode {
                    "per-element font handle (.ttc)"
                } else {
                    "global family chain (.ttf/.otf)"
                }
            );
        }
        None => {
            println!("No usable CJK font found.");
            if let Some(hint) = &report.hint {
                println!("Install hint: {}", hint);
            }
        }
    }
    Ok(())
}
