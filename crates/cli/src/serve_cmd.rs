//! Dashboard serve command.

use std::path::PathBuf;

use reportkit_dashboard::{DashboardConfig, DashboardServer};

use crate::exit_codes::*;
use crate::CliError;

pub fn cmd_serve(
    root: Option<PathBuf>,
    dir: Option<PathBuf>,
    port: u16,
) -> Result<(), CliError> {
    let root = resolve_root(root, dir)?;

    let mut server =
        DashboardServer::start(DashboardConfig { root: root.clone(), port }).map_err(|e| {
            CliError {
                code: EXIT_SERVE_BIND,
                message: format!("cannot bind dashboard server: {}", e),
                hint: Some("pass --port to pick a different port".into()),
            }
        })?;
    let addr = server.bound_addr().ok_or_else(|| CliError {
        code: EXIT_SERVE_BIND,
        message: "server did not report a bound address".into(),
        hint: None,
    })?;

    println!();
    println!(
        "  Dashboard ready → http://localhost:{}/dashboard/dashboard.html",
        addr.port()
    );
    println!("  Serving: {}", root.display());
    println!();

    // Foreground serving; ^C terminates the process and the listener
    // thread with it.
    server.join();
    Ok(())
}

/// `--root` wins; legacy `--dir` naming a `dashboard/` directory
/// serves its parent; default is the current directory.
fn resolve_root(root: Option<PathBuf>, dir: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let chosen = match (root, dir) {
        (Some(root), _) => root,
        (None, Some(dir)) => {
            let canonical = canonicalize(dir)?;
            let is_dashboard = canonical
                .file_name()
                .map(|n| n == "dashboard")
                .unwrap_or(false);
            match (is_dashboard, canonical.parent()) {
                (true, Some(parent)) if parent.is_dir() => return Ok(parent.to_path_buf()),
                _ => canonical,
            }
        }
        (None, None) => PathBuf::from("."),
    };
    canonicalize(chosen)
}

fn canonicalize(path: PathBuf) -> Result<PathBuf, CliError> {
    if !path.is_dir() {
        return Err(CliError {
            code: EXIT_USAGE,
            message: format!("directory not found: {}", path.display()),
            hint: None,
        });
    }
    std::fs::canonicalize(&path).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("cannot resolve {}: {}", path.display(), e),
        hint: None,
    })
}
