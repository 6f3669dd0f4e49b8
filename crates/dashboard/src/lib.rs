//! Static-file HTTP server for the local research dashboard.
//!
//! Serves a directory tree over plain HTTP with one thread per
//! connection, in the spirit of a stdlib threading file server: no
//! TLS, no keep-alive, no response caching. Every response carries a
//! permissive CORS header and a no-cache directive because the
//! dashboard front-end polls its data files and must never see a
//! stale run.

mod files;
mod handler;
mod port;
mod server;

pub use files::{content_type, resolve_path, ResolvedPath};
pub use port::{find_free_port, DEFAULT_PORT};
pub use server::{DashboardConfig, DashboardServer, ServerMetrics};
