//! Server lifecycle: bind, accept loop, per-connection threads.

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::handler::handle_connection;
use crate::port::{DEFAULT_PORT, PORT_PROBE_RANGE};

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Directory tree to serve.
    pub root: PathBuf,
    /// Port to bind; 0 picks the first free port from [`DEFAULT_PORT`].
    pub port: u16,
}

impl DashboardConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            port: 0,
        }
    }
}

/// Request counters, shared with connection threads.
#[derive(Clone, Default)]
pub struct ServerMetrics {
    /// Requests with a parseable request line.
    pub requests: Arc<AtomicU64>,
    /// Requests answered 404.
    pub not_found: Arc<AtomicU64>,
}

impl ServerMetrics {
    pub fn requests_served(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn not_found_count(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }
}

/// The dashboard server; owns the listener thread.
pub struct DashboardServer {
    listener_handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    bound_addr: Option<SocketAddr>,
    root: PathBuf,
    metrics: ServerMetrics,
}

impl DashboardServer {
    /// Bind and start serving in a background thread.
    pub fn start(config: DashboardConfig) -> io::Result<Self> {
        let listener = if config.port == 0 {
            bind_auto(DEFAULT_PORT)?
        } else {
            TcpListener::bind(("0.0.0.0", config.port))?
        };
        let addr = listener.local_addr()?;
        // Non-blocking so the accept loop can check the shutdown flag.
        listener.set_nonblocking(true)?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let metrics = ServerMetrics::default();
        let root = config.root.clone();

        let listener_handle = {
            let shutdown = Arc::clone(&shutdown);
            let metrics = metrics.clone();
            let root = config.root;
            thread::spawn(move || run_listener(listener, root, shutdown, metrics))
        };

        log::info!("dashboard server listening on {}", addr);
        Ok(Self {
            listener_handle: Some(listener_handle),
            shutdown,
            bound_addr: Some(addr),
            root,
            metrics,
        })
    }

    /// Stop the server and wait for the listener thread.
    pub fn stop(&mut self) {
        if self.listener_handle.is_none() {
            return;
        }
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.listener_handle.take() {
            let _ = handle.join();
        }
        self.bound_addr = None;
        log::info!("dashboard server stopped");
    }

    /// Block the calling thread until the server stops (foreground
    /// serving).
    pub fn join(&mut self) {
        if let Some(handle) = self.listener_handle.take() {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener_handle.is_some() && !self.shutdown.load(Ordering::SeqCst)
    }

    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound_addr
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.metrics
    }
}

impl Drop for DashboardServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Bind the first free port in the probe range. Binding directly (no
/// probe-then-bind) keeps two in-process servers from racing for the
/// same port.
fn bind_auto(start: u16) -> io::Result<TcpListener> {
    for port in start..start.saturating_add(PORT_PROBE_RANGE) {
        if let Ok(listener) = TcpListener::bind(("0.0.0.0", port)) {
            return Ok(listener);
        }
    }
    TcpListener::bind(("0.0.0.0", start))
}

fn run_listener(
    listener: TcpListener,
    root: PathBuf,
    shutdown: Arc<AtomicBool>,
    metrics: ServerMetrics,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, addr)) => {
                log::debug!("accepted connection from {}", addr);
                let root = root.clone();
                let metrics = metrics.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_connection(stream, &root, &metrics) {
                        log::debug!("connection error from {}: {}", addr, e);
                    }
                });
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                log::error!("accept error: {}", e);
                break;
            }
        }
    }
}
