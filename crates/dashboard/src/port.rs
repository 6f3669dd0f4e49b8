//! Port selection.

use std::net::TcpListener;

/// First port probed when none is requested.
pub const DEFAULT_PORT: u16 = 7788;

/// How many consecutive ports to probe.
pub(crate) const PORT_PROBE_RANGE: u16 = 20;

/// Find a bindable port starting at `start`, probing a small range.
/// Falls back to `start` when every probe fails, so the subsequent
/// bind surfaces the real error.
pub fn find_free_port(start: u16) -> u16 {
    for port in start..start.saturating_add(PORT_PROBE_RANGE) {
        if TcpListener::bind(("127.0.0.1", port)).is_ok() {
            return port;
        }
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_occupied_port() {
        // Hold a port open, then ask for a free one starting there.
        let listener = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let held = listener.local_addr().unwrap().port();

        let free = find_free_port(held);
        assert_ne!(free, held);
        assert!(free > held && free < held + PORT_PROBE_RANGE);
    }

    #[test]
    fn returns_start_when_free() {
        // An ephemeral port released just now is almost certainly free.
        let probe = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = probe.local_addr().unwrap().port();
        drop(probe);

        assert_eq!(find_free_port(port), port);
    }
}
