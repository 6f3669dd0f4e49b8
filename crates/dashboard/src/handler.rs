//! Per-connection request handling.
//!
//! One request per connection, HTTP/1.0 style: parse the request line,
//! drain headers, respond, close. The dashboard front-end tolerates
//! this fine and it keeps the server at stdlib-file-server complexity.

use std::io::{self, BufRead, BufReader, Write};
use std::net::TcpStream;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::files::{content_type, resolve_path, ResolvedPath};
use crate::server::ServerMetrics;

const SERVER_NAME: &str = concat!("reportkit-dashboard/", env!("CARGO_PKG_VERSION"));

pub(crate) fn handle_connection(
    mut stream: TcpStream,
    root: &Path,
    metrics: &ServerMetrics,
) -> io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(10)))?;
    stream.set_write_timeout(Some(Duration::from_secs(10)))?;

    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Drain request headers; this server does not act on any of them.
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        if line == "\r\n" || line == "\n" {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m, t),
        _ => {
            return write_response(
                &mut stream,
                400,
                "Bad Request",
                "text/plain; charset=utf-8",
                b"bad request\n",
                true,
                &[],
            );
        }
    };

    metrics.requests.fetch_add(1, Ordering::Relaxed);
    log::debug!("{} {}", method, target);

    let with_body = match method {
        "GET" => true,
        "HEAD" => false,
        _ => {
            return write_response(
                &mut stream,
                501,
                "Not Implemented",
                "text/plain; charset=utf-8",
                b"unsupported method\n",
                true,
                &[],
            );
        }
    };

    match resolve_path(root, target) {
        ResolvedPath::File(path) => match std::fs::read(&path) {
            Ok(body) => write_response(
                &mut stream,
                200,
                "OK",
                content_type(&path),
                &body,
                with_body,
                &[],
            ),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => write_response(
                &mut stream,
                403,
                "Forbidden",
                "text/plain; charset=utf-8",
                b"forbidden\n",
                with_body,
                &[],
            ),
            Err(_) => not_found(&mut stream, with_body, metrics),
        },
        ResolvedPath::Listing(html) => write_response(
            &mut stream,
            200,
            "OK",
            "text/html; charset=utf-8",
            html.as_bytes(),
            with_body,
            &[],
        ),
        ResolvedPath::Redirect(location) => write_response(
            &mut stream,
            301,
            "Moved Permanently",
            "text/html; charset=utf-8",
            b"",
            with_body,
            &[("Location", location.as_str())],
        ),
        ResolvedPath::NotFound => not_found(&mut stream, with_body, metrics),
        ResolvedPath::BadRequest => write_response(
            &mut stream,
            400,
            "Bad Request",
            "text/plain; charset=utf-8",
            b"bad request\n",
            with_body,
            &[],
        ),
    }
}

fn not_found(stream: &mut TcpStream, with_body: bool, metrics: &ServerMetrics) -> io::Result<()> {
    metrics.not_found.fetch_add(1, Ordering::Relaxed);
    write_response(
        stream,
        404,
        "Not Found",
        "text/html; charset=utf-8",
        b"<html><body><h1>404 Not Found</h1></body></html>\n",
        with_body,
        &[],
    )
}

fn write_response(
    stream: &mut TcpStream,
    status: u16,
    reason: &str,
    content_type: &str,
    body: &[u8],
    with_body: bool,
    extra_headers: &[(&str, &str)],
) -> io::Result<()> {
    let mut head = format!("HTTP/1.0 {} {}\r\n", status, reason);
    head.push_str(&format!("Server: {}\r\n", SERVER_NAME));
    head.push_str(&format!("Content-Type: {}\r\n", content_type));
    head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    // The dashboard polls its data files; a cached response would show
    // a stale run. CORS is open so file:// and cross-port pages work.
    head.push_str("Access-Control-Allow-Origin: *\r\n");
    head.push_str("Cache-Control: no-cache, no-store, must-revalidate\r\n");
    for (name, value) in extra_headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("Connection: close\r\n\r\n");

    stream.write_all(head.as_bytes())?;
    if with_body {
        stream.write_all(body)?;
    }
    stream.flush()
}
