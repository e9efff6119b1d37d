//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body from a background thread and records what the
//! client asked for, so tests can assert on request counts and on which
//! range a simulated failure hit.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, HEAD omits `Content-Length` (simulates unknown size).
    pub send_content_length: bool,
    /// If false, omit `Accept-Ranges: bytes` even though ranges still work.
    pub advertise_ranges: bool,
    /// Fail the nth GET (1-based) with a 500 instead of serving the range.
    pub fail_nth_get: Option<usize>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            send_content_length: true,
            advertise_ranges: true,
            fail_nth_get: None,
        }
    }
}

/// What the server has seen so far.
#[derive(Debug, Default)]
pub struct ServerState {
    head_requests: AtomicUsize,
    get_requests: AtomicUsize,
    failed_range: Mutex<Option<(u64, u64)>>,
}

impl ServerState {
    pub fn head_requests(&self) -> usize {
        self.head_requests.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> usize {
        self.get_requests.load(Ordering::SeqCst)
    }

    /// Clamped `(start, end_inclusive)` of the GET that was failed, if any.
    pub fn failed_range(&self) -> Option<(u64, u64)> {
        *self.failed_range.lock().unwrap()
    }
}

/// Starts a server in a background thread serving `body`. Returns the base URL
/// (e.g. "http://127.0.0.1:12345/") and the request log. The server runs until
/// the process exits.
pub fn start(body: Vec<u8>) -> (String, Arc<ServerState>) {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> (String, Arc<ServerState>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let state = Arc::new(ServerState::default());
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &body, opts, &state));
        }
    });
    (format!("http://127.0.0.1:{}/", port), state)
}

fn handle(
    mut stream: std::net::TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    state: &ServerState,
) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, range) = parse_request(request);
    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if method.eq_ignore_ascii_case("HEAD") {
        state.head_requests.fetch_add(1, Ordering::SeqCst);
        let content_length = if opts.send_content_length {
            format!("Content-Length: {}\r\n", total)
        } else {
            String::new()
        };
        let response = format!("HTTP/1.1 200 OK\r\n{}{}\r\n", content_length, accept_ranges);
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        let count = state.get_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let (start, end_incl) = match range {
            Some((start, end)) => (start.min(total), end.min(total.saturating_sub(1))),
            None => (0, total.saturating_sub(1)),
        };

        if opts.fail_nth_get == Some(count) {
            let _ = state.failed_range.lock().unwrap().replace((start, end_incl));
            let _ = stream.write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\n\r\n",
            );
            return;
        }

        let (status, slice) = if range.is_some() {
            let start = start as usize;
            let end_excl = (end_incl + 1).min(total) as usize;
            ("206 Partial Content", body.get(start..end_excl).unwrap_or(&body[0..0]))
        } else {
            ("200 OK", body)
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\n{}\r\n",
            status,
            slice.len(),
            start,
            end_incl,
            total,
            accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if let Some(part) = value.strip_prefix("bytes=") {
                    if let Some((a, b)) = part.trim().split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end = b.trim();
                        let end_incl = if end.is_empty() {
                            u64::MAX
                        } else {
                            end.parse::<u64>().unwrap_or(0)
                        };
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, range)
}
