//! Minimal HTTP/1.1 server that supports Range and If-Range GETs for integration tests.
//!
//! Serves a single static body. Answers `Range: bytes=X-` / `bytes=X-Y` with
//! 206 Partial Content while the `If-Range` validator matches, otherwise 200
//! with the full body.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RangeServerOptions {
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// If true, Content-Range reports an unknown total (`bytes a-b/*`).
    pub unknown_total: bool,
    /// Closes open-ended (`bytes=X-`) 206 bodies after this many bytes while
    /// still advertising the full Content-Length.
    pub truncate_after: Option<usize>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            etag: Some("\"v1\"".to_string()),
            last_modified: None,
            support_ranges: true,
            unknown_total: false,
            truncate_after: None,
        }
    }
}

/// Range and If-Range headers of one received request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: String,
    pub range: Option<String>,
    pub if_range: Option<String>,
}

struct Shared {
    body: Vec<u8>,
    opts: Mutex<RangeServerOptions>,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct RangeServer {
    pub url: String,
    shared: Arc<Shared>,
}

impl RangeServer {
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.shared.seen.lock().unwrap().clone()
    }

    /// Simulates the resource changing on the server.
    pub fn set_etag(&self, etag: &str) {
        self.shared.opts.lock().unwrap().etag = Some(etag.to_string());
    }
}

/// Starts a server in a background thread serving `body`. The server runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let shared = Arc::new(Shared {
        body,
        opts: Mutex::new(opts),
        seen: Mutex::new(Vec::new()),
    });
    let server_shared = Arc::clone(&shared);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let shared = Arc::clone(&server_shared);
            thread::spawn(move || handle(stream, &shared));
        }
    });
    RangeServer {
        url: format!("http://127.0.0.1:{}/resource.bin", port),
        shared,
    }
}

fn read_request_head(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn handle(mut stream: TcpStream, shared: &Shared) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));
    let request = match read_request_head(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let seen = parse_request(&request);
    shared.seen.lock().unwrap().push(seen.clone());
    let opts = shared.opts.lock().unwrap().clone();

    if !seen.method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let body = &shared.body[..];
    let total = body.len() as u64;
    let validator_ok = match seen.if_range.as_deref() {
        None => true,
        Some(v) => opts.etag.as_deref() == Some(v) || opts.last_modified.as_deref() == Some(v),
    };
    let range = seen.range.as_deref().and_then(parse_range);
    let open_ended = matches!(range, Some((_, None)));

    let (status, content_range, slice) = match range {
        Some((start, end_incl)) if opts.support_ranges && validator_ok => {
            let end_incl = end_incl.unwrap_or(u64::MAX).min(total.saturating_sub(1));
            if start > end_incl || start >= total {
                (
                    "416 Range Not Satisfiable",
                    Some(format!("bytes */{}", total)),
                    &body[0..0],
                )
            } else {
                let total_str = if opts.unknown_total {
                    "*".to_string()
                } else {
                    total.to_string()
                };
                (
                    "206 Partial Content",
                    Some(format!("bytes {}-{}/{}", start, end_incl, total_str)),
                    &body[start as usize..=end_incl as usize],
                )
            }
        }
        _ => ("200 OK", None, body),
    };

    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        slice.len()
    );
    if opts.support_ranges {
        head.push_str("Accept-Ranges: bytes\r\n");
    }
    if let Some(cr) = content_range {
        head.push_str(&format!("Content-Range: {}\r\n", cr));
    }
    if let Some(ref etag) = opts.etag {
        head.push_str(&format!("ETag: {}\r\n", etag));
    }
    if let Some(ref lm) = opts.last_modified {
        head.push_str(&format!("Last-Modified: {}\r\n", lm));
    }
    head.push_str("\r\n");
    if stream.write_all(head.as_bytes()).is_err() {
        return;
    }
    let sent = match opts.truncate_after {
        Some(limit) if open_ended && status.starts_with("206") => &slice[..limit.min(slice.len())],
        _ => slice,
    };
    for chunk in sent.chunks(16 * 1024) {
        if stream.write_all(chunk).is_err() {
            return;
        }
    }
}

/// Returns the method plus raw Range / If-Range header values.
fn parse_request(request: &str) -> SeenRequest {
    let mut seen = SeenRequest::default();
    for (i, line) in request.split("\r\n").enumerate() {
        if i == 0 {
            seen.method = line.split_whitespace().next().unwrap_or("").to_string();
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.eq_ignore_ascii_case("range") {
                seen.range = Some(value.trim().to_string());
            } else if name.eq_ignore_ascii_case("if-range") {
                seen.if_range = Some(value.trim().to_string());
            }
        }
    }
    seen
}

/// `bytes=X-Y` or `bytes=X-` as (start, optional inclusive end).
fn parse_range(value: &str) -> Option<(u64, Option<u64>)> {
    let value = value.trim();
    if !value.to_ascii_lowercase().starts_with("bytes=") {
        return None;
    }
    let (a, b) = value[6..].trim().split_once('-')?;
    let start = a.trim().parse::<u64>().ok()?;
    let b = b.trim();
    let end = if b.is_empty() {
        None
    } else {
        Some(b.parse::<u64>().ok()?)
    };
    Some((start, end))
}
