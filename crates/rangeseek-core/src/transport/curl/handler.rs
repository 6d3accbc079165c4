//! Easy2 Handler that collects response headers and buffers body bytes for a
//! pull-based reader. Pauses the transfer once the read-ahead limit is reached.

use std::collections::VecDeque;
use std::str;

use curl::easy::{Handler, WriteError};

pub struct BodyHandler {
    /// Header lines of the current response block (status line first).
    pub(super) response_headers: Vec<String>,
    /// Set on the blank line ending a final (non-1xx, non-redirect) header block.
    pub(super) headers_complete: bool,
    pub(super) buffered: VecDeque<u8>,
    pub(super) read_ahead: usize,
    pub(super) paused: bool,
    follow_redirects: bool,
}

impl BodyHandler {
    pub(super) fn new(read_ahead: usize, follow_redirects: bool) -> Self {
        Self {
            response_headers: Vec::new(),
            headers_complete: false,
            buffered: VecDeque::new(),
            read_ahead: read_ahead.max(1),
            paused: false,
            follow_redirects,
        }
    }

    pub(super) fn status(&self) -> Option<u32> {
        self.response_headers
            .first()
            .and_then(|line| parse_http_status(line))
    }

    /// Last value of header `name` in the current block.
    pub(super) fn header_value(&self, name: &str) -> Option<String> {
        self.response_headers
            .iter()
            .skip(1)
            .filter_map(|line| line.split_once(':'))
            .filter(|(n, _)| n.trim().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim().to_string())
            .last()
    }

    /// Moves buffered bytes into `buf`; returns how many were copied.
    pub(super) fn drain_into(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.buffered.len());
        for (dst, src) in buf.iter_mut().zip(self.buffered.drain(..n)) {
            *dst = src;
        }
        n
    }

    fn block_is_final(&self) -> bool {
        match self.status() {
            Some(code) if (100..200).contains(&code) => false,
            Some(code) if (300..400).contains(&code) => {
                !(self.follow_redirects && self.header_value("location").is_some())
            }
            _ => true,
        }
    }
}

impl Handler for BodyHandler {
    fn header(&mut self, data: &[u8]) -> bool {
        if let Ok(s) = str::from_utf8(data) {
            let line = s.trim_end();
            if line.starts_with("HTTP/") {
                self.response_headers.clear();
                self.headers_complete = false;
                self.response_headers.push(line.to_string());
            } else if line.is_empty() {
                if self.block_is_final() {
                    self.headers_complete = true;
                }
            } else {
                self.response_headers.push(line.to_string());
            }
        }
        true
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if self.buffered.len() >= self.read_ahead {
            self.paused = true;
            return Err(WriteError::Pause);
        }
        self.headers_complete = true;
        self.buffered.extend(data);
        Ok(data.len())
    }
}

/// Status code from a status line such as `HTTP/1.1 206 Partial Content`.
pub(super) fn parse_http_status(line: &str) -> Option<u32> {
    let mut parts = line.split_whitespace();
    if !parts.next()?.starts_with("HTTP/") {
        return None;
    }
    parts.next()?.parse().ok()
}
