//! Seekable, read-only byte channel over HTTP range requests.
//!
//! Opening a channel probes the resource (size, validator, head bytes). Reads
//! pull from one open response body, opened lazily at the current position.
//! Seeks either discard bytes from that body (short forward jumps) or reopen
//! it immediately with `Range: bytes=<target>-` and `If-Range: <validator>`.
//! Nothing is retried: every transport or server failure is returned to the
//! caller, who decides whether a new channel is acceptable.

mod body_slot;
mod stream;

use std::fmt;
use std::io::{ErrorKind, Read};

use url::Url;

use self::body_slot::BodySlot;
use crate::error::ChannelError;
use crate::probe::{self, Validator};
use crate::transport::{BodyStream, Connection, HttpTransport};

/// Default largest forward seek served by discarding bytes (512 KiB).
pub const DEFAULT_SKIP_THRESHOLD: u64 = 512 * 1024;

/// Per-channel tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelOptions {
    /// Forward seeks of at most this many bytes discard from the open body
    /// instead of issuing a new request.
    pub skip_threshold: u64,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
        }
    }
}

type Body<T> = <<T as HttpTransport>::Connection as Connection>::Body;

/// A remote HTTP resource as a random-access, read-only byte stream.
///
/// Not safe for concurrent use; every mutating operation takes `&mut self`.
pub struct SeekableHttpChannel<T: HttpTransport> {
    url: Url,
    transport: T,
    options: ChannelOptions,
    size: u64,
    validator: Validator,
    head: Vec<u8>,
    position: u64,
    body: BodySlot<Body<T>>,
    request_count: u64,
    closed: bool,
}

impl<T: HttpTransport> SeekableHttpChannel<T> {
    /// Opens a channel with the default skip threshold.
    pub fn open(url: &str, transport: T) -> Result<Self, ChannelError> {
        Self::open_with_options(url, transport, ChannelOptions::default())
    }

    /// Opens a channel: validates the scheme and issues the probe request.
    pub fn open_with_options(
        url: &str,
        transport: T,
        options: ChannelOptions,
    ) -> Result<Self, ChannelError> {
        let url = Url::parse(url)?;
        if !url.scheme().eq_ignore_ascii_case("http") && !url.scheme().eq_ignore_ascii_case("https")
        {
            return Err(ChannelError::UnsupportedScheme(url.scheme().to_string()));
        }

        let mut request_count = 0;
        let probed = probe::probe(&transport, &url, &mut request_count)?;
        tracing::info!(
            url = %url,
            size = probed.size,
            validator = %probed.validator,
            "opened seekable channel"
        );

        Ok(Self {
            url,
            transport,
            options,
            size: probed.size,
            validator: probed.validator,
            head: probed.head,
            position: 0,
            body: BodySlot::empty(),
            request_count,
            closed: false,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Total resource size, fixed at open.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Leading bytes captured by the probe (at most 512).
    pub fn head_bytes(&self) -> &[u8] {
        &self.head
    }

    /// HTTP requests issued so far, probe included.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    pub fn skip_threshold(&self) -> u64 {
        self.options.skip_threshold
    }

    pub fn is_open(&self) -> bool {
        !self.closed
    }

    /// Reads up to `buf.len()` bytes at the current position.
    ///
    /// Returns 0 at end of resource. A body that ends early yields a short
    /// (possibly zero) count and is released so the next read reopens at the
    /// current position.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        self.ensure_open()?;
        if self.position >= self.size || buf.is_empty() {
            return Ok(0);
        }
        let remaining = usize::try_from(self.size - self.position).unwrap_or(usize::MAX);
        let want = buf.len().min(remaining);

        if !self.body.is_open() {
            self.issue_range_request()?;
        }
        let Some(body) = self.body.get_mut() else {
            return Ok(0);
        };

        let mut total = 0;
        let mut ended = false;
        while total < want {
            match body.read(&mut buf[total..want]) {
                Ok(0) => {
                    ended = true;
                    break;
                }
                Ok(n) => {
                    total += n;
                    self.position += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if total > 0 => {
                    tracing::warn!(
                        position = self.position,
                        "body read failed after {} bytes, releasing stream: {}",
                        total,
                        e
                    );
                    self.body.release();
                    return Ok(total);
                }
                Err(e) => {
                    self.body.release();
                    return Err(e.into());
                }
            }
        }

        if ended {
            tracing::warn!(
                position = self.position,
                size = self.size,
                "response body ended before end of resource; next read reopens"
            );
            self.body.release();
        }
        Ok(total)
    }

    /// Moves the position to `target`.
    ///
    /// Targets outside `0..size` fail with `SeekOutOfRange` and change nothing
    /// (seeking to the current position is always a no-op). Forward moves of
    /// at most the skip threshold discard from the open body; anything else
    /// reopens the body at `target` before returning.
    pub fn seek_to(&mut self, target: i64) -> Result<(), ChannelError> {
        self.ensure_open()?;
        if target >= 0 && target as u64 == self.position {
            return Ok(());
        }
        if target < 0 || target as u64 >= self.size {
            return Err(ChannelError::SeekOutOfRange {
                target,
                size: self.size,
            });
        }
        let target = target as u64;

        let distance = target.saturating_sub(self.position);
        if target > self.position && distance <= self.options.skip_threshold && self.body.is_open()
        {
            return self.skip_forward(distance);
        }

        tracing::debug!(from = self.position, to = target, "seek reopens body");
        self.position = target;
        self.issue_range_request()
    }

    fn skip_forward(&mut self, distance: u64) -> Result<(), ChannelError> {
        let Some(body) = self.body.get_mut() else {
            return Ok(());
        };
        let skipped = match body.discard(distance) {
            Ok(n) => n,
            Err(e) => {
                self.body.release();
                return Err(e.into());
            }
        };
        self.position += skipped;
        if skipped != distance {
            self.body.release();
            return Err(ChannelError::SkipMismatch {
                requested: distance,
                skipped,
            });
        }
        tracing::debug!(position = self.position, skipped, "seek served by skipping");
        Ok(())
    }

    /// Releases the open body and its connection. Idempotent.
    pub fn close(&mut self) {
        if !self.closed {
            tracing::debug!(url = %self.url, requests = self.request_count, "closing channel");
        }
        self.body.release();
        self.closed = true;
    }

    /// Always fails: the channel is read-only.
    pub fn write(&mut self, _buf: &[u8]) -> Result<usize, ChannelError> {
        Err(ChannelError::ReadOnly)
    }

    /// Always fails: the channel is read-only.
    pub fn truncate(&mut self, _size: u64) -> Result<(), ChannelError> {
        Err(ChannelError::ReadOnly)
    }

    fn ensure_open(&self) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        Ok(())
    }

    /// `GET` with `Range: bytes=<position>-` and `If-Range`; only 206 is accepted.
    fn issue_range_request(&mut self) -> Result<(), ChannelError> {
        let offset = self.position;
        let url = &self.url;
        let transport = &self.transport;
        let validator = &self.validator;
        let request_count = &mut self.request_count;

        self.body.reopen(|| {
            let mut conn = transport.connect(url)?;
            conn.set_method("GET")?;
            conn.set_header("Range", &format!("bytes={}-", offset))?;
            conn.set_header("If-Range", validator.as_str())?;
            *request_count += 1;
            tracing::debug!(offset, request = *request_count, "issuing range request");

            let status = conn.response_status()?;
            if status != 206 {
                tracing::warn!(offset, status, "range request rejected or resource changed");
                conn.close();
                return Err(ChannelError::RangeRequestFailed { offset, status });
            }
            Ok(conn.into_body()?)
        })?;
        Ok(())
    }
}

impl<T: HttpTransport> fmt::Debug for SeekableHttpChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeekableHttpChannel")
            .field("url", &self.url.as_str())
            .field("size", &self.size)
            .field("position", &self.position)
            .field("validator", &self.validator)
            .field("body_open", &self.body.is_open())
            .field("request_count", &self.request_count)
            .field("closed", &self.closed)
            .finish()
    }
}
