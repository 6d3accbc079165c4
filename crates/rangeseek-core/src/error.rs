//! Error taxonomy for the seekable channel.
//!
//! Construction failures (`UnsupportedScheme`, `UnexpectedStatus`,
//! `MalformedRangeResponse`, `NoValidator`) mean no channel exists. The rest
//! are surfaced per operation; nothing here is retried internally.

use std::io;
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported URL scheme {0:?}: only http and https are supported")]
    UnsupportedScheme(String),

    #[error("unexpected probe response (status {0})")]
    UnexpectedStatus(u32),

    /// `Content-Range` missing from the probe response, or without a numeric total.
    #[error("invalid Content-Range in probe response: {}", .0.as_deref().unwrap_or("<missing>"))]
    MalformedRangeResponse(Option<String>),

    #[error("{url} did not offer a strong-enough validator for subsequent requests")]
    NoValidator { url: String },

    /// Status other than 206 for a ranged request; a 200 here means the
    /// `If-Range` validator no longer matches.
    #[error("range request at offset {offset} returned HTTP {status}: not 206 partial content or resource changed")]
    RangeRequestFailed { offset: u64, status: u32 },

    #[error("skip data error: discarded {skipped} of {requested} bytes")]
    SkipMismatch { requested: u64, skipped: u64 },

    #[error("seek to {target} outside resource of {size} bytes")]
    SeekOutOfRange { target: i64, size: u64 },

    #[error("channel is read-only")]
    ReadOnly,

    #[error("channel is closed")]
    Closed,

    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("reading response body: {0}")]
    Io(#[from] io::Error),
}

impl ChannelError {
    fn io_kind(&self) -> io::ErrorKind {
        match self {
            ChannelError::InvalidUrl(_)
            | ChannelError::UnsupportedScheme(_)
            | ChannelError::SeekOutOfRange { .. } => io::ErrorKind::InvalidInput,
            ChannelError::UnexpectedStatus(_)
            | ChannelError::MalformedRangeResponse(_)
            | ChannelError::NoValidator { .. }
            | ChannelError::RangeRequestFailed { .. } => io::ErrorKind::InvalidData,
            ChannelError::SkipMismatch { .. } => io::ErrorKind::UnexpectedEof,
            ChannelError::ReadOnly => io::ErrorKind::PermissionDenied,
            ChannelError::Closed => io::ErrorKind::NotConnected,
            ChannelError::Transport(e) => e.io_kind(),
            ChannelError::Io(e) => e.kind(),
        }
    }
}

impl From<ChannelError> for io::Error {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::Io(inner) => inner,
            other => io::Error::new(other.io_kind(), other),
        }
    }
}
