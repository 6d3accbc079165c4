//! Transport failure type.

use std::io;
use thiserror::Error;

use super::classify::{classify_curl_error, TransportErrorKind};

/// Failure of the transport itself (as opposed to a response the channel rejects).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    #[error("curl multi: {0}")]
    Multi(#[from] curl::MultiError),
    /// The exchange finished without a usable response (e.g. no status line).
    #[error("{0}")]
    Protocol(String),
}

impl TransportError {
    /// Coarse classification, for callers deciding whether a new channel is worth trying.
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Curl(e) => classify_curl_error(e),
            TransportError::Multi(_) | TransportError::Protocol(_) => TransportErrorKind::Other,
        }
    }

    pub(crate) fn io_kind(&self) -> io::ErrorKind {
        match self.kind() {
            TransportErrorKind::Timeout => io::ErrorKind::TimedOut,
            TransportErrorKind::Connection => io::ErrorKind::ConnectionAborted,
            TransportErrorKind::Other => io::ErrorKind::Other,
        }
    }
}

impl From<TransportError> for io::Error {
    fn from(e: TransportError) -> Self {
        io::Error::new(e.io_kind(), e)
    }
}
