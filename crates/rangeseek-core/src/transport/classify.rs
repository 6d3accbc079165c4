//! Classify curl errors into coarse transport failure kinds.

/// High-level classification of a transport failure.
///
/// The channel never retries; this only tells callers what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Anything else.
    Other,
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> TransportErrorKind {
    if e.is_operation_timedout() {
        return TransportErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return TransportErrorKind::Connection;
    }
    TransportErrorKind::Other
}
