//! HTTP transport capability consumed by the channel.
//!
//! The channel only builds requests and interprets status and headers; opening
//! connections, TLS, redirects and timeouts belong to the transport.

mod classify;
pub mod curl;
mod error;

use std::io::{self, Read};
use url::Url;

pub use classify::{classify_curl_error, TransportErrorKind};
pub use error::TransportError;

/// Opens connections to a URL. One connection carries exactly one request.
pub trait HttpTransport {
    type Connection: Connection;

    fn connect(&self, url: &Url) -> Result<Self::Connection, TransportError>;
}

/// A single HTTP exchange. Method and headers are set before the first call to
/// `response_status`, which sends the request and blocks until the response
/// headers have arrived.
pub trait Connection {
    type Body: BodyStream;

    fn set_method(&mut self, method: &str) -> Result<(), TransportError>;

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError>;

    fn response_status(&mut self) -> Result<u32, TransportError>;

    /// Value of a response header (case-insensitive name), sending the request if needed.
    fn response_header(&mut self, name: &str) -> Result<Option<String>, TransportError>;

    /// Hands the connection over to its response body. Dropping the body
    /// releases the connection.
    fn into_body(self) -> Result<Self::Body, TransportError>;

    /// Releases the connection without reading the body.
    fn close(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}

/// Blocking, finite response body.
pub trait BodyStream: Read {
    /// Reads and drops up to `n` bytes; returns how many were actually dropped
    /// (fewer only if the body ended).
    fn discard(&mut self, n: u64) -> io::Result<u64> {
        io::copy(&mut Read::take(&mut *self, n), &mut io::sink())
    }
}
