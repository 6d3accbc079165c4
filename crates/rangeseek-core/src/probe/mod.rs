//! Probe request issued when a channel is opened.
//!
//! A short ranged GET (`bytes=0-511`) confirms range support, yields the total
//! size from `Content-Range`, a validator from ETag/Last-Modified, and the
//! first bytes of the resource.

mod parse;

use std::io::Read;

use url::Url;

use crate::error::ChannelError;
use crate::transport::{Connection, HttpTransport};

pub use parse::{parse_content_range, validator_from_headers, ContentRange, Validator};

/// Number of bytes requested by the probe.
pub const PROBE_LENGTH: u64 = 512;

/// What the probe learned about the resource.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub size: u64,
    pub validator: Validator,
    /// Up to `PROBE_LENGTH` leading bytes.
    pub head: Vec<u8>,
}

/// Issues the probe. `requests` is bumped once the request is handed to the transport.
pub(crate) fn probe<T: HttpTransport>(
    transport: &T,
    url: &Url,
    requests: &mut u64,
) -> Result<ProbeResult, ChannelError> {
    let mut conn = transport.connect(url)?;
    conn.set_method("GET")?;
    conn.set_header("Range", &format!("bytes=0-{}", PROBE_LENGTH - 1))?;
    *requests += 1;

    let status = conn.response_status()?;
    if !(200..300).contains(&status) {
        conn.close();
        return Err(ChannelError::UnexpectedStatus(status));
    }

    let content_range = conn.response_header("Content-Range")?;
    let size = match content_range.as_deref().and_then(parse_content_range) {
        Some(range) => range.total,
        None => {
            conn.close();
            return Err(ChannelError::MalformedRangeResponse(content_range));
        }
    };

    let etag = conn.response_header("ETag")?;
    let last_modified = conn.response_header("Last-Modified")?;
    let validator = match validator_from_headers(etag.as_deref(), last_modified.as_deref()) {
        Some(v) => v,
        None => {
            conn.close();
            return Err(ChannelError::NoValidator {
                url: url.to_string(),
            });
        }
    };

    // A server that ignored the range sends the whole body; only the head is kept.
    let mut head = Vec::with_capacity(PROBE_LENGTH as usize);
    conn.into_body()?.take(PROBE_LENGTH).read_to_end(&mut head)?;

    Ok(ProbeResult {
        size,
        validator,
        head,
    })
}
