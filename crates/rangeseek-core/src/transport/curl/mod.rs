//! libcurl-backed transport.
//!
//! Each connection owns one `Easy2` handle driven through a private `Multi`
//! handle, so the response body can be pulled incrementally by a blocking
//! reader instead of being pushed through a callback in one `perform()`.

mod body;
mod handler;

use std::time::Duration;

use curl::easy::{Easy2, List};
use curl::multi::Multi;
use url::Url;

use self::body::Transfer;
use self::handler::BodyHandler;
use super::{Connection, HttpTransport, TransportError};
use crate::config::TransportConfig;

pub use self::body::CurlBody;

/// Bytes buffered ahead of the reader before the transfer is paused.
pub const DEFAULT_READ_AHEAD: usize = 256 * 1024;

/// Optional curl options applied to every connection.
#[derive(Debug, Clone, Default)]
pub struct CurlOptions {
    pub connect_timeout: Option<Duration>,
    /// Hard wall-clock limit for a whole transfer (None = no limit).
    pub timeout: Option<Duration>,
    /// Abort if throughput stays below this many bytes/s for `low_speed_time`.
    pub low_speed_limit: Option<u32>,
    pub low_speed_time: Option<Duration>,
    pub max_redirections: Option<u32>,
    pub max_recv_speed: Option<u64>,
    pub buffer_size: Option<usize>,
    pub user_agent: Option<String>,
    pub read_ahead: Option<usize>,
}

impl CurlOptions {
    pub fn from_config(cfg: &TransportConfig, read_ahead: usize) -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(cfg.connect_timeout_secs)),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            low_speed_limit: cfg.low_speed_limit,
            low_speed_time: Some(Duration::from_secs(cfg.low_speed_time_secs)),
            max_redirections: Some(cfg.max_redirections),
            max_recv_speed: cfg.max_bytes_per_sec,
            buffer_size: cfg.buffer_size,
            user_agent: cfg.user_agent.clone(),
            read_ahead: Some(read_ahead),
        }
    }
}

/// `HttpTransport` implementation on top of the curl crate.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }
}

impl HttpTransport for CurlTransport {
    type Connection = CurlConnection;

    fn connect(&self, url: &Url) -> Result<CurlConnection, TransportError> {
        let opts = &self.options;
        let follow = opts.max_redirections != Some(0);
        let handler = BodyHandler::new(opts.read_ahead.unwrap_or(DEFAULT_READ_AHEAD), follow);
        let mut easy = Easy2::new(handler);
        easy.url(url.as_str())?;
        easy.follow_location(follow)?;
        if let Some(n) = opts.max_redirections {
            easy.max_redirections(n)?;
        }
        if let Some(d) = opts.connect_timeout {
            easy.connect_timeout(d)?;
        }
        if let Some(d) = opts.timeout {
            easy.timeout(d)?;
        }
        if let Some(limit) = opts.low_speed_limit {
            easy.low_speed_limit(limit)?;
            easy.low_speed_time(opts.low_speed_time.unwrap_or(Duration::from_secs(60)))?;
        }
        if let Some(speed) = opts.max_recv_speed {
            easy.max_recv_speed(speed)?;
        }
        if let Some(sz) = opts.buffer_size {
            easy.buffer_size(sz)?;
        }
        if let Some(ref ua) = opts.user_agent {
            easy.useragent(ua)?;
        }
        Ok(CurlConnection {
            pending: Some(easy),
            headers: List::new(),
            transfer: None,
        })
    }
}

/// One request/response exchange over curl.
pub struct CurlConnection {
    /// Handle being configured; moved into the multi on send.
    pending: Option<Easy2<BodyHandler>>,
    headers: List,
    transfer: Option<Transfer>,
}

impl CurlConnection {
    fn configure(&mut self) -> Result<&mut Easy2<BodyHandler>, TransportError> {
        self.pending.as_mut().ok_or_else(|| {
            TransportError::Protocol("request already sent; cannot change it".to_string())
        })
    }

    fn send(&mut self) -> Result<&mut Transfer, TransportError> {
        if self.transfer.is_none() {
            let mut easy = self.pending.take().ok_or_else(|| {
                TransportError::Protocol("request already sent".to_string())
            })?;
            let headers = std::mem::replace(&mut self.headers, List::new());
            easy.http_headers(headers)?;
            let multi = Multi::new();
            let handle = multi.add2(easy)?;
            let mut transfer = Transfer::new(multi, handle);
            transfer.await_headers()?;
            tracing::trace!(
                status = ?transfer.handler().status(),
                headers = transfer.handler().response_headers.len(),
                "response headers received"
            );
            self.transfer = Some(transfer);
        }
        self.transfer
            .as_mut()
            .ok_or_else(|| TransportError::Protocol("request was not sent".to_string()))
    }
}

impl Connection for CurlConnection {
    type Body = CurlBody;

    fn set_method(&mut self, method: &str) -> Result<(), TransportError> {
        let easy = self.configure()?;
        match method {
            "GET" => easy.get(true)?,
            "HEAD" => easy.nobody(true)?,
            other => easy.custom_request(other)?,
        }
        Ok(())
    }

    fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        self.configure()?;
        self.headers
            .append(&format!("{}: {}", name.trim(), value.trim()))?;
        Ok(())
    }

    fn response_status(&mut self) -> Result<u32, TransportError> {
        let transfer = self.send()?;
        transfer
            .handler()
            .status()
            .ok_or_else(|| TransportError::Protocol("no response status".to_string()))
    }

    fn response_header(&mut self, name: &str) -> Result<Option<String>, TransportError> {
        Ok(self.send()?.handler().header_value(name))
    }

    fn into_body(mut self) -> Result<CurlBody, TransportError> {
        self.send()?;
        let transfer = self
            .transfer
            .take()
            .ok_or_else(|| TransportError::Protocol("request was not sent".to_string()))?;
        Ok(CurlBody::new(transfer))
    }
}
