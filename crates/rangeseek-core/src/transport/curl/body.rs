//! Pull-based driving of a single Easy2 transfer through its own Multi handle.

use std::io::{self, Read};
use std::time::Duration;

use curl::multi::{Easy2Handle, Multi};

use super::handler::BodyHandler;
use crate::transport::{BodyStream, TransportError};

const WAIT_SLICE: Duration = Duration::from_millis(100);

/// An in-flight transfer. The handle is detached from the multi on drop,
/// which aborts the transfer and closes its connection.
pub(super) struct Transfer {
    handle: Easy2Handle<BodyHandler>,
    multi: Multi,
    outcome: Option<Result<(), curl::Error>>,
}

impl Transfer {
    pub(super) fn new(multi: Multi, handle: Easy2Handle<BodyHandler>) -> Self {
        Self {
            handle,
            multi,
            outcome: None,
        }
    }

    pub(super) fn handler(&self) -> &BodyHandler {
        self.handle.get_ref()
    }

    fn finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Runs one perform/wait round. Resumes a paused transfer once the reader
    /// has drained the buffer.
    fn step(&mut self) -> Result<(), TransportError> {
        if self.handle.get_ref().paused && self.handle.get_ref().buffered.is_empty() {
            self.handle.get_mut().paused = false;
            self.handle.unpause_write()?;
        }
        let running = self.multi.perform()?;
        let mut outcome = None;
        let handle = &self.handle;
        self.multi.messages(|msg| {
            if let Some(res) = msg.result_for2(handle) {
                outcome = Some(res);
            }
        });
        if let Some(ref res) = outcome {
            tracing::trace!(
                buffered = self.handle.get_ref().buffered.len(),
                "transfer finished: {:?}",
                res
            );
            self.outcome = outcome;
            return Ok(());
        }
        let handler = self.handle.get_ref();
        if running > 0 && handler.buffered.is_empty() && !handler.paused {
            self.multi.wait(&mut [], WAIT_SLICE)?;
        }
        Ok(())
    }

    /// Blocks until the final response headers are in (or the transfer ended).
    pub(super) fn await_headers(&mut self) -> Result<(), TransportError> {
        while !self.handler().headers_complete {
            match &self.outcome {
                Some(Err(e)) => return Err(TransportError::Curl(e.clone())),
                Some(Ok(())) => break,
                None => self.step()?,
            }
        }
        if self.handler().status().is_none() {
            return Err(TransportError::Protocol(
                "response ended without a status line".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response body of a curl connection.
pub struct CurlBody {
    transfer: Transfer,
}

impl CurlBody {
    pub(super) fn new(transfer: Transfer) -> Self {
        Self { transfer }
    }
}

impl Read for CurlBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let n = self.transfer.handle.get_mut().drain_into(buf);
            if n > 0 {
                return Ok(n);
            }
            if self.transfer.finished() {
                return match &self.transfer.outcome {
                    Some(Err(e)) => Err(TransportError::Curl(e.clone()).into()),
                    _ => Ok(0),
                };
            }
            self.transfer.step()?;
        }
    }
}

impl BodyStream for CurlBody {}
