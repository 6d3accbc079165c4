//! Holder for the channel's single open response body.

/// At most one body is held. Installing a new one always goes through
/// `reopen`, which releases the current body before the new request is made.
pub(super) struct BodySlot<B> {
    current: Option<B>,
}

impl<B> BodySlot<B> {
    pub(super) fn empty() -> Self {
        Self { current: None }
    }

    pub(super) fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub(super) fn get_mut(&mut self) -> Option<&mut B> {
        self.current.as_mut()
    }

    /// Drops the current body (aborting its transfer), if any.
    pub(super) fn release(&mut self) {
        self.current = None;
    }

    /// Releases the current body, then stores whatever `open` produces.
    /// On error the slot stays empty.
    pub(super) fn reopen<E>(&mut self, open: impl FnOnce() -> Result<B, E>) -> Result<&mut B, E> {
        self.release();
        let body = open()?;
        Ok(self.current.insert(body))
    }
}
