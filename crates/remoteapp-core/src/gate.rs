//! Session-wide serialization of outbound control messages.

use std::sync::{Mutex, PoisonError};

use crate::ChannelResult;

/// Ensures only one control message is in flight to the server at a time.
///
/// Scoped to the session: every component sending control messages on the
/// session goes through the same gate, whichever thread it runs on. The lock
/// itself is never handed out.
#[derive(Debug, Default)]
pub struct MessageGate {
    lock: Mutex<()>,
}

impl MessageGate {
    /// Create a new gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock: Mutex::new(()),
        }
    }

    /// Run one send primitive while holding the gate.
    ///
    /// The gate is released when `send` returns, whatever its outcome, and
    /// the transport's status is returned unchanged. No retries.
    ///
    /// # Errors
    /// Returns the error reported by `send`.
    pub fn send<F>(&self, send: F) -> ChannelResult
    where
        F: FnOnce() -> ChannelResult,
    {
        // The gate guards no data, so a panic in another sender leaves
        // nothing inconsistent.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let result = send();
        tracing::trace!(ok = result.is_ok(), "control message sent");
        result
    }
}
