//! Per-activation RAIL channel context.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock, Weak},
};

use remoteapp_core::{
    ChannelResult, RailClient, RailSession,
    orders::{ExecResultOrder, HandshakeExOrder, HandshakeOrder},
};

/// Handlers for orders received from the server.
///
/// Installed into a [`RailClientContext`] once the channel connects. Each
/// returns the status handed back to the transport.
pub trait RailServerEvents: Send + Sync {
    /// Handshake PDU received.
    fn handshake(&self, rail: &RailClientContext, order: &HandshakeOrder) -> ChannelResult;

    /// HandshakeEx PDU received.
    fn handshake_ex(&self, rail: &RailClientContext, order: &HandshakeExOrder) -> ChannelResult;

    /// Server Execute Result PDU received.
    fn execute_result(&self, rail: &RailClientContext, order: &ExecResultOrder) -> ChannelResult;
}

/// Progress of one channel activation.
///
/// Only moves forward, one step at a time: an execute result arriving before
/// any handshake leaves the state at `AwaitingHandshake`. It is recorded for
/// observers and never used to suppress a repeated handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RailState {
    AwaitingHandshake,
    HandshakeComplete,
    ExecutionReported,
}

struct Registration {
    session: Weak<dyn RailSession>,
    handlers: Arc<dyn RailServerEvents>,
}

/// Context the transport creates for an active RAIL channel.
///
/// Owned by the transport. Session code only fills in the back-reference
/// and the handlers through [`RailClientContext::register`].
pub struct RailClientContext {
    client: Arc<dyn RailClient>,
    registration: RwLock<Option<Registration>>,
    state: RwLock<RailState>,
}

impl RailClientContext {
    /// Create a context around the channel's send primitives.
    #[must_use]
    pub fn new(client: Arc<dyn RailClient>) -> Self {
        Self {
            client,
            registration: RwLock::new(None),
            state: RwLock::new(RailState::AwaitingHandshake),
        }
    }

    /// Send primitives of this channel.
    #[must_use]
    pub fn client(&self) -> &dyn RailClient {
        self.client.as_ref()
    }

    /// Attach the owning session and install the server event handlers.
    ///
    /// Replaces any earlier registration.
    pub fn register(&self, session: Weak<dyn RailSession>, handlers: Arc<dyn RailServerEvents>) {
        *self
            .registration
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Registration { session, handlers });
    }

    /// Whether handlers have been installed.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The owning session, if registered and still alive.
    #[must_use]
    pub fn session(&self) -> Option<Arc<dyn RailSession>> {
        self.registration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|r| r.session.upgrade())
    }

    /// Current activation state.
    #[must_use]
    pub fn state(&self) -> RailState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver a Handshake PDU. OK if no handler is installed.
    ///
    /// # Errors
    /// Returns the handler's error.
    pub fn server_handshake(&self, order: &HandshakeOrder) -> ChannelResult {
        let Some(handlers) = self.handlers() else {
            return Ok(());
        };
        let result = handlers.handshake(self, order);
        self.advance(RailState::HandshakeComplete);
        result
    }

    /// Deliver a HandshakeEx PDU. OK if no handler is installed.
    ///
    /// # Errors
    /// Returns the handler's error.
    pub fn server_handshake_ex(&self, order: &HandshakeExOrder) -> ChannelResult {
        let Some(handlers) = self.handlers() else {
            return Ok(());
        };
        let result = handlers.handshake_ex(self, order);
        self.advance(RailState::HandshakeComplete);
        result
    }

    /// Deliver a Server Execute Result PDU. OK if no handler is installed.
    ///
    /// # Errors
    /// Returns the handler's error.
    pub fn server_execute_result(&self, order: &ExecResultOrder) -> ChannelResult {
        let Some(handlers) = self.handlers() else {
            return Ok(());
        };
        let result = handlers.execute_result(self, order);
        self.advance(RailState::ExecutionReported);
        result
    }

    // Cloned out so the handler runs without the registration lock held.
    fn handlers(&self) -> Option<Arc<dyn RailServerEvents>> {
        self.registration
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|r| Arc::clone(&r.handlers))
    }

    fn advance(&self, next: RailState) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = match (*state, next) {
            (RailState::AwaitingHandshake, RailState::ExecutionReported) => {
                RailState::AwaitingHandshake
            }
            (current, next) => current.max(next),
        };
    }
}

impl fmt::Debug for RailClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RailClientContext")
            .field("registered", &self.is_registered())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
