//! RDP session owning the RemoteApp channel state.

use std::sync::{Arc, OnceLock};

use remoteapp_core::{
    AbortStatus, ChannelLoader, MessageGate, PubSub, RailEvent, RailEventStore, RailSession,
    RdpContext, RemoteAppSettings, SettingsError,
};

/// Why a session was aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortRecord {
    pub status: AbortStatus,
    pub reason: String,
}

/// An RDP session hosting the RemoteApp channel.
///
/// Holds the one message gate every control-message sender on the session
/// must go through.
pub struct RdpSession {
    settings: RemoteAppSettings,
    gate: MessageGate,
    pubsub: PubSub,
    channels: Arc<dyn ChannelLoader>,
    events: RailEventStore,
    aborted: OnceLock<AbortRecord>,
}

impl RdpSession {
    /// Create a new session.
    ///
    /// # Errors
    /// Returns error if the settings cannot drive a RemoteApp launch.
    pub fn new(
        settings: RemoteAppSettings,
        channels: Arc<dyn ChannelLoader>,
    ) -> Result<Arc<Self>, SettingsError> {
        settings.validate()?;
        Ok(Arc::new(Self {
            settings,
            gate: MessageGate::new(),
            pubsub: PubSub::new(),
            channels,
            events: RailEventStore::new(),
            aborted: OnceLock::new(),
        }))
    }

    /// Load RemoteApp support; see [`remoteapp_rail::load_plugin`].
    pub fn load_remote_app(self: &Arc<Self>) {
        remoteapp_rail::load_plugin(self);
    }

    /// Whether the session has been aborted.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.get().is_some()
    }

    /// The first abort, if any.
    #[must_use]
    pub fn abort_reason(&self) -> Option<&AbortRecord> {
        self.aborted.get()
    }
}

impl RailSession for RdpSession {
    fn settings(&self) -> &RemoteAppSettings {
        &self.settings
    }

    fn message_gate(&self) -> &MessageGate {
        &self.gate
    }

    /// Only the first abort takes effect.
    fn abort(&self, status: AbortStatus, reason: &str) {
        let record = AbortRecord {
            status,
            reason: reason.to_string(),
        };
        if self.aborted.set(record).is_err() {
            tracing::debug!(?status, reason, "Session already aborted");
            return;
        }

        tracing::error!(?status, code = status.code(), "Aborting session: {reason}");
        self.events.push(RailEvent::SessionAborted {
            status,
            reason: reason.to_string(),
        });
    }

    fn events(&self) -> &RailEventStore {
        &self.events
    }
}

impl RdpContext for RdpSession {
    fn channels(&self) -> &dyn ChannelLoader {
        self.channels.as_ref()
    }

    fn pubsub(&self) -> &PubSub {
        &self.pubsub
    }
}
