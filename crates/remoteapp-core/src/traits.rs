//! Traits for the transport and the owning session.

use thiserror::Error;

use crate::{
    AbortStatus, ChannelResult, MessageGate, PubSub, RailEventStore, RemoteAppSettings,
    orders::{ClientStatusOrder, ExecOrder, HandshakeOrder, SysParamOrder},
};

/// Client-side send primitives of the RAIL channel.
///
/// Implemented by the transport. Each call encodes and sends one PDU and
/// reports the transport status; none of them take the message gate.
pub trait RailClient: Send + Sync {
    /// Send the client Handshake PDU.
    fn client_handshake(&self, order: &HandshakeOrder) -> ChannelResult;

    /// Send the Client Information PDU.
    fn client_information(&self, order: &ClientStatusOrder) -> ChannelResult;

    /// Send a Client System Parameters Update PDU.
    fn client_system_param(&self, order: &SysParamOrder) -> ChannelResult;

    /// Send the Client Execute PDU.
    fn client_execute(&self, order: &ExecOrder) -> ChannelResult;
}

/// Plugin load error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PluginLoadError {
    #[error("Channel plugin not available: {0}")]
    NotAvailable(String),
    #[error("Channel plugin {name} failed to load: {reason}")]
    Failed { name: String, reason: String },
}

/// Loader for the transport's native channel plugins.
pub trait ChannelLoader: Send + Sync {
    /// Load the plugin backing the named channel.
    ///
    /// # Errors
    /// Returns error if the plugin is unavailable or fails to initialize.
    fn load_channel_plugin(
        &self,
        name: &str,
        settings: &RemoteAppSettings,
    ) -> Result<(), PluginLoadError>;
}

/// What the RAIL handlers need from the owning session.
pub trait RailSession: Send + Sync {
    /// Read-only RemoteApp settings.
    fn settings(&self) -> &RemoteAppSettings;

    /// The session-wide control message gate.
    fn message_gate(&self) -> &MessageGate;

    /// Terminate the session with the given status and reason.
    fn abort(&self, status: AbortStatus, reason: &str);

    /// Event log observers can follow.
    fn events(&self) -> &RailEventStore;
}

/// Session context handed to plugin bootstrap.
pub trait RdpContext: RailSession {
    /// Channel plugin loader.
    fn channels(&self) -> &dyn ChannelLoader;

    /// Channel notification bus.
    fn pubsub(&self) -> &PubSub;
}
