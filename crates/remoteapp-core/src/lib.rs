//! Core abstractions for the RemoteApp (RAIL) channel.
//!
//! This crate provides the fundamental building blocks:
//! - `ChannelResult` - Transport status codes
//! - RAIL order types and protocol constants
//! - `RemoteAppSettings` - Read-only session configuration
//! - `MessageGate` - Serialized control-message sends
//! - `PubSub` - Channel-connected notifications
//! - `RailEventStore` - Broadcast + history of RAIL events
//! - Transport and session traits

pub mod event_store;
pub mod gate;
pub mod orders;
pub mod pubsub;
pub mod settings;
pub mod status;
pub mod traits;

#[cfg(feature = "loopback")]
pub mod loopback;

pub use event_store::{RailEvent, RailEventStore};
pub use gate::MessageGate;
pub use orders::{CLIENT_BUILD_NUMBER, RAIL_CHANNEL_NAME};
pub use pubsub::{ChannelConnectedEvent, PubSub, SubscriptionId};
pub use settings::{RemoteAppSettings, SettingsError};
pub use status::{AbortStatus, ChannelError, ChannelResult};
pub use traits::{ChannelLoader, PluginLoadError, RailClient, RailSession, RdpContext};
