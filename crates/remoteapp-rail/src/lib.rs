//! RemoteApp (RAIL) channel handshake and execution.
//!
//! Provides:
//! - `RailClientContext` - Per-activation channel context with dispatch slots
//! - `complete_handshake` - The four-order startup sequence
//! - `RemoteAppHandlers` - Inbound server event handlers
//! - `load_plugin` - Plugin bootstrap and channel activation listener

pub mod context;
pub mod handlers;
pub mod handshake;
pub mod plugin;

pub use context::{RailClientContext, RailServerEvents, RailState};
pub use handlers::RemoteAppHandlers;
pub use handshake::complete_handshake;
pub use plugin::{channel_connected, load_plugin};
