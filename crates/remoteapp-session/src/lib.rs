//! RDP session host for the RemoteApp channel.
//!
//! Provides:
//! - `RdpSession` - Owns settings, message gate, notifications and abort state

pub mod session;

pub use session::{AbortRecord, RdpSession};
