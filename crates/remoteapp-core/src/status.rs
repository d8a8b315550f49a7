//! Channel return codes and session abort classifications.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel return codes reported by the transport.
///
/// Zero is success and never appears inside a [`ChannelError`].
pub mod rc {
    pub const OK: u32 = 0;
    pub const NOT_INITIALIZED: u32 = 2;
    pub const NOT_CONNECTED: u32 = 4;
    pub const NULL_DATA: u32 = 16;
    pub const INITIALIZATION_ERROR: u32 = 20;
}

/// Non-OK status returned by a channel operation.
///
/// The raw transport code is carried unchanged so callers further up can
/// hand it back to the transport as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("channel operation failed with code {code:#x}")]
pub struct ChannelError {
    code: u32,
}

impl ChannelError {
    /// Wrap a non-zero transport code.
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self { code }
    }

    /// The raw transport code.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.code
    }
}

/// Result of a channel operation; `Ok(())` is the transport's OK status.
pub type ChannelResult = Result<(), ChannelError>;

/// Convert a raw transport status into a [`ChannelResult`].
#[must_use]
pub const fn channel_result(code: u32) -> ChannelResult {
    if code == rc::OK {
        Ok(())
    } else {
        Err(ChannelError::new(code))
    }
}

/// Collapse a [`ChannelResult`] back into a raw transport status.
#[must_use]
pub const fn status_code(result: ChannelResult) -> u32 {
    match result {
        Ok(()) => rc::OK,
        Err(e) => e.code(),
    }
}

/// Status classification used when the owning session is aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortStatus {
    /// Internal failure on the client side.
    ServerError,
    /// The remote desktop server returned an error.
    UpstreamError,
    /// The requested remote resource does not exist.
    UpstreamNotFound,
    /// The remote desktop server cannot provide what was requested.
    UpstreamUnavailable,
}

impl AbortStatus {
    /// Protocol status code for this classification.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::ServerError => 0x0200,
            Self::UpstreamError => 0x0203,
            Self::UpstreamNotFound => 0x0207,
            Self::UpstreamUnavailable => 0x0208,
        }
    }
}
