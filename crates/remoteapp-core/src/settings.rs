//! RemoteApp session settings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Remote program must not be empty")]
    EmptyProgram,
    #[error("Invalid display size: {width}x{height}")]
    InvalidDisplaySize { width: u16, height: u16 },
}

/// Settings consumed by the RAIL handshake.
///
/// Resolved and owned by the surrounding session. The channel code only
/// reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAppSettings {
    /// Display width in pixels.
    pub width: u16,
    /// Display height in pixels.
    pub height: u16,
    /// Program to launch, e.g. `||notepad`.
    pub program: String,
    /// Working directory of the launched program.
    #[serde(default)]
    pub working_dir: Option<String>,
    /// Command-line arguments of the launched program.
    #[serde(default)]
    pub arguments: Option<String>,
}

impl RemoteAppSettings {
    /// Create settings with no working directory or arguments.
    #[must_use]
    pub fn new(width: u16, height: u16, program: impl Into<String>) -> Self {
        Self {
            width,
            height,
            program: program.into(),
            working_dir: None,
            arguments: None,
        }
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the program arguments.
    #[must_use]
    pub fn with_arguments(mut self, args: impl Into<String>) -> Self {
        self.arguments = Some(args.into());
        self
    }

    /// Check the settings can drive a RemoteApp launch.
    ///
    /// # Errors
    /// Returns error if the program is empty or the display has no area.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.program.trim().is_empty() {
            return Err(SettingsError::EmptyProgram);
        }
        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::InvalidDisplaySize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
