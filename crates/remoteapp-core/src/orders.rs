//! RAIL order types exchanged over the RemoteApp channel.
//!
//! These are the decoded forms handed to and received from the transport.
//! Framing and encoding are the transport's job.

use serde::{Deserialize, Serialize};

/// Well-known static channel name of the RAIL channel.
pub const RAIL_CHANNEL_NAME: &str = "rail";

/// Build number sent in the client handshake.
///
/// 7600 is Windows 7 / RDP 7.0, the most widely accepted RAIL client
/// baseline.
pub const CLIENT_BUILD_NUMBER: u32 = 7600;

/// Handshake PDU (sent by both server and client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeOrder {
    pub build_number: u32,
}

/// HandshakeEx PDU (server only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeExOrder {
    pub build_number: u32,
    pub rail_handshake_flags: u32,
}

/// Client status flags.
pub mod client_status {
    pub const ALLOW_LOCAL_MOVE_SIZE: u32 = 0x0001;
    pub const AUTO_RECONNECT: u32 = 0x0002;
    pub const ZORDER_SYNC: u32 = 0x0004;
    pub const WINDOW_RESIZE_MARGIN_SUPPORTED: u32 = 0x0010;
    pub const HIGH_DPI_ICONS_SUPPORTED: u32 = 0x0020;
    pub const APPBAR_REMOTING_SUPPORTED: u32 = 0x0040;
    pub const POWER_DISPLAY_REQUEST_SUPPORTED: u32 = 0x0080;
    pub const BIDIRECTIONAL_CLOAK_SUPPORTED: u32 = 0x0200;
}

/// Client Information PDU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatusOrder {
    pub flags: u32,
}

/// High contrast flags.
pub mod hcf {
    pub const HIGH_CONTRAST_ON: u32 = 0x0000_0001;
    pub const AVAILABLE: u32 = 0x0000_0002;
    pub const HOTKEY_ACTIVE: u32 = 0x0000_0004;
    pub const CONFIRM_HOTKEY: u32 = 0x0000_0008;
    pub const HOTKEY_SOUND: u32 = 0x0000_0010;
    pub const INDICATOR: u32 = 0x0000_0020;
    pub const HOTKEY_AVAILABLE: u32 = 0x0000_0040;
}

/// Masks naming which system parameters a [`SysParamOrder`] sets.
pub mod spi_mask {
    pub const SET_DRAG_FULL_WINDOWS: u32 = 0x0000_0001;
    pub const SET_KEYBOARD_CUES: u32 = 0x0000_0002;
    pub const SET_KEYBOARD_PREF: u32 = 0x0000_0004;
    pub const SET_MOUSE_BUTTON_SWAP: u32 = 0x0000_0008;
    pub const SET_WORK_AREA: u32 = 0x0000_0010;
    pub const SET_HIGH_CONTRAST: u32 = 0x0000_0020;
    pub const SET_CARET_WIDTH: u32 = 0x0000_0040;
    pub const SET_STICKY_KEYS: u32 = 0x0000_0080;
    pub const SET_TOGGLE_KEYS: u32 = 0x0000_0100;
    pub const SET_FILTER_KEYS: u32 = 0x0000_0200;
    pub const DISPLAY_CHANGE: u32 = 0x0000_0400;
    pub const TASKBAR_POS: u32 = 0x0000_0800;
}

/// High contrast accessibility settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighContrast {
    pub flags: u32,
    pub color_scheme: Option<String>,
}

/// Inclusive-exclusive 16-bit rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rectangle16 {
    pub left: u16,
    pub top: u16,
    pub right: u16,
    pub bottom: u16,
}

/// Client System Parameters Update PDU.
///
/// Only the parameters named in `params` are meaningful to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysParamOrder {
    pub params: u32,
    pub drag_full_windows: bool,
    pub high_contrast: HighContrast,
    pub keyboard_cues: bool,
    pub keyboard_pref: bool,
    pub mouse_button_swap: bool,
    pub work_area: Rectangle16,
}

/// Client Execute PDU flags.
pub mod exec_flags {
    pub const EXPAND_WORKING_DIRECTORY: u16 = 0x0001;
    pub const TRANSLATE_FILES: u16 = 0x0002;
    pub const FILE: u16 = 0x0004;
    pub const EXPAND_ARGUMENTS: u16 = 0x0008;
    pub const APP_USER_MODEL_ID: u16 = 0x0010;
}

/// Client Execute PDU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOrder {
    pub flags: u16,
    pub program: String,
    pub working_dir: Option<String>,
    pub arguments: Option<String>,
}

/// Server Execute Result PDU.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecResultOrder {
    pub flags: u16,
    pub exec_result: u16,
    pub raw_result: u32,
    pub exe_or_file: String,
}

impl ExecResultOrder {
    /// Decoded result code.
    #[must_use]
    pub const fn result(&self) -> ExecResult {
        ExecResult::from_code(self.exec_result)
    }
}

/// Execution result reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecResult {
    Ok,
    HookNotLoaded,
    DecodeFailed,
    NotInAllowList,
    FileNotFound,
    Fail,
    SessionLocked,
    Unknown(u16),
}

impl ExecResult {
    /// Map a raw result code.
    #[must_use]
    pub const fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::HookNotLoaded,
            2 => Self::DecodeFailed,
            3 => Self::NotInAllowList,
            5 => Self::FileNotFound,
            6 => Self::Fail,
            7 => Self::SessionLocked,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Short human-readable description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::HookNotLoaded => "shell hook not loaded",
            Self::DecodeFailed => "execute request could not be decoded",
            Self::NotInAllowList => "program is not in the allow list",
            Self::FileNotFound => "program not found",
            Self::Fail => "execution failed",
            Self::SessionLocked => "remote session is locked",
            Self::Unknown(_) => "unknown result",
        }
    }
}
