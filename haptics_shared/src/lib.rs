use serde::{Deserialize, Serialize};
use std::fmt;

pub mod clip_format;
pub mod error;

pub use error::{HapticsError, HapticsResult, ResultCode};

/// Identifier written to out-parameters when an allocation fails
pub const INVALID_ID: i32 = -1;

pub const DEFAULT_AMPLITUDE: f32 = 1.0;
pub const DEFAULT_FREQUENCY_SHIFT: f32 = 0.0;
pub const DEFAULT_PRIORITY: u32 = 512;
pub const MAX_PRIORITY: u32 = 1024;

// Render rate of the documented native runtime
pub const DEFAULT_TICK_RATE_HZ: u32 = 50;

/// Handle of a loaded clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub i32);

/// Handle of a clip player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub i32);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single physical actuator output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Left,
    Right,
}

pub const CHANNEL_COUNT: usize = 2;

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Left, Channel::Right];

    pub fn index(self) -> usize {
        match self {
            Channel::Left => 0,
            Channel::Right => 1,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Left => write!(f, "left"),
            Channel::Right => write!(f, "right"),
        }
    }
}

/// Selects on which controller a haptic clip plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum Controller {
    Left = 0,
    Right = 1,
    Both = 2,
}

impl Controller {
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(Controller::Left),
            1 => Some(Controller::Right),
            2 => Some(Controller::Both),
            _ => None,
        }
    }

    /// Whether a player targeting this controller may drive `channel`
    pub fn drives(self, channel: Channel) -> bool {
        match self {
            Controller::Left => channel == Channel::Left,
            Controller::Right => channel == Channel::Right,
            Controller::Both => true,
        }
    }
}

impl TryFrom<i32> for Controller {
    type Error = HapticsError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Controller::from_raw(value).ok_or(HapticsError::InvalidController(value))
    }
}

/// Severity passed to log callbacks. Higher is more important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct SdkVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

/// Counters kept by the null backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct NullBackendStats {
    /// Number of vibration streams started (silence -> active transitions)
    pub stream_count: i64,
    /// Number of rendered frames handed to the backend
    pub play_call_count: i64,
}

/// Strings identifying the embedding game engine to a platform runtime
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameEngineInfo {
    pub name: String,
    pub version: String,
    pub haptics_sdk_version: String,
}

impl GameEngineInfo {
    pub fn validate(&self) -> HapticsResult<()> {
        let fields = [
            ("game engine name", &self.name),
            ("game engine version", &self.version),
            ("game engine haptics SDK version", &self.haptics_sdk_version),
        ];
        for (label, value) in fields {
            if value.trim().is_empty() {
                return Err(HapticsError::InitializationFailed(format!("{} must not be empty", label)));
            }
        }
        Ok(())
    }
}
