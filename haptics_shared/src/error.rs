use crate::{ClipId, PlayerId};
use thiserror::Error;

/// Signed result codes of the SDK surface. `>= 0` is success, `< 0` an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    Success = 0,
    Error = -1,
    InitializationFailed = -2,
    AlreadyInitialized = -3,
    AlreadyUninitialized = -4,
    NotInitialized = -5,
    InvalidUtf8 = -6,
    LoadClipFailed = -7,
    CreatePlayerFailed = -8,
    ClipIdInvalid = -9,
    PlayerIdInvalid = -10,
    InvalidAmplitude = -11,
    InvalidFrequencyShift = -12,
    InvalidPriority = -13,
    NoClipLoaded = -14,
    InvalidSeekPosition = -15,
}

impl ResultCode {
    pub fn succeeded(self) -> bool {
        (self as i32) >= 0
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HapticsError {
    #[error("{0}")]
    Error(String),

    #[error("instance failed to be created: {0}")]
    InitializationFailed(String),

    #[error("instance already initialized")]
    AlreadyInitialized,

    #[error("instance already uninitialized")]
    AlreadyUninitialized,

    #[error("instance has not been initialized")]
    NotInitialized,

    #[error("haptic clip data was not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("failed to parse haptic clip: {0}")]
    ParseFailed(String),

    #[error("failed to load clip: {0}")]
    LoadClipFailed(String),

    #[error("failed to create player: {0}")]
    CreatePlayerFailed(String),

    #[error("clip ID {0} is invalid")]
    InvalidClipHandle(ClipId),

    #[error("player ID {0} is invalid")]
    InvalidPlayerHandle(PlayerId),

    #[error("amplitude {0} is invalid, it must be a finite value of 0.0 or larger")]
    InvalidAmplitude(f32),

    #[error("frequency shift {0} is invalid, it must be between -1.0 and 1.0")]
    InvalidFrequencyShift(f32),

    #[error("priority {0} is invalid, it must be between 0 and 1024")]
    InvalidPriority(u32),

    #[error("player {0} has no clip loaded")]
    NoClipLoaded(PlayerId),

    #[error("seek position {time} is invalid, it must be between 0.0 and the clip duration {duration}")]
    InvalidSeekPosition { time: f32, duration: f32 },

    #[error("controller value {0} is invalid")]
    InvalidController(i32),
}

impl HapticsError {
    pub fn code(&self) -> ResultCode {
        match self {
            HapticsError::Error(_) | HapticsError::InvalidController(_) => ResultCode::Error,
            HapticsError::InitializationFailed(_) => ResultCode::InitializationFailed,
            HapticsError::AlreadyInitialized => ResultCode::AlreadyInitialized,
            HapticsError::AlreadyUninitialized => ResultCode::AlreadyUninitialized,
            HapticsError::NotInitialized => ResultCode::NotInitialized,
            HapticsError::InvalidEncoding(_) => ResultCode::InvalidUtf8,
            HapticsError::ParseFailed(_) | HapticsError::LoadClipFailed(_) => ResultCode::LoadClipFailed,
            HapticsError::CreatePlayerFailed(_) => ResultCode::CreatePlayerFailed,
            HapticsError::InvalidClipHandle(_) => ResultCode::ClipIdInvalid,
            HapticsError::InvalidPlayerHandle(_) => ResultCode::PlayerIdInvalid,
            HapticsError::InvalidAmplitude(_) => ResultCode::InvalidAmplitude,
            HapticsError::InvalidFrequencyShift(_) => ResultCode::InvalidFrequencyShift,
            HapticsError::InvalidPriority(_) => ResultCode::InvalidPriority,
            HapticsError::NoClipLoaded(_) => ResultCode::NoClipLoaded,
            HapticsError::InvalidSeekPosition { .. } => ResultCode::InvalidSeekPosition,
        }
    }
}

pub type HapticsResult<T> = std::result::Result<T, HapticsError>;
