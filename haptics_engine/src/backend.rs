//! Sinks for rendered frames

use crate::mixer::RenderedFrame;
use crate::openxr::OpenXrBackend;
use haptics_shared::{Channel, HapticsResult, NullBackendStats, CHANNEL_COUNT};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Null,
    Callback,
    PlatformRuntime,
    OpenXr,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Null => "null",
            BackendKind::Callback => "callback",
            BackendKind::PlatformRuntime => "platform runtime",
            BackendKind::OpenXr => "openxr",
        };
        f.write_str(name)
    }
}

pub trait HapticsBackend: Send {
    fn kind(&self) -> BackendKind;

    /// Emit one tick of vibration on `frame.channel`.
    fn render(&mut self, frame: &RenderedFrame) -> HapticsResult<()>;

    /// The channel was driven on an earlier tick and is silent now.
    fn silence(&mut self, _channel: Channel) -> HapticsResult<()> {
        Ok(())
    }

    fn set_suspended(&mut self, _suspended: bool) {}

    /// Called once, after the render thread has exited.
    fn shutdown(&mut self) {}

    fn null_stats(&self) -> Option<NullBackendStats> {
        None
    }

    fn as_openxr(&mut self) -> Option<&mut OpenXrBackend> {
        None
    }
}

/// Emits nothing, only counts what it would have played
#[derive(Debug, Default)]
pub struct NullBackend {
    stats: NullBackendStats,
    streaming: [bool; CHANNEL_COUNT],
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HapticsBackend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Null
    }

    fn render(&mut self, frame: &RenderedFrame) -> HapticsResult<()> {
        let streaming = &mut self.streaming[frame.channel.index()];
        if !*streaming {
            *streaming = true;
            self.stats.stream_count += 1;
        }
        self.stats.play_call_count += 1;
        Ok(())
    }

    fn silence(&mut self, channel: Channel) -> HapticsResult<()> {
        self.streaming[channel.index()] = false;
        Ok(())
    }

    fn null_stats(&self) -> Option<NullBackendStats> {
        Some(self.stats)
    }
}

type FrameCallback = Box<dyn FnMut(&RenderedFrame) + Send>;

/// Hands every rendered frame to a caller-supplied closure
pub struct CallbackBackend {
    callback: FrameCallback,
}

impl CallbackBackend {
    /// `callback` runs on the render thread with the engine locked. It must
    /// not call back into the SDK, or the tick never finishes.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&RenderedFrame) + Send + 'static,
    {
        Self { callback: Box::new(callback) }
    }
}

impl HapticsBackend for CallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Callback
    }

    fn render(&mut self, frame: &RenderedFrame) -> HapticsResult<()> {
        (self.callback)(frame);
        Ok(())
    }
}
