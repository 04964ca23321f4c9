//! Backend forwarding frames to the platform's haptics runtime

use crate::backend::{BackendKind, HapticsBackend};
use crate::mixer::RenderedFrame;
use haptics_shared::{Channel, GameEngineInfo, HapticsResult};
use tracing::{info, warn};

/// The device runtime on the other side of the platform backend
pub trait PlatformRuntime: Send {
    fn play(&mut self, frame: &RenderedFrame) -> HapticsResult<()>;
    fn stop(&mut self, channel: Channel) -> HapticsResult<()>;
}

pub struct PlatformBackend {
    runtime: Box<dyn PlatformRuntime>,
}

impl PlatformBackend {
    pub fn new(game_engine: GameEngineInfo, runtime: Box<dyn PlatformRuntime>) -> HapticsResult<Self> {
        game_engine.validate()?;
        info!(
            engine = %game_engine.name,
            engine_version = %game_engine.version,
            sdk_version = %game_engine.haptics_sdk_version,
            "connected to platform haptics runtime"
        );
        Ok(Self { runtime })
    }
}

impl HapticsBackend for PlatformBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::PlatformRuntime
    }

    fn render(&mut self, frame: &RenderedFrame) -> HapticsResult<()> {
        self.runtime.play(frame)
    }

    fn silence(&mut self, channel: Channel) -> HapticsResult<()> {
        self.runtime.stop(channel)
    }

    fn shutdown(&mut self) {
        for channel in Channel::ALL {
            if let Err(e) = self.runtime.stop(channel) {
                warn!(%channel, error = %e, "platform runtime failed to stop channel");
            }
        }
    }
}
