use crate::backend::{BackendKind, HapticsBackend};
use crate::clip_store::ClipStore;
use crate::config::EngineConfig;
use crate::mixer::Mixer;
use crate::openxr::OpenXrBackend;
use crate::player::{PlaybackState, Player};
use haptics_shared::{
    Channel, ClipId, Controller, HapticsError, HapticsResult, NullBackendStats, PlayerId, CHANNEL_COUNT,
};
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// All playback state of one initialized instance.
///
/// Every method runs under the instance's engine lock, either on behalf of an
/// API call or of the render thread's tick.
pub struct HapticsEngine {
    clips: ClipStore,
    players: HashMap<PlayerId, Player>,
    next_player_id: i32,
    mixer: Mixer,
    backend: Box<dyn HapticsBackend>,
    suspended: bool,
    /// Source of recency stamps for players entering `Playing`
    play_sequence: u64,
    /// Channels that received a frame on the previous tick
    driven: [bool; CHANNEL_COUNT],
    tick_count: u64,
}

impl HapticsEngine {
    pub fn new(backend: Box<dyn HapticsBackend>, config: &EngineConfig) -> Self {
        Self {
            clips: ClipStore::new(),
            players: HashMap::new(),
            next_player_id: 0,
            mixer: Mixer::new(config.tick_interval()),
            backend,
            suspended: false,
            play_sequence: 0,
            driven: [false; CHANNEL_COUNT],
            tick_count: 0,
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // --- clips ---

    pub fn load_clip(&mut self, data: &[u8]) -> HapticsResult<ClipId> {
        self.clips.load(data)
    }

    pub fn clip_duration(&self, clip: ClipId) -> HapticsResult<f32> {
        self.clips.duration(clip)
    }

    pub fn release_clip(&mut self, clip: ClipId) -> HapticsResult<()> {
        self.clips.release(clip)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    // --- players ---

    pub fn create_player(&mut self) -> HapticsResult<PlayerId> {
        let id = PlayerId(self.next_player_id);
        self.next_player_id = self
            .next_player_id
            .checked_add(1)
            .ok_or_else(|| HapticsError::CreatePlayerFailed("player identifier space exhausted".to_string()))?;
        self.players.insert(id, Player::new(id));
        debug!(player = id.0, "created player");
        Ok(id)
    }

    pub fn release_player(&mut self, player: PlayerId) -> HapticsResult<()> {
        let mut removed = self
            .players
            .remove(&player)
            .ok_or(HapticsError::InvalidPlayerHandle(player))?;
        removed.release();
        debug!(player = player.0, "released player");
        Ok(())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    fn player(&self, player: PlayerId) -> HapticsResult<&Player> {
        self.players.get(&player).ok_or(HapticsError::InvalidPlayerHandle(player))
    }

    fn player_mut(&mut self, player: PlayerId) -> HapticsResult<&mut Player> {
        self.players
            .get_mut(&player)
            .ok_or(HapticsError::InvalidPlayerHandle(player))
    }

    fn next_stamp(&mut self) -> u64 {
        self.play_sequence += 1;
        self.play_sequence
    }

    pub fn player_set_clip(&mut self, player: PlayerId, clip: ClipId) -> HapticsResult<()> {
        // validate both handles before touching the player
        self.player(player)?;
        let data = self.clips.get(clip)?;
        self.player_mut(player)?.set_clip(clip, data);
        debug!(player = player.0, clip = clip.0, "bound clip");
        Ok(())
    }

    pub fn player_play(&mut self, player: PlayerId, controller: Controller) -> HapticsResult<()> {
        self.player(player)?;
        let stamp = self.next_stamp();
        self.player_mut(player)?.play(controller, stamp)?;
        debug!(player = player.0, ?controller, stamp, "play");
        Ok(())
    }

    pub fn player_pause(&mut self, player: PlayerId) -> HapticsResult<()> {
        self.player_mut(player)?.pause()?;
        debug!(player = player.0, "pause");
        Ok(())
    }

    pub fn player_resume(&mut self, player: PlayerId) -> HapticsResult<()> {
        self.player(player)?;
        let stamp = self.next_stamp();
        self.player_mut(player)?.resume(stamp)?;
        debug!(player = player.0, "resume");
        Ok(())
    }

    pub fn player_stop(&mut self, player: PlayerId) -> HapticsResult<()> {
        self.player_mut(player)?.stop()?;
        debug!(player = player.0, "stop");
        Ok(())
    }

    pub fn player_seek(&mut self, player: PlayerId, time: f32) -> HapticsResult<()> {
        self.player_mut(player)?.seek(time)?;
        debug!(player = player.0, time, "seek");
        Ok(())
    }

    pub fn player_set_amplitude(&mut self, player: PlayerId, amplitude: f32) -> HapticsResult<()> {
        self.player_mut(player)?.set_amplitude(amplitude)
    }

    pub fn player_amplitude(&self, player: PlayerId) -> HapticsResult<f32> {
        Ok(self.player(player)?.amplitude())
    }

    pub fn player_set_frequency_shift(&mut self, player: PlayerId, shift: f32) -> HapticsResult<()> {
        self.player_mut(player)?.set_frequency_shift(shift)
    }

    pub fn player_frequency_shift(&self, player: PlayerId) -> HapticsResult<f32> {
        Ok(self.player(player)?.frequency_shift())
    }

    pub fn player_set_looping(&mut self, player: PlayerId, looping: bool) -> HapticsResult<()> {
        self.player_mut(player)?.set_looping(looping);
        Ok(())
    }

    pub fn player_looping(&self, player: PlayerId) -> HapticsResult<bool> {
        Ok(self.player(player)?.looping())
    }

    pub fn player_set_priority(&mut self, player: PlayerId, priority: u32) -> HapticsResult<()> {
        self.player_mut(player)?.set_priority(priority)
    }

    pub fn player_priority(&self, player: PlayerId) -> HapticsResult<u32> {
        Ok(self.player(player)?.priority())
    }

    pub fn player_state(&self, player: PlayerId) -> HapticsResult<PlaybackState> {
        Ok(self.player(player)?.state())
    }

    pub fn player_position(&self, player: PlayerId) -> HapticsResult<f32> {
        Ok(self.player(player)?.position())
    }

    pub fn player_controller(&self, player: PlayerId) -> HapticsResult<Controller> {
        Ok(self.player(player)?.controller())
    }

    pub fn player_clip(&self, player: PlayerId) -> HapticsResult<Option<ClipId>> {
        Ok(self.player(player)?.clip_id())
    }

    // --- instance ---

    pub fn set_suspended(&mut self, suspended: bool) {
        if self.suspended == suspended {
            return;
        }
        if suspended {
            self.silence_all();
        }
        self.suspended = suspended;
        self.backend.set_suspended(suspended);
        info!(suspended, "suspend state changed");
    }

    pub fn suspended(&self) -> bool {
        self.suspended
    }

    pub fn null_backend_statistics(&self) -> HapticsResult<NullBackendStats> {
        self.backend.null_stats().ok_or_else(|| {
            HapticsError::Error(format!("the {} backend keeps no null backend statistics", self.backend.kind()))
        })
    }

    pub fn openxr(&mut self) -> HapticsResult<&mut OpenXrBackend> {
        let kind = self.backend.kind();
        self.backend
            .as_openxr()
            .ok_or_else(|| HapticsError::Error(format!("the {} backend is not an OpenXR backend", kind)))
    }

    /// One mixer pass: advance cursors, pick winners, hand frames to the backend
    pub fn tick(&mut self) {
        if self.suspended {
            return;
        }
        self.tick_count += 1;

        let frames = self.mixer.tick(&mut self.players);
        for channel in Channel::ALL {
            let slot = channel.index();
            match &frames[slot] {
                Some(frame) => {
                    trace!(%channel, player = frame.player.0, amplitude = frame.amplitude, "frame");
                    if let Err(e) = self.backend.render(frame) {
                        warn!(%channel, error = %e, "backend failed to render frame");
                    }
                    self.driven[slot] = true;
                }
                None if self.driven[slot] => self.silence(channel),
                None => {}
            }
        }
    }

    fn silence(&mut self, channel: Channel) {
        self.driven[channel.index()] = false;
        if let Err(e) = self.backend.silence(channel) {
            warn!(%channel, error = %e, "backend failed to silence channel");
        }
    }

    fn silence_all(&mut self) {
        for channel in Channel::ALL {
            if self.driven[channel.index()] {
                self.silence(channel);
            }
        }
    }

    /// Stops and releases every player and clip
    pub fn release_all(&mut self) {
        for player in self.players.values_mut() {
            player.release();
        }
        self.silence_all();
        let players = self.players.len();
        let clips = self.clips.len();
        self.players.clear();
        self.clips.clear();
        info!(players, clips, "released all players and clips");
    }

    pub fn shutdown_backend(&mut self) {
        self.backend.shutdown();
    }
}
