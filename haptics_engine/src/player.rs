//! Per-instance playback state machine
//!
//! ```text
//! Stopped --play--> Playing --pause--> Paused --resume|play--> Playing
//! Playing|Paused --stop--> Stopped
//! Playing --end of clip--> Stopped (or back to cursor 0 when looping)
//! Stopped --seek--> Paused (targeting both controllers)
//! ```

use crate::clip::{Clip, Sample};
use crate::mixer::render_sample;
use haptics_shared::{
    ClipId, Controller, HapticsError, HapticsResult, PlayerId, DEFAULT_AMPLITUDE, DEFAULT_FREQUENCY_SHIFT,
    DEFAULT_PRIORITY, MAX_PRIORITY,
};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Stopped => write!(f, "stopped"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
        }
    }
}

/// What happened to a player's cursor during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Not playing, cursor untouched
    Idle,
    Continued,
    /// Reached the end while looping, cursor back at 0
    Looped,
    /// Reached the end without looping, now stopped
    Finished,
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    clip: Option<(ClipId, Arc<Clip>)>,
    state: PlaybackState,
    cursor: f32,
    amplitude: f32,
    frequency_shift: f32,
    looping: bool,
    priority: u32,
    controller: Controller,
    started_at: u64,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            clip: None,
            state: PlaybackState::Stopped,
            cursor: 0.0,
            amplitude: DEFAULT_AMPLITUDE,
            frequency_shift: DEFAULT_FREQUENCY_SHIFT,
            looping: false,
            priority: DEFAULT_PRIORITY,
            controller: Controller::Both,
            started_at: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn clip_id(&self) -> Option<ClipId> {
        self.clip.as_ref().map(|(id, _)| *id)
    }

    pub fn clip(&self) -> Option<&Arc<Clip>> {
        self.clip.as_ref().map(|(_, clip)| clip)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Cursor position in seconds
    pub fn position(&self) -> f32 {
        self.cursor
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn frequency_shift(&self) -> f32 {
        self.frequency_shift
    }

    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn controller(&self) -> Controller {
        self.controller
    }

    /// Recency stamp of the last transition into `Playing`
    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    fn require_clip(&self) -> HapticsResult<&Arc<Clip>> {
        self.clip().ok_or(HapticsError::NoClipLoaded(self.id))
    }

    fn halt(&mut self) {
        self.state = PlaybackState::Stopped;
        self.cursor = 0.0;
    }

    /// Binds a clip, stopping any ongoing playback. Parameters are kept.
    pub fn set_clip(&mut self, id: ClipId, clip: Arc<Clip>) {
        if self.state != PlaybackState::Stopped {
            self.halt();
        }
        self.clip = Some((id, clip));
    }

    /// Starts playback from the beginning, or continues from the cursor when paused
    pub fn play(&mut self, controller: Controller, stamp: u64) -> HapticsResult<()> {
        self.require_clip()?;
        if self.state != PlaybackState::Paused {
            self.cursor = 0.0;
        }
        self.controller = controller;
        self.state = PlaybackState::Playing;
        self.started_at = stamp;
        Ok(())
    }

    pub fn pause(&mut self) -> HapticsResult<()> {
        self.require_clip()?;
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
        Ok(())
    }

    pub fn resume(&mut self, stamp: u64) -> HapticsResult<()> {
        self.require_clip()?;
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
            self.started_at = stamp;
        }
        Ok(())
    }

    pub fn stop(&mut self) -> HapticsResult<()> {
        self.require_clip()?;
        self.halt();
        Ok(())
    }

    /// Moves the cursor. A stopped player becomes paused on both controllers.
    pub fn seek(&mut self, time: f32) -> HapticsResult<()> {
        let duration = self.require_clip()?.duration();
        if !time.is_finite() || time < 0.0 || time > duration {
            return Err(HapticsError::InvalidSeekPosition { time, duration });
        }

        self.cursor = time;
        if self.state == PlaybackState::Stopped {
            self.state = PlaybackState::Paused;
            self.controller = Controller::Both;
        }
        Ok(())
    }

    pub fn set_amplitude(&mut self, amplitude: f32) -> HapticsResult<()> {
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(HapticsError::InvalidAmplitude(amplitude));
        }
        self.amplitude = amplitude;
        Ok(())
    }

    pub fn set_frequency_shift(&mut self, shift: f32) -> HapticsResult<()> {
        if !(-1.0..=1.0).contains(&shift) {
            return Err(HapticsError::InvalidFrequencyShift(shift));
        }
        self.frequency_shift = shift;
        Ok(())
    }

    pub fn set_priority(&mut self, priority: u32) -> HapticsResult<()> {
        if priority > MAX_PRIORITY {
            return Err(HapticsError::InvalidPriority(priority));
        }
        self.priority = priority;
        Ok(())
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Moves a playing cursor forward by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> Advance {
        if self.state != PlaybackState::Playing {
            return Advance::Idle;
        }
        let Some(duration) = self.clip().map(|clip| clip.duration()) else {
            self.halt();
            return Advance::Finished;
        };

        self.cursor += dt;
        if self.cursor < duration {
            return Advance::Continued;
        }

        if self.looping {
            self.cursor = 0.0;
            Advance::Looped
        } else {
            self.halt();
            Advance::Finished
        }
    }

    /// The modulated sample at the cursor, `None` unless playing
    pub fn render(&self) -> Option<Sample> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let clip = self.clip()?;
        Some(render_sample(clip.sample_at(self.cursor), self.amplitude, self.frequency_shift))
    }

    /// Stops and unbinds the clip, dropping this player's reference to it
    pub fn release(&mut self) {
        self.halt();
        self.clip = None;
    }
}
