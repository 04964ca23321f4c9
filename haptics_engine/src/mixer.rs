use crate::clip::Sample;
use crate::player::{Advance, Player};
use haptics_shared::{Channel, PlayerId, CHANNEL_COUNT};
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

/// One tick worth of vibration for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedFrame {
    pub channel: Channel,
    pub player: PlayerId,
    pub duration: Duration,
    pub amplitude: f32,
    pub frequency: f32,
}

/// Output of one tick, indexed by `Channel::index()`. `None` means silent.
pub type MixedFrames = [Option<RenderedFrame>; CHANNEL_COUNT];

/// Applies a player's modulation to a clip sample, clamping both outputs to [0, 1]
pub fn render_sample(sample: Sample, amplitude: f32, frequency_shift: f32) -> Sample {
    Sample {
        amplitude: (sample.amplitude * amplitude).clamp(0.0, 1.0),
        frequency: (sample.frequency + frequency_shift).clamp(0.0, 1.0),
    }
}

pub struct Mixer {
    tick_interval: Duration,
}

impl Mixer {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    /// Advances every playing cursor, then renders the winner of each channel
    pub fn tick(&self, players: &mut HashMap<PlayerId, Player>) -> MixedFrames {
        let dt = self.tick_interval.as_secs_f32();
        for player in players.values_mut() {
            match player.advance(dt) {
                Advance::Finished => trace!(player = player.id().0, "clip finished"),
                Advance::Looped => trace!(player = player.id().0, "clip looped"),
                Advance::Idle | Advance::Continued => {}
            }
        }

        let mut frames: MixedFrames = [None; CHANNEL_COUNT];
        for channel in Channel::ALL {
            let Some(winner) = select_winner(players.values(), channel) else {
                continue;
            };
            let Some(sample) = winner.render() else {
                continue;
            };
            frames[channel.index()] = Some(RenderedFrame {
                channel,
                player: winner.id(),
                duration: self.tick_interval,
                amplitude: sample.amplitude,
                frequency: sample.frequency,
            });
        }
        frames
    }
}

/// Highest priority wins; ties go to the player that most recently entered `Playing`
pub fn select_winner<'a>(players: impl IntoIterator<Item = &'a Player>, channel: Channel) -> Option<&'a Player> {
    players
        .into_iter()
        .filter(|p| p.is_playing() && p.controller().drives(channel))
        .max_by_key(|p| (p.priority(), p.started_at()))
}
