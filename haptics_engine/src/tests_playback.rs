use crate::backend::NullBackend;
use crate::config::EngineConfig;
use crate::engine::HapticsEngine;
use crate::mixer::RenderedFrame;
use crate::player::PlaybackState;
use crate::test_support::{clip_json, constant_clip_json, recording_backend};
use haptics_shared::{Channel, ClipId, Controller, HapticsError, PlayerId};
use parking_lot::Mutex;
use std::sync::Arc;

type Frames = Arc<Mutex<Vec<RenderedFrame>>>;

/// Engine ticking every 250 ms so cursor arithmetic stays exact
fn quarter_second_engine() -> (HapticsEngine, Frames) {
    let (backend, frames) = recording_backend();
    let config = EngineConfig {
        tick_rate_hz: 4,
        ..EngineConfig::default()
    };
    (HapticsEngine::new(Box::new(backend), &config), frames)
}

fn loaded_player(engine: &mut HapticsEngine, clip: ClipId) -> PlayerId {
    let player = engine.create_player().unwrap();
    engine.player_set_clip(player, clip).unwrap();
    player
}

fn drain(frames: &Frames) -> Vec<RenderedFrame> {
    std::mem::take(&mut *frames.lock())
}

#[test]
fn high_priority_player_owns_both_channels() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let low = loaded_player(&mut engine, clip);
    let high = loaded_player(&mut engine, clip);
    engine.player_set_priority(low, 100).unwrap();
    engine.player_set_priority(high, 900).unwrap();

    engine.player_play(high, Controller::Both).unwrap();
    engine.player_play(low, Controller::Both).unwrap();
    for _ in 0..10 {
        engine.tick();
        let tick = drain(&frames);
        assert_eq!(tick.len(), 2);
        assert!(tick.iter().all(|f| f.player == high));
    }
}

#[test]
fn most_recent_play_wins_on_equal_priority() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let first = loaded_player(&mut engine, clip);
    let second = loaded_player(&mut engine, clip);

    engine.player_play(first, Controller::Right).unwrap();
    engine.player_play(second, Controller::Right).unwrap();
    engine.tick();
    assert_eq!(drain(&frames), vec![frames_for(second, Channel::Right)]);

    // replaying the first makes it the most recent
    engine.player_play(first, Controller::Right).unwrap();
    engine.tick();
    assert_eq!(drain(&frames)[0].player, first);
}

fn frames_for(player: PlayerId, channel: Channel) -> RenderedFrame {
    RenderedFrame {
        channel,
        player,
        duration: std::time::Duration::from_millis(250),
        amplitude: 0.5,
        frequency: 0.5,
    }
}

#[test]
fn losing_player_takes_over_when_winner_pauses() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let background = loaded_player(&mut engine, clip);
    let alert = loaded_player(&mut engine, clip);
    engine.player_set_priority(alert, 1024).unwrap();
    engine.player_play(background, Controller::Left).unwrap();
    engine.player_play(alert, Controller::Both).unwrap();

    engine.tick();
    assert!(drain(&frames).iter().all(|f| f.player == alert));

    engine.player_pause(alert).unwrap();
    engine.tick();
    let tick = drain(&frames);
    assert_eq!(tick.len(), 1);
    assert_eq!(tick[0].player, background);
    assert_eq!(tick[0].channel, Channel::Left);
    // both kept advancing only while playing
    assert_eq!(engine.player_position(alert), Ok(0.25));
    assert_eq!(engine.player_position(background), Ok(0.5));
}

#[test]
fn seek_on_stopped_player_pauses_it() {
    let (mut engine, _frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = loaded_player(&mut engine, clip);

    engine.player_seek(player, 3.0).unwrap();
    assert_eq!(engine.player_state(player), Ok(PlaybackState::Paused));
    assert_eq!(engine.player_controller(player), Ok(Controller::Both));
    assert_eq!(engine.player_position(player), Ok(3.0));

    let err = engine.player_seek(player, 11.0).unwrap_err();
    assert!(matches!(err, HapticsError::InvalidSeekPosition { .. }));
    assert_eq!(engine.player_position(player), Ok(3.0));
    assert_eq!(engine.player_state(player), Ok(PlaybackState::Paused));
}

#[test]
fn looping_player_wraps_and_keeps_playing() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(1.0, 0.5, 0.5)).unwrap();
    let looping = loaded_player(&mut engine, clip);
    let once = loaded_player(&mut engine, clip);
    engine.player_set_looping(looping, true).unwrap();
    engine.player_play(looping, Controller::Left).unwrap();
    engine.player_play(once, Controller::Right).unwrap();

    for _ in 0..3 {
        engine.tick();
    }
    assert_eq!(engine.player_position(looping), Ok(0.75));
    engine.tick();

    assert_eq!(engine.player_state(looping), Ok(PlaybackState::Playing));
    assert_eq!(engine.player_position(looping), Ok(0.0));
    assert_eq!(engine.player_state(once), Ok(PlaybackState::Stopped));
    assert_eq!(engine.player_position(once), Ok(0.0));

    drain(&frames);
    engine.tick();
    let tick = drain(&frames);
    assert_eq!(tick.len(), 1);
    assert_eq!(tick[0].player, looping);
}

#[test]
fn released_clip_keeps_playing_through_bound_player() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = loaded_player(&mut engine, clip);
    engine.player_play(player, Controller::Both).unwrap();

    engine.release_clip(clip).unwrap();
    assert_eq!(engine.clip_duration(clip), Err(HapticsError::InvalidClipHandle(clip)));
    engine.tick();
    assert_eq!(drain(&frames).len(), 2);

    let other = engine.create_player().unwrap();
    assert_eq!(
        engine.player_set_clip(other, clip),
        Err(HapticsError::InvalidClipHandle(clip))
    );
}

#[test]
fn parameter_changes_reach_the_next_tick() {
    let (mut engine, frames) = quarter_second_engine();
    let clip = engine.load_clip(&clip_json(&[(0.0, 0.5, 0.4), (10.0, 0.5, 0.4)])).unwrap();
    let player = loaded_player(&mut engine, clip);
    engine.player_play(player, Controller::Left).unwrap();
    engine.tick();
    assert_eq!(drain(&frames)[0].amplitude, 0.5);

    engine.player_set_amplitude(player, 1.5).unwrap();
    engine.player_set_frequency_shift(player, 0.5).unwrap();
    engine.tick();
    let frame = drain(&frames)[0];
    assert_eq!(frame.amplitude, 0.75);
    assert!((frame.frequency - 0.9).abs() < 1e-6);

    assert!(engine.player_set_amplitude(player, -1.0).is_err());
    assert_eq!(engine.player_amplitude(player), Ok(1.5));
}

#[test]
fn play_without_clip_is_rejected() {
    let (mut engine, _frames) = quarter_second_engine();
    let player = engine.create_player().unwrap();
    assert_eq!(
        engine.player_play(player, Controller::Both),
        Err(HapticsError::NoClipLoaded(player))
    );
    assert_eq!(engine.player_state(player), Ok(PlaybackState::Stopped));
}

#[test]
fn rebinding_releases_the_old_clip() {
    let (mut engine, _frames) = quarter_second_engine();
    let first = engine.load_clip(&constant_clip_json(1.0, 0.5, 0.5)).unwrap();
    let second = engine.load_clip(&constant_clip_json(2.0, 0.5, 0.5)).unwrap();
    let player = loaded_player(&mut engine, first);
    engine.release_clip(first).unwrap();

    engine.player_set_clip(player, second).unwrap();
    assert_eq!(engine.player_clip(player), Ok(Some(second)));
    assert_eq!(engine.clip_count(), 1);
}

#[test]
fn null_backend_sees_stop_as_a_stream_boundary() {
    let config = EngineConfig::default();
    let mut engine = HapticsEngine::new(Box::new(NullBackend::new()), &config);
    let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = loaded_player(&mut engine, clip);

    for _ in 0..3 {
        engine.player_play(player, Controller::Both).unwrap();
        engine.tick();
        engine.tick();
        engine.player_stop(player).unwrap();
        engine.tick();
    }

    let stats = engine.null_backend_statistics().unwrap();
    // two channels per play
    assert_eq!(stats.stream_count, 6);
    assert_eq!(stats.play_call_count, 12);
}

#[test]
fn randomized_priorities_pick_the_highest() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    for _ in 0..50 {
        let (mut engine, frames) = quarter_second_engine();
        let clip = engine.load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
        let mut best: Option<(u32, PlayerId)> = None;
        for _ in 0..rng.usize(1..6) {
            let player = loaded_player(&mut engine, clip);
            let priority = rng.u32(0..=1024);
            engine.player_set_priority(player, priority).unwrap();
            engine.player_play(player, Controller::Left).unwrap();
            // later plays win ties
            if best.is_none_or(|(p, _)| priority >= p) {
                best = Some((priority, player));
            }
        }
        engine.tick();
        let winner = best.map(|(_, player)| player);
        assert_eq!(drain(&frames).first().map(|f| f.player), winner);
    }
}
