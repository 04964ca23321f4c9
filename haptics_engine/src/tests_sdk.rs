use crate::backend::CallbackBackend;
use crate::config::EngineConfig;
use crate::mixer::RenderedFrame;
use crate::openxr::{ActionSetHandle, OpenXrRuntime, SessionHandle, SessionState};
use crate::platform::PlatformRuntime;
use crate::player::PlaybackState;
use crate::sdk;
use crate::test_support::{constant_clip_json, recording_backend};
use haptics_shared::{Channel, Controller, GameEngineInfo, HapticsError, HapticsResult, PlayerId, ResultCode};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;

/// Tears the global instance down even when an assertion fails
struct Instance;

impl Drop for Instance {
    fn drop(&mut self) {
        let _ = sdk::uninitialize();
    }
}

/// Slow ticker so only `tick_now` produces frames in practice
fn manual_config() -> EngineConfig {
    EngineConfig {
        tick_rate_hz: 1,
        ..EngineConfig::default()
    }
}

fn start_recording() -> (Instance, Arc<Mutex<Vec<RenderedFrame>>>) {
    let (backend, frames) = recording_backend();
    sdk::initialize_with_config(Box::new(backend), manual_config(), None).unwrap();
    (Instance, frames)
}

#[test]
#[serial]
fn lifecycle_errors() {
    assert!(!sdk::initialized());
    assert_eq!(sdk::uninitialize(), Err(HapticsError::AlreadyUninitialized));

    sdk::initialize_with_null_backend(None).unwrap();
    let _instance = Instance;
    assert!(sdk::initialized());
    assert_eq!(sdk::initialize_with_null_backend(None), Err(HapticsError::AlreadyInitialized));
    assert_eq!(sdk::error_message(), Some(HapticsError::AlreadyInitialized.to_string()));

    sdk::uninitialize().unwrap();
    assert!(!sdk::initialized());
    let err = sdk::uninitialize().unwrap_err();
    assert_eq!(err.code(), ResultCode::AlreadyUninitialized);
}

#[test]
#[serial]
fn calls_before_initialize_fail() {
    assert_eq!(sdk::create_player(), Err(HapticsError::NotInitialized));
    assert_eq!(sdk::load_clip(b"{}").unwrap_err().code(), ResultCode::NotInitialized);
    assert!(sdk::tick_now().is_err());
    assert_eq!(sdk::error_message(), Some(HapticsError::NotInitialized.to_string()));
}

#[test]
#[serial]
fn error_message_tracks_latest_failure() {
    let (_instance, _frames) = start_recording();
    let player = sdk::create_player().unwrap();

    assert!(sdk::player_set_amplitude(player, -1.0).is_err());
    let first = sdk::error_message().unwrap();
    assert!(first.contains("-1"));

    assert!(sdk::player_play(player, Controller::Both).is_err());
    let second = sdk::error_message().unwrap();
    assert_ne!(first, second);
    assert_eq!(second, HapticsError::NoClipLoaded(player).to_string());
}

#[test]
#[serial]
fn tick_now_drives_the_render_thread() {
    let (_instance, frames) = start_recording();
    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.8, 0.2)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Right).unwrap();

    sdk::tick_now().unwrap();
    let frames = frames.lock();
    let frame = frames.last().unwrap();
    assert_eq!(frame.player, player);
    assert_eq!(frame.channel, Channel::Right);
    assert!((frame.amplitude - 0.8).abs() < 1e-6);
}

#[test]
#[serial]
fn uninitialize_stops_and_releases_everything() {
    let (instance, _frames) = start_recording();
    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Both).unwrap();
    assert_eq!(sdk::player_state(player), Ok(PlaybackState::Playing));

    sdk::uninitialize().unwrap();
    assert!(!sdk::initialized());
    assert_eq!(sdk::player_state(player), Err(HapticsError::NotInitialized));

    // a fresh instance starts with empty tables
    sdk::initialize_with_null_backend(None).unwrap();
    assert_eq!(sdk::player_state(player), Err(HapticsError::InvalidPlayerHandle(player)));
    assert_eq!(sdk::clip_duration(clip), Err(HapticsError::InvalidClipHandle(clip)));
    drop(instance);
}

#[test]
#[serial]
fn suspend_holds_playback() {
    let (_instance, frames) = start_recording();
    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Left).unwrap();

    sdk::set_suspended(true).unwrap();
    assert_eq!(sdk::suspended(), Ok(true));
    let before = frames.lock().len();
    let position = sdk::player_position(player).unwrap();
    sdk::tick_now().unwrap();
    assert_eq!(frames.lock().len(), before);
    assert_eq!(sdk::player_position(player), Ok(position));

    sdk::set_suspended(false).unwrap();
    sdk::tick_now().unwrap();
    assert!(frames.lock().len() > before);
}

#[test]
#[serial]
fn null_backend_statistics_through_front_door() {
    sdk::initialize_with_config(Box::new(crate::NullBackend::new()), manual_config(), None).unwrap();
    let _instance = Instance;
    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Left).unwrap();
    sdk::tick_now().unwrap();

    let stats = sdk::null_backend_statistics().unwrap();
    assert_eq!(stats.stream_count, 1);
    assert!(stats.play_call_count >= 1);
}

#[test]
#[serial]
fn statistics_need_the_null_backend() {
    let (_instance, _frames) = start_recording();
    let err = sdk::null_backend_statistics().unwrap_err();
    assert_eq!(err.code(), ResultCode::Error);
    assert_eq!(sdk::set_openxr_session(1).unwrap_err().code(), ResultCode::Error);
}

#[test]
#[serial]
fn callback_backend_initializer() {
    let seen = Arc::new(Mutex::new(0_usize));
    let counter = seen.clone();
    sdk::initialize_with_callback_backend(move |_frame: &RenderedFrame| *counter.lock() += 1, None).unwrap();
    let _instance = Instance;
    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Both).unwrap();
    sdk::tick_now().unwrap();
    assert!(*seen.lock() >= 2);
}

#[test]
#[serial]
fn render_callback_runs_on_the_render_thread() {
    let threads = Arc::new(Mutex::new(Vec::new()));
    let seen = threads.clone();
    let config = EngineConfig {
        thread_name: "haptics-callback-check".to_string(),
        ..manual_config()
    };
    let backend = CallbackBackend::new(move |_frame: &RenderedFrame| {
        seen.lock().push(std::thread::current().name().map(str::to_string));
    });
    sdk::initialize_with_config(Box::new(backend), config, None).unwrap();
    let _instance = Instance;

    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Right).unwrap();
    sdk::tick_now().unwrap();

    let threads = threads.lock();
    assert!(!threads.is_empty());
    assert!(threads.iter().all(|name| name.as_deref() == Some("haptics-callback-check")));
}

struct SilentPlatform;

impl PlatformRuntime for SilentPlatform {
    fn play(&mut self, _frame: &RenderedFrame) -> HapticsResult<()> {
        Ok(())
    }

    fn stop(&mut self, _channel: Channel) -> HapticsResult<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn platform_runtime_requires_engine_info() {
    let info = GameEngineInfo {
        name: String::new(),
        version: "1".to_string(),
        haptics_sdk_version: "1".to_string(),
    };
    let err = sdk::initialize_with_platform_runtime(info, Box::new(SilentPlatform), None).unwrap_err();
    assert_eq!(err.code(), ResultCode::InitializationFailed);
    assert!(!sdk::initialized());
}

#[derive(Default)]
struct XrCalls {
    applied: Vec<(ActionSetHandle, Channel)>,
}

struct FakeXr(Arc<Mutex<XrCalls>>);

impl OpenXrRuntime for FakeXr {
    fn create_action_set(&mut self, session: SessionHandle) -> HapticsResult<ActionSetHandle> {
        Ok(session + 1)
    }

    fn destroy_action_set(&mut self, _action_set: ActionSetHandle) -> HapticsResult<()> {
        Ok(())
    }

    fn apply_haptic_feedback(&mut self, action_set: ActionSetHandle, frame: &RenderedFrame) -> HapticsResult<()> {
        self.0.lock().applied.push((action_set, frame.channel));
        Ok(())
    }

    fn stop_haptic_feedback(&mut self, _action_set: ActionSetHandle, _channel: Channel) -> HapticsResult<()> {
        Ok(())
    }
}

#[test]
#[serial]
fn openxr_session_flow() {
    let calls = Arc::new(Mutex::new(XrCalls::default()));
    sdk::initialize_with_openxr(Box::new(FakeXr(calls.clone())), None).unwrap();
    let _instance = Instance;
    assert_eq!(sdk::openxr_extensions().len(), 2);

    assert!(sdk::create_openxr_action_set().is_err());
    sdk::set_openxr_session(41).unwrap();
    let action_set = sdk::create_openxr_action_set().unwrap();
    assert_eq!(action_set, 42);
    sdk::set_openxr_action_set(action_set).unwrap();
    sdk::set_openxr_session_state(SessionState::Focused).unwrap();

    let clip = sdk::load_clip(&constant_clip_json(10.0, 0.5, 0.5)).unwrap();
    let player = sdk::create_player().unwrap();
    sdk::player_set_clip(player, clip).unwrap();
    sdk::player_play(player, Controller::Left).unwrap();
    sdk::tick_now().unwrap();
    assert!(calls.lock().applied.contains(&(42, Channel::Left)));

    sdk::destroy_openxr_action_set(action_set).unwrap();
    assert!(sdk::destroy_openxr_action_set(action_set).is_err());
}

#[test]
#[serial]
fn invalid_config_fails_initialization() {
    let config = EngineConfig {
        tick_rate_hz: 0,
        ..EngineConfig::default()
    };
    let backend = CallbackBackend::new(|_frame: &RenderedFrame| {});
    let err = sdk::initialize_with_config(Box::new(backend), config, None).unwrap_err();
    assert_eq!(err.code(), ResultCode::InitializationFailed);
    assert!(!sdk::initialized());
}

#[test]
fn version_matches_crate() {
    let version = sdk::version();
    assert_eq!(version.major.to_string(), env!("CARGO_PKG_VERSION_MAJOR"));
    assert_eq!(version.minor.to_string(), env!("CARGO_PKG_VERSION_MINOR"));
}

#[test]
#[serial]
fn handles_stay_invalid_after_release() {
    let (_instance, _frames) = start_recording();
    let player = sdk::create_player().unwrap();
    sdk::release_player(player).unwrap();
    assert_eq!(sdk::release_player(player), Err(HapticsError::InvalidPlayerHandle(player)));
    assert_eq!(sdk::player_amplitude(PlayerId(-1)), Err(HapticsError::InvalidPlayerHandle(PlayerId(-1))));
}
