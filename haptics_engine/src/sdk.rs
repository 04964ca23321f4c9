//! Process-global front door
//!
//! One instance at most lives in `SDK`. Every call takes the global lock and
//! then the engine lock, so API calls and render ticks never interleave.
//! Failures are recorded and readable through [`error_message`].

use crate::backend::{CallbackBackend, HapticsBackend, NullBackend};
use crate::config::EngineConfig;
use crate::engine::HapticsEngine;
use crate::logging::{self, LogCallback};
use crate::mixer::RenderedFrame;
use crate::openxr::{ActionSetHandle, OpenXrBackend, OpenXrRuntime, SessionHandle, SessionState, OPENXR_EXTENSIONS};
use crate::platform::{PlatformBackend, PlatformRuntime};
use crate::player::PlaybackState;
use crate::runtime::HapticsRuntime;
use haptics_shared::{
    ClipId, Controller, GameEngineInfo, HapticsError, HapticsResult, NullBackendStats, PlayerId, SdkVersion,
};
use parking_lot::Mutex;
use tracing::debug;

lazy_static::lazy_static! {
    static ref SDK: Mutex<Option<HapticsRuntime>> = Mutex::new(None);
    static ref LAST_ERROR: Mutex<Option<String>> = Mutex::new(None);
}

fn record<T>(result: HapticsResult<T>) -> HapticsResult<T> {
    if let Err(e) = &result {
        debug!(code = e.code() as i32, error = %e, "call failed");
        *LAST_ERROR.lock() = Some(e.to_string());
    }
    result
}

/// Fails with `error`, recording it like any other failed call
pub fn reject<T>(error: HapticsError) -> HapticsResult<T> {
    record(Err(error))
}

fn with_runtime<T>(f: impl FnOnce(&HapticsRuntime) -> HapticsResult<T>) -> HapticsResult<T> {
    let sdk = SDK.lock();
    let result = match sdk.as_ref() {
        Some(runtime) => f(runtime),
        None => Err(HapticsError::NotInitialized),
    };
    drop(sdk);
    record(result)
}

fn with_engine<T>(f: impl FnOnce(&mut HapticsEngine) -> HapticsResult<T>) -> HapticsResult<T> {
    with_runtime(|runtime| f(&mut runtime.engine()))
}

fn with_openxr<T>(f: impl FnOnce(&mut OpenXrBackend) -> HapticsResult<T>) -> HapticsResult<T> {
    with_engine(|engine| f(engine.openxr()?))
}

// --- lifecycle ---

/// Starts an instance on `backend`. Fails with `AlreadyInitialized` while one is live.
pub fn initialize_with_config(
    backend: Box<dyn HapticsBackend>,
    config: EngineConfig,
    log_callback: Option<LogCallback>,
) -> HapticsResult<()> {
    if let Some(callback) = log_callback {
        logging::set_log_callback(callback);
    }
    logging::init(&config.log_filter);

    let mut sdk = SDK.lock();
    let result = if sdk.is_some() {
        Err(HapticsError::AlreadyInitialized)
    } else {
        HapticsRuntime::start(backend, &config).map(|runtime| {
            *sdk = Some(runtime);
        })
    };
    drop(sdk);
    record(result)
}

fn initialize_with_backend(backend: Box<dyn HapticsBackend>, log_callback: Option<LogCallback>) -> HapticsResult<()> {
    let config = record(EngineConfig::load())?;
    initialize_with_config(backend, config, log_callback)
}

pub fn initialize_with_null_backend(log_callback: Option<LogCallback>) -> HapticsResult<()> {
    initialize_with_backend(Box::new(NullBackend::new()), log_callback)
}

/// `callback` receives every rendered frame on the render thread. It must not
/// call into this module.
pub fn initialize_with_callback_backend<F>(callback: F, log_callback: Option<LogCallback>) -> HapticsResult<()>
where
    F: FnMut(&RenderedFrame) + Send + 'static,
{
    initialize_with_backend(Box::new(CallbackBackend::new(callback)), log_callback)
}

pub fn initialize_with_platform_runtime(
    game_engine: GameEngineInfo,
    runtime: Box<dyn PlatformRuntime>,
    log_callback: Option<LogCallback>,
) -> HapticsResult<()> {
    let backend = record(PlatformBackend::new(game_engine, runtime))?;
    initialize_with_backend(Box::new(backend), log_callback)
}

pub fn initialize_with_openxr(runtime: Box<dyn OpenXrRuntime>, log_callback: Option<LogCallback>) -> HapticsResult<()> {
    initialize_with_backend(Box::new(OpenXrBackend::new(runtime)), log_callback)
}

/// Stops all playback, releases everything and joins the render thread
pub fn uninitialize() -> HapticsResult<()> {
    let mut sdk = SDK.lock();
    let result = match sdk.take() {
        Some(runtime) => {
            runtime.shutdown();
            Ok(())
        }
        None => Err(HapticsError::AlreadyUninitialized),
    };
    drop(sdk);
    record(result)
}

pub fn initialized() -> bool {
    SDK.lock().is_some()
}

pub fn version() -> SdkVersion {
    SdkVersion {
        major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
        minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
        patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or(0),
    }
}

/// Display text of the most recent failure, if any call has failed yet
pub fn error_message() -> Option<String> {
    LAST_ERROR.lock().clone()
}

pub fn set_suspended(suspended: bool) -> HapticsResult<()> {
    with_engine(|engine| {
        engine.set_suspended(suspended);
        Ok(())
    })
}

pub fn suspended() -> HapticsResult<bool> {
    with_engine(|engine| Ok(engine.suspended()))
}

pub fn null_backend_statistics() -> HapticsResult<NullBackendStats> {
    with_engine(|engine| engine.null_backend_statistics())
}

/// Runs one render tick now and waits for it
pub fn tick_now() -> HapticsResult<()> {
    with_runtime(|runtime| runtime.tick_now())
}

// --- clips ---

pub fn load_clip(data: &[u8]) -> HapticsResult<ClipId> {
    with_engine(|engine| engine.load_clip(data))
}

pub fn clip_duration(clip: ClipId) -> HapticsResult<f32> {
    with_engine(|engine| engine.clip_duration(clip))
}

pub fn release_clip(clip: ClipId) -> HapticsResult<()> {
    with_engine(|engine| engine.release_clip(clip))
}

// --- players ---

pub fn create_player() -> HapticsResult<PlayerId> {
    with_engine(|engine| engine.create_player())
}

pub fn release_player(player: PlayerId) -> HapticsResult<()> {
    with_engine(|engine| engine.release_player(player))
}

pub fn player_set_clip(player: PlayerId, clip: ClipId) -> HapticsResult<()> {
    with_engine(|engine| engine.player_set_clip(player, clip))
}

pub fn player_play(player: PlayerId, controller: Controller) -> HapticsResult<()> {
    with_engine(|engine| engine.player_play(player, controller))
}

pub fn player_pause(player: PlayerId) -> HapticsResult<()> {
    with_engine(|engine| engine.player_pause(player))
}

pub fn player_resume(player: PlayerId) -> HapticsResult<()> {
    with_engine(|engine| engine.player_resume(player))
}

pub fn player_stop(player: PlayerId) -> HapticsResult<()> {
    with_engine(|engine| engine.player_stop(player))
}

pub fn player_seek(player: PlayerId, time: f32) -> HapticsResult<()> {
    with_engine(|engine| engine.player_seek(player, time))
}

pub fn player_set_amplitude(player: PlayerId, amplitude: f32) -> HapticsResult<()> {
    with_engine(|engine| engine.player_set_amplitude(player, amplitude))
}

pub fn player_amplitude(player: PlayerId) -> HapticsResult<f32> {
    with_engine(|engine| engine.player_amplitude(player))
}

pub fn player_set_frequency_shift(player: PlayerId, shift: f32) -> HapticsResult<()> {
    with_engine(|engine| engine.player_set_frequency_shift(player, shift))
}

pub fn player_frequency_shift(player: PlayerId) -> HapticsResult<f32> {
    with_engine(|engine| engine.player_frequency_shift(player))
}

pub fn player_set_looping(player: PlayerId, looping: bool) -> HapticsResult<()> {
    with_engine(|engine| engine.player_set_looping(player, looping))
}

pub fn player_looping(player: PlayerId) -> HapticsResult<bool> {
    with_engine(|engine| engine.player_looping(player))
}

pub fn player_set_priority(player: PlayerId, priority: u32) -> HapticsResult<()> {
    with_engine(|engine| engine.player_set_priority(player, priority))
}

pub fn player_priority(player: PlayerId) -> HapticsResult<u32> {
    with_engine(|engine| engine.player_priority(player))
}

pub fn player_state(player: PlayerId) -> HapticsResult<PlaybackState> {
    with_engine(|engine| engine.player_state(player))
}

pub fn player_position(player: PlayerId) -> HapticsResult<f32> {
    with_engine(|engine| engine.player_position(player))
}

pub fn player_controller(player: PlayerId) -> HapticsResult<Controller> {
    with_engine(|engine| engine.player_controller(player))
}

pub fn player_clip(player: PlayerId) -> HapticsResult<Option<ClipId>> {
    with_engine(|engine| engine.player_clip(player))
}

// --- OpenXR ---

/// Instance extensions the host must enable for the OpenXR backend
pub fn openxr_extensions() -> &'static [&'static str] {
    &OPENXR_EXTENSIONS
}

pub fn set_openxr_session(session: SessionHandle) -> HapticsResult<()> {
    with_openxr(|openxr| {
        openxr.set_session(session);
        Ok(())
    })
}

pub fn create_openxr_action_set() -> HapticsResult<ActionSetHandle> {
    with_openxr(|openxr| openxr.create_action_set())
}

pub fn destroy_openxr_action_set(action_set: ActionSetHandle) -> HapticsResult<()> {
    with_openxr(|openxr| openxr.destroy_action_set(action_set))
}

pub fn set_openxr_action_set(action_set: ActionSetHandle) -> HapticsResult<()> {
    with_openxr(|openxr| {
        openxr.set_action_set(action_set);
        Ok(())
    })
}

pub fn set_openxr_session_state(state: SessionState) -> HapticsResult<()> {
    with_openxr(|openxr| {
        openxr.set_session_state(state);
        Ok(())
    })
}
