//! C ABI over the haptics front door
//!
//! Every function returns a `HapticsSdkResult` (`0` success, negative error).
//! Out-parameters are written only on success, except id out-parameters,
//! which receive `-1` when allocation fails.

use haptics_engine::logging::LogCallback;
use haptics_engine::openxr::SessionState;
use haptics_engine::{sdk, RenderedFrame};
use haptics_shared::{
    ClipId, Controller, HapticsError, HapticsResult, LogLevel, NullBackendStats, PlayerId, ResultCode, SdkVersion,
    INVALID_ID,
};
use parking_lot::Mutex;
use std::ffi::{c_char, c_void, CString};
use std::ptr;
use std::sync::Arc;

pub type HapticsSdkResult = i32;

/// `level` is a `LogLevel` value, `message` a null-terminated UTF-8 string
/// valid only for the duration of the call. Must not call back into the SDK.
pub type HapticsSdkLogCallback = Option<unsafe extern "C" fn(level: i32, message: *const c_char)>;

/// Called on the render thread once per rendered frame
pub type HapticsSdkRenderCallback = Option<unsafe extern "C" fn(frame: *const HapticsSdkFrame, user_data: *mut c_void)>;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticsSdkFrame {
    /// 0 = left, 1 = right
    pub channel: i32,
    pub player_id: i32,
    pub duration_seconds: f32,
    pub amplitude: f32,
    pub frequency: f32,
}

impl From<&RenderedFrame> for HapticsSdkFrame {
    fn from(frame: &RenderedFrame) -> Self {
        Self {
            channel: frame.channel.index() as i32,
            player_id: frame.player.0,
            duration_seconds: frame.duration.as_secs_f32(),
            amplitude: frame.amplitude,
            frequency: frame.frequency,
        }
    }
}

lazy_static::lazy_static! {
    /// Backing storage for the pointer handed out by `haptics_sdk_error_message`
    static ref ERROR_MESSAGE: Mutex<Option<CString>> = Mutex::new(None);
}

/// Opaque host pointer passed back to the render callback
struct UserData(*mut c_void);

// SAFETY: the host guarantees `user_data` may be used from the render thread.
unsafe impl Send for UserData {}

impl UserData {
    fn get(&self) -> *mut c_void {
        self.0
    }
}

fn code<T>(result: HapticsResult<T>) -> HapticsSdkResult {
    match result {
        Ok(_) => ResultCode::Success as i32,
        Err(e) => e.code() as i32,
    }
}

fn null_pointer<T>(name: &str) -> HapticsResult<T> {
    sdk::reject(HapticsError::Error(format!("{} must not be null", name)))
}

fn controller(raw: i32) -> HapticsResult<Controller> {
    match Controller::try_from(raw) {
        Ok(controller) => Ok(controller),
        Err(e) => sdk::reject(e),
    }
}

/// Writes `value` through `out` on success
///
/// # Safety
/// `out` must be null or valid for writes.
unsafe fn write_out<T>(out: *mut T, name: &str, result: impl FnOnce() -> HapticsResult<T>) -> HapticsSdkResult {
    if out.is_null() {
        return code(null_pointer::<T>(name));
    }
    match result() {
        Ok(value) => {
            *out = value;
            ResultCode::Success as i32
        }
        Err(e) => e.code() as i32,
    }
}

/// Like `write_out`, but writes `INVALID_ID` on failure
///
/// # Safety
/// `out` must be null or valid for writes.
unsafe fn write_id(out: *mut i32, name: &str, result: impl FnOnce() -> HapticsResult<i32>) -> HapticsSdkResult {
    if out.is_null() {
        return code(null_pointer::<i32>(name));
    }
    match result() {
        Ok(id) => {
            *out = id;
            ResultCode::Success as i32
        }
        Err(e) => {
            *out = INVALID_ID;
            e.code() as i32
        }
    }
}

fn bridge_log_callback(callback: HapticsSdkLogCallback) -> Option<LogCallback> {
    let callback = callback?;
    Some(Arc::new(move |level: LogLevel, message: &str| {
        let text = CString::new(message.replace('\0', " ")).unwrap_or_default();
        // SAFETY: the host provided a valid function pointer at initialization.
        unsafe { callback(level as i32, text.as_ptr()) };
    }))
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn haptics_sdk_version() -> SdkVersion {
    sdk::version()
}

#[no_mangle]
pub extern "C" fn haptics_sdk_initialize_with_null_backend(log_callback: HapticsSdkLogCallback) -> HapticsSdkResult {
    code(sdk::initialize_with_null_backend(bridge_log_callback(log_callback)))
}

/// # Safety
/// `render_callback` must be safe to call from the render thread with
/// `user_data` until `haptics_sdk_uninitialize` returns. Neither callback may
/// call any `haptics_sdk_*` function: both run with SDK locks held.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_initialize_with_callback_backend(
    render_callback: HapticsSdkRenderCallback,
    user_data: *mut c_void,
    log_callback: HapticsSdkLogCallback,
) -> HapticsSdkResult {
    let Some(render_callback) = render_callback else {
        return code(null_pointer::<()>("render callback"));
    };
    let user_data = UserData(user_data);
    let forward = move |frame: &RenderedFrame| {
        let frame = HapticsSdkFrame::from(frame);
        // SAFETY: upheld by the caller of the initializer.
        unsafe { render_callback(&frame, user_data.get()) };
    };
    code(sdk::initialize_with_callback_backend(forward, bridge_log_callback(log_callback)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_uninitialize() -> HapticsSdkResult {
    code(sdk::uninitialize())
}

/// # Safety
/// `initialized` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_initialized(initialized: *mut bool) -> HapticsSdkResult {
    write_out(initialized, "initialized", || Ok(sdk::initialized()))
}

/// Last error as a null-terminated UTF-8 string, or null when no call has
/// failed. The pointer stays valid until the next call of this function.
#[no_mangle]
pub extern "C" fn haptics_sdk_error_message() -> *const c_char {
    let mut slot = ERROR_MESSAGE.lock();
    *slot = sdk::error_message().and_then(|message| CString::new(message.replace('\0', " ")).ok());
    slot.as_ref().map_or(ptr::null(), |message| message.as_ptr())
}

#[no_mangle]
pub extern "C" fn haptics_sdk_set_suspended(suspended: bool) -> HapticsSdkResult {
    code(sdk::set_suspended(suspended))
}

/// # Safety
/// `suspended` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_suspended(suspended: *mut bool) -> HapticsSdkResult {
    write_out(suspended, "suspended", sdk::suspended)
}

/// Zeroed when no null backend is active; the failure is still recorded for
/// `haptics_sdk_error_message`.
#[no_mangle]
pub extern "C" fn haptics_sdk_get_null_backend_statistics() -> NullBackendStats {
    sdk::null_backend_statistics().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Clips
// ---------------------------------------------------------------------------

/// # Safety
/// `data` must be null or point to `data_length` readable bytes; `clip_id`
/// must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_load_clip(
    data: *const c_char,
    data_length: u32,
    clip_id: *mut i32,
) -> HapticsSdkResult {
    write_id(clip_id, "clip_id", || {
        if data.is_null() {
            return null_pointer("data");
        }
        // SAFETY: non-null, caller guarantees `data_length` readable bytes
        let bytes = unsafe { std::slice::from_raw_parts(data.cast::<u8>(), data_length as usize) };
        sdk::load_clip(bytes).map(|clip| clip.0)
    })
}

/// # Safety
/// `duration` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_clip_duration(clip_id: i32, duration: *mut f32) -> HapticsSdkResult {
    write_out(duration, "duration", || sdk::clip_duration(ClipId(clip_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_release_clip(clip_id: i32) -> HapticsSdkResult {
    code(sdk::release_clip(ClipId(clip_id)))
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// # Safety
/// `player_id` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_create_player(player_id: *mut i32) -> HapticsSdkResult {
    write_id(player_id, "player_id", || sdk::create_player().map(|player| player.0))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_release_player(player_id: i32) -> HapticsSdkResult {
    code(sdk::release_player(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_set_clip(player_id: i32, clip_id: i32) -> HapticsSdkResult {
    code(sdk::player_set_clip(PlayerId(player_id), ClipId(clip_id)))
}

/// `controller`: 0 = left, 1 = right, 2 = both
#[no_mangle]
pub extern "C" fn haptics_sdk_player_play(player_id: i32, controller_id: i32) -> HapticsSdkResult {
    code(controller(controller_id).and_then(|controller| sdk::player_play(PlayerId(player_id), controller)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_pause(player_id: i32) -> HapticsSdkResult {
    code(sdk::player_pause(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_resume(player_id: i32) -> HapticsSdkResult {
    code(sdk::player_resume(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_stop(player_id: i32) -> HapticsSdkResult {
    code(sdk::player_stop(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_seek(player_id: i32, time: f32) -> HapticsSdkResult {
    code(sdk::player_seek(PlayerId(player_id), time))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_set_amplitude(player_id: i32, amplitude: f32) -> HapticsSdkResult {
    code(sdk::player_set_amplitude(PlayerId(player_id), amplitude))
}

/// # Safety
/// `amplitude` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_player_amplitude(player_id: i32, amplitude: *mut f32) -> HapticsSdkResult {
    write_out(amplitude, "amplitude", || sdk::player_amplitude(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_set_frequency_shift(player_id: i32, shift: f32) -> HapticsSdkResult {
    code(sdk::player_set_frequency_shift(PlayerId(player_id), shift))
}

/// # Safety
/// `shift` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_player_frequency_shift(player_id: i32, shift: *mut f32) -> HapticsSdkResult {
    write_out(shift, "shift", || sdk::player_frequency_shift(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_set_looping_enabled(player_id: i32, enabled: bool) -> HapticsSdkResult {
    code(sdk::player_set_looping(PlayerId(player_id), enabled))
}

/// # Safety
/// `enabled` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_player_looping_enabled(player_id: i32, enabled: *mut bool) -> HapticsSdkResult {
    write_out(enabled, "enabled", || sdk::player_looping(PlayerId(player_id)))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_player_set_priority(player_id: i32, priority: u32) -> HapticsSdkResult {
    code(sdk::player_set_priority(PlayerId(player_id), priority))
}

/// # Safety
/// `priority` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_player_priority(player_id: i32, priority: *mut u32) -> HapticsSdkResult {
    write_out(priority, "priority", || sdk::player_priority(PlayerId(player_id)))
}

// ---------------------------------------------------------------------------
// OpenXR
// ---------------------------------------------------------------------------

#[no_mangle]
pub extern "C" fn haptics_sdk_set_openxr_session(session: u64) -> HapticsSdkResult {
    code(sdk::set_openxr_session(session))
}

/// `state` is an `XrSessionState` value
#[no_mangle]
pub extern "C" fn haptics_sdk_set_openxr_session_state(state: i32) -> HapticsSdkResult {
    let result = match SessionState::from_raw(state) {
        Some(state) => sdk::set_openxr_session_state(state),
        None => sdk::reject(HapticsError::Error(format!("session state {} is invalid", state))),
    };
    code(result)
}

/// # Safety
/// `action_set` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn haptics_sdk_create_openxr_action_set(action_set: *mut u64) -> HapticsSdkResult {
    write_out(action_set, "action_set", sdk::create_openxr_action_set)
}

#[no_mangle]
pub extern "C" fn haptics_sdk_destroy_openxr_action_set(action_set: u64) -> HapticsSdkResult {
    code(sdk::destroy_openxr_action_set(action_set))
}

#[no_mangle]
pub extern "C" fn haptics_sdk_set_openxr_action_set(action_set: u64) -> HapticsSdkResult {
    code(sdk::set_openxr_action_set(action_set))
}
