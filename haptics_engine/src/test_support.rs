use crate::backend::CallbackBackend;
use crate::mixer::RenderedFrame;
use haptics_shared::clip_format::HapticClipFile;
use parking_lot::Mutex;
use std::sync::Arc;

/// Encodes (time, amplitude, frequency) samples as `.haptic` JSON bytes
pub fn clip_json(samples: &[(f32, f32, f32)]) -> Vec<u8> {
    serde_json::to_vec(&HapticClipFile::from_samples(samples)).expect("clip fixture serializes")
}

/// A clip holding the same amplitude and frequency for `duration` seconds
pub fn constant_clip_json(duration: f32, amplitude: f32, frequency: f32) -> Vec<u8> {
    clip_json(&[(0.0, amplitude, frequency), (duration, amplitude, frequency)])
}

/// Callback backend recording every frame it receives
pub fn recording_backend() -> (CallbackBackend, Arc<Mutex<Vec<RenderedFrame>>>) {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = frames.clone();
    let backend = CallbackBackend::new(move |frame: &RenderedFrame| sink.lock().push(*frame));
    (backend, frames)
}
