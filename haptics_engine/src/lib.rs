pub mod backend;
pub mod clip;
pub mod clip_store;
pub mod commands;
pub mod config;
pub mod engine;
pub mod logging;
pub mod mixer;
pub mod openxr;
pub mod platform;
pub mod player;
pub mod render_thread;
pub mod runtime;
pub mod sdk;

// Re-exports
pub use backend::{BackendKind, CallbackBackend, HapticsBackend, NullBackend};
pub use config::EngineConfig;
pub use engine::HapticsEngine;
pub use logging::LogCallback;
pub use mixer::{render_sample, RenderedFrame};
pub use player::PlaybackState;
pub use runtime::HapticsRuntime;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests_playback;
#[cfg(test)]
mod tests_sdk;
