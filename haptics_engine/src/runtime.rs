use crate::backend::HapticsBackend;
use crate::config::EngineConfig;
use crate::engine::HapticsEngine;
use crate::render_thread::RenderThread;
use haptics_shared::HapticsResult;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::info;

/// An initialized instance: the engine plus the thread ticking it
pub struct HapticsRuntime {
    engine: Arc<Mutex<HapticsEngine>>,
    render_thread: RenderThread,
}

impl HapticsRuntime {
    pub fn start(backend: Box<dyn HapticsBackend>, config: &EngineConfig) -> HapticsResult<Self> {
        config.validate()?;
        let engine = HapticsEngine::new(backend, config);
        let kind = engine.backend_kind();
        let engine = Arc::new(Mutex::new(engine));
        let render_thread = RenderThread::spawn(engine.clone(), config)?;
        info!(backend = %kind, tick_rate_hz = config.tick_rate_hz, "haptics runtime started");
        Ok(Self { engine, render_thread })
    }

    pub fn engine(&self) -> MutexGuard<'_, HapticsEngine> {
        self.engine.lock()
    }

    pub fn tick_now(&self) -> HapticsResult<()> {
        self.render_thread.tick_now()
    }

    /// Stops all playback, joins the render thread, then shuts the backend down
    pub fn shutdown(mut self) {
        self.engine.lock().release_all();
        self.render_thread.shutdown();
        self.engine.lock().shutdown_backend();
        info!("haptics runtime shut down");
    }
}
