use crate::commands::RenderCommand;
use crate::config::EngineConfig;
use crate::engine::HapticsEngine;
use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use haptics_shared::{HapticsError, HapticsResult};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Dedicated thread ticking the engine at a fixed rate
pub struct RenderThread {
    command_tx: Sender<RenderCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    pub fn spawn(engine: Arc<Mutex<HapticsEngine>>, config: &EngineConfig) -> HapticsResult<Self> {
        let (command_tx, command_rx) = unbounded();
        let interval = config.tick_interval();

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || run(engine, command_rx, interval))
            .map_err(|e| HapticsError::InitializationFailed(format!("failed to spawn render thread: {}", e)))?;

        info!(thread = %config.thread_name, interval_ms = interval.as_secs_f64() * 1000.0, "render thread started");
        Ok(Self {
            command_tx,
            handle: Some(handle),
        })
    }

    /// Runs one tick on the render thread and waits for it to complete
    pub fn tick_now(&self) -> HapticsResult<()> {
        let (ack_tx, ack_rx) = bounded(1);
        self.command_tx
            .send(RenderCommand::TickNow(ack_tx))
            .map_err(|_| HapticsError::Error("render thread is not running".to_string()))?;
        ack_rx
            .recv()
            .map_err(|_| HapticsError::Error("render thread exited before ticking".to_string()))
    }

    /// Stops the thread and blocks until it has exited. Idempotent.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        // a send error means the thread is already gone; join still reaps it
        let _ = self.command_tx.send(RenderCommand::Shutdown);
        if handle.join().is_err() {
            warn!("render thread panicked");
        } else {
            info!("render thread stopped");
        }
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(engine: Arc<Mutex<HapticsEngine>>, commands: Receiver<RenderCommand>, interval: Duration) {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => engine.lock().tick(),
            recv(commands) -> command => match command {
                Ok(RenderCommand::TickNow(ack)) => {
                    engine.lock().tick();
                    let _ = ack.send(());
                }
                Ok(RenderCommand::Shutdown) | Err(_) => break,
            },
        }
    }
    debug!("render loop exited");
}
