use crossbeam_channel::Sender;

/// Messages for the render thread
pub enum RenderCommand {
    /// Exit the tick loop. The thread acknowledges by terminating.
    Shutdown,
    /// Run one tick right away, then signal on the sender
    TickNow(Sender<()>),
}
