use tokio::sync::watch;

/// Sending half of the shutdown signal.
///
/// Held by the processor; broadcasting consumes nothing and can be repeated. Every
/// worker observes the same signal through its own [`ShutdownRx`].
#[derive(Debug, Clone)]
pub struct ShutdownTx(watch::Sender<()>);

impl ShutdownTx {
    /// Broadcasts the shutdown signal to all subscribed receivers.
    ///
    /// Fails only if every receiver has already been dropped, which means there is
    /// nothing left to stop.
    pub fn shutdown(&self) -> Result<(), watch::error::SendError<()>> {
        self.0.send(())
    }

    /// Creates a new receiver observing this shutdown signal.
    pub fn subscribe(&self) -> ShutdownRx {
        self.0.subscribe()
    }
}

/// Receiving half of the shutdown signal.
///
/// Workers hold one each and poll it inside their `select!` loops via `changed()`.
pub type ShutdownRx = watch::Receiver<()>;

/// Creates a connected shutdown channel pair.
pub fn create_shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(());
    (ShutdownTx(tx), rx)
}
