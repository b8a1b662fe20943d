//! Cooperative cancellation over a watch channel

use tokio::sync::watch;

/// Creates a linked canceller and signal
pub fn cancellation_pair() -> (Canceller, CancellationSignal) {
    let (tx, rx) = watch::channel(false);
    (Canceller { tx }, CancellationSignal { rx })
}

/// Owner side: requests cancellation
#[derive(Debug)]
pub struct Canceller {
    tx: watch::Sender<bool>,
}

impl Canceller {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side: cheap to clone, one per waiting task
///
/// Dropping the [`Canceller`] without calling `cancel` does not cancel.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Canceller dropped: cancellation can no longer happen
                std::future::pending::<()>().await;
            }
        }
    }
}
