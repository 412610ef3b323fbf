//! Delay-and-collapse gate for bursts of trigger events.

use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle};

/// Collapses rapid triggers into one deferred call of `action`.
///
/// Every [`Debouncer::trigger`] restarts the quiet period. The action runs once
/// the period elapses without another trigger, receiving the value passed to
/// the last trigger. Each debouncer owns its own timer; dropping it discards a
/// pending call.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
    delay: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Must be called from within a tokio runtime.
    pub fn new<F>(delay: Duration, action: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_timer(rx, delay, action));
        Self { tx, worker, delay }
    }

    pub fn trigger(&self, value: T) {
        if self.tx.send(value).is_err() {
            tracing::debug!("debounce timer stopped; trigger dropped");
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

async fn run_timer<T, F>(mut rx: mpsc::UnboundedReceiver<T>, delay: Duration, action: F)
where
    F: Fn(T),
{
    while let Some(first) = rx.recv().await {
        let mut latest = first;
        loop {
            tokio::select! {
                next = rx.recv() => match next {
                    Some(value) => latest = value,
                    None => return,
                },
                _ = tokio::time::sleep(delay) => {
                    action(latest);
                    break;
                }
            }
        }
    }
}
