use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Periodic tick source on the tokio runtime.
///
/// Ticks are forwarded over a bounded channel so the task that owns the
/// tracker stays the only writer. Cancelling or dropping the ticker stops
/// the background task; no tick is delivered afterwards.
#[derive(Debug)]
pub struct Ticker {
    rx: mpsc::Receiver<Instant>,
    handle: JoinHandle<()>,
    cancelled: bool,
}

impl Ticker {
    /// Must be called from within a tokio runtime.
    pub fn spawn(period: Duration) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let at = interval.tick().await;
                if tx.send(at).await.is_err() {
                    break;
                }
            }
        });
        Self {
            rx,
            handle,
            cancelled: false,
        }
    }

    /// Next tick, or `None` once cancelled.
    pub async fn tick(&mut self) -> Option<Instant> {
        if self.cancelled {
            return None;
        }
        self.rx.recv().await
    }

    pub fn cancel(&mut self) {
        if !self.cancelled {
            self.cancelled = true;
            self.handle.abort();
            self.rx.close();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_ticks_in_order() {
        let mut ticker = Ticker::spawn(Duration::from_millis(5));
        let first = ticker.tick().await.unwrap();
        let second = ticker.tick().await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn cancel_stops_delivery() {
        let mut ticker = Ticker::spawn(Duration::from_millis(5));
        assert!(ticker.tick().await.is_some());
        ticker.cancel();
        assert!(ticker.is_cancelled());
        assert!(ticker.tick().await.is_none());
    }
}
