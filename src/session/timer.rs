// src/session/timer.rs

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Periodic tick source scoped to the lifetime of the guard.
///
/// The first tick arrives one full period after `start`. Dropping the
/// `Ticker` aborts the background task, so nothing is sent after teardown.
#[derive(Debug)]
pub struct Ticker {
    task: JoinHandle<()>,
}

impl Ticker {
    pub fn start(period: Duration) -> (Self, mpsc::Receiver<()>) {
        // One slot: a slow consumer sees late ticks, never a burst.
        let (tx, rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });

        (Self { task }, rx)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.task.abort();
    }
}
