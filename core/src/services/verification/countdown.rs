//! Cancellable one-second countdown backing the code expiry display

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// Event emitted by a running countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Seconds left after this tick; always at least one
    Tick { remaining: u64 },
    /// The countdown reached zero; emitted once, then the stream ends
    Expired,
}

/// Owned handle to a countdown task
///
/// Dropping the handle cancels the task. Events already queued on the
/// receiver are the caller's to discard.
#[derive(Debug)]
pub struct CountdownTimer {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// Starts counting down from `duration_seconds`
    ///
    /// # Returns
    ///
    /// The handle and the receiving end of the event stream. The stream ends
    /// after `Expired` or after cancellation.
    pub fn start(duration_seconds: u64) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            if duration_seconds == 0 {
                let _ = tx.send(TimerEvent::Expired);
                return;
            }

            let mut ticker = time::interval_at(Instant::now() + TICK, TICK);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut remaining = duration_seconds;

            loop {
                tokio::select! {
                    biased;
                    _ = task_cancel.cancelled() => {
                        debug!(remaining, "Countdown cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        remaining -= 1;
                        if remaining == 0 {
                            let _ = tx.send(TimerEvent::Expired);
                            break;
                        }
                        if tx.send(TimerEvent::Tick { remaining }).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        (Self { cancel, handle }, rx)
    }

    /// Stops the countdown; no further events are produced
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Renders seconds as `M:SS`
pub fn format_countdown(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
