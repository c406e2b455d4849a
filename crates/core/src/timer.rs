//! Cancellable Countdown Timer
//!
//! A one-second countdown that runs as a background task and reports each
//! tick over a channel. The receiving side (the session driver) routes timer
//! events through the same serialized event loop as learner input, so tick
//! handling never races a submission.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Events emitted by a running [`CountdownTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Fired once per elapsed second with the seconds left after decrement.
    Tick { remaining: u32 },
    /// Fired exactly once, when the countdown reaches zero.
    Expired,
}

/// An independent, cancellable ticking clock.
///
/// `arm` + `start` fully replace any previous countdown; there is never more
/// than one task ticking. `stop` is idempotent and safe when not running, and
/// the timer stops itself on drop so an abandoned session cannot receive a
/// stale expiry.
pub struct CountdownTimer {
    events: mpsc::Sender<TimerEvent>,
    remaining: Arc<AtomicU32>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new(events: mpsc::Sender<TimerEvent>) -> Self {
        Self {
            events,
            remaining: Arc::new(AtomicU32::new(0)),
            handle: None,
        }
    }

    /// Loads a fresh countdown, cancelling any countdown in progress.
    pub fn arm(&mut self, total_seconds: u32) {
        self.stop();
        self.remaining.store(total_seconds, Ordering::SeqCst);
    }

    /// Begins ticking. A timer armed with zero seconds never starts.
    pub fn start(&mut self) {
        self.stop();
        if self.remaining.load(Ordering::SeqCst) == 0 {
            debug!("countdown armed with zero seconds; not starting");
            return;
        }

        let events = self.events.clone();
        let remaining = Arc::clone(&self.remaining);
        self.handle = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let left = remaining.load(Ordering::SeqCst).saturating_sub(1);
                remaining.store(left, Ordering::SeqCst);
                if events.send(TimerEvent::Tick { remaining: left }).await.is_err() {
                    // Receiver gone; the session is over.
                    return;
                }
                if left == 0 {
                    let _ = events.send(TimerEvent::Expired).await;
                    return;
                }
            }
        }));
    }

    /// Cancels the countdown. Safe to call repeatedly or when idle.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Seconds left on the current countdown.
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
