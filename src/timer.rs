//! Recurring tick source driving the countdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often the ticker wakes the engine. Elapsed time is measured against
/// the clock, so this only bounds display latency.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// A control request from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    StartPause,
    Reset,
    Skip,
    Quit,
}

/// Message delivered to the thread that owns the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// A tick from the ticker started with `generation`.
    Tick { generation: u64 },
    /// A control request from another thread.
    Command(Command),
}

/// A recurring callback the engine can start and cancel.
pub trait TickSource {
    /// Starts ticking, tagging every tick with `generation`. Any previously
    /// started ticker is cancelled first.
    fn start(&mut self, generation: u64);
    /// Cancels the active ticker, if any.
    fn stop(&mut self);
}

struct ActiveTicker {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ActiveTicker {
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // The thread exits on its next wake-up; no need to wait for it.
        drop(self.handle);
    }
}

/// Ticks from a background thread, one thread per run.
pub struct ThreadTicker {
    tx: Sender<TimerMessage>,
    interval: Duration,
    active: Option<ActiveTicker>,
}

impl ThreadTicker {
    pub fn new(tx: Sender<TimerMessage>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: Sender<TimerMessage>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            active: None,
        }
    }

    /// Returns true while a ticker thread is running.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl TickSource for ThreadTicker {
    fn start(&mut self, generation: u64) {
        self.stop();

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name(format!("ticker-{generation}"))
            .spawn(move || loop {
                thread::sleep(interval);
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(TimerMessage::Tick { generation }).is_err() {
                    // Receiver is gone, nobody is listening anymore.
                    break;
                }
            });

        match spawned {
            Ok(handle) => self.active = Some(ActiveTicker { cancelled, handle }),
            Err(e) => tracing::error!(error = %e, "failed to spawn ticker thread"),
        }
    }

    fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_thread_ticker_sends_tagged_ticks() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::with_interval(tx, Duration::from_millis(5));

        ticker.start(7);
        let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(msg, TimerMessage::Tick { generation: 7 });
        ticker.stop();
    }

    #[test]
    fn test_restart_replaces_previous_ticker() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::with_interval(tx, Duration::from_millis(5));

        ticker.start(1);
        ticker.start(2);
        assert!(ticker.is_active());

        // Give the first thread time to notice it was cancelled, then drain.
        thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}

        let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(msg, TimerMessage::Tick { generation: 2 });
        ticker.stop();
    }

    #[test]
    fn test_stop_ends_ticking() {
        let (tx, rx) = mpsc::channel();
        let mut ticker = ThreadTicker::with_interval(tx, Duration::from_millis(5));

        ticker.start(1);
        ticker.stop();
        assert!(!ticker.is_active());

        thread::sleep(Duration::from_millis(50));
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }
}
