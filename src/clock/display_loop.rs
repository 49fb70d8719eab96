//! Background clock display loop.
//!
//! While enabled, pushes the formatted home time to the display peripheral
//! once per second. The worker is cooperatively cancelled: it polls a stop
//! flag at sub-second intervals and `stop()` waits (bounded) for it to
//! exit, so no writes reach the display after `stop()` returns.

use super::resolver::TimeResolver;
use crate::hardware::DisplayPort;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Message pushed when the clock display is turned off.
const CLOCK_OFF_MESSAGE: &str = "Deskmate ready";

/// Bounded wait for the worker to observe the stop flag.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);

/// Sub-second slice for flag polling inside the worker.
const POLL_SLICE: Duration = Duration::from_millis(200);

/// Periodic clock pusher with two states: stopped and running.
pub struct ClockDisplayLoop {
    display: Arc<dyn DisplayPort>,
    resolver: Arc<TimeResolver>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ClockDisplayLoop {
    /// Create a stopped clock display loop.
    pub fn new(display: Arc<dyn DisplayPort>, resolver: Arc<TimeResolver>) -> Self {
        Self {
            display,
            resolver,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Whether the loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start pushing the clock to the display. No-op when already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = self.running.clone();
        let display = self.display.clone();
        let resolver = self.resolver.clone();

        let spawned = std::thread::Builder::new()
            .name("clock-display".into())
            .spawn(move || {
                tracing::info!("clock display loop started");
                while running.load(Ordering::SeqCst) {
                    let now = resolver.home_now();
                    let text = format!(
                        "Time: {}\nDate: {}",
                        now.format("%H:%M:%S"),
                        now.format("%d/%m/%Y")
                    );
                    if !display.display_message(&text) {
                        tracing::debug!("display unavailable, clock update skipped");
                    }

                    // Sleep one second in slices so a stop is seen promptly.
                    let mut slept = Duration::ZERO;
                    while slept < Duration::from_secs(1) && running.load(Ordering::SeqCst) {
                        std::thread::sleep(POLL_SLICE);
                        slept += POLL_SLICE;
                    }
                }
                tracing::info!("clock display loop exited");
            });

        match spawned {
            Ok(handle) => *self.worker.lock().unwrap() = Some(handle),
            Err(e) => {
                tracing::error!("failed to spawn clock display worker: {e}");
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stop the loop and reset the display. No-op when already stopped.
    ///
    /// Blocks briefly (up to ~2s) for the worker to observe the flag, which
    /// guarantees no further clock writes after this returns.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.worker.lock().unwrap().take() {
            let deadline = Instant::now() + STOP_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(50));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                tracing::warn!("clock display worker did not exit within {STOP_TIMEOUT:?}");
            }
        }

        self.display.display_message(CLOCK_OFF_MESSAGE);
    }
}

impl Drop for ClockDisplayLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
