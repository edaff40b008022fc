//! Simulated upload progress.
//!
//! A fixed-interval ticker that walks from 0 to 100 over a nominal
//! duration. This is a pacing affordance for the UI, deliberately NOT
//! derived from actual transfer bytes; it may reach 100 before or after
//! the network response arrives.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Cosmetic percentage driven by a fixed-interval timer.
pub struct SimulatedProgress {
    percent: Arc<AtomicU8>,
    task: Mutex<Option<JoinHandle<()>>>,
    duration: Duration,
    tick: Duration,
}

impl SimulatedProgress {
    /// Create a simulation with the given nominal duration and tick interval.
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self {
            percent: Arc::new(AtomicU8::new(0)),
            task: Mutex::new(None),
            duration,
            tick,
        }
    }

    /// Start (or restart) the simulation from zero.
    pub fn start(&self) {
        let mut task = self.task.lock();
        if let Some(previous) = task.take() {
            previous.abort();
        }
        self.percent.store(0, Ordering::SeqCst);

        let steps = (self.duration.as_millis() / self.tick.as_millis().max(1)).max(1) as u64;
        let tick = self.tick;
        let percent = Arc::clone(&self.percent);

        *task = Some(tokio::spawn(async move {
            for step in 1..=steps {
                tokio::time::sleep(tick).await;
                let value = ((step * 100) / steps).min(100) as u8;
                percent.store(value, Ordering::SeqCst);
            }
        }));
    }

    /// Current percentage, 0..=100.
    pub fn value(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }

    /// Abort any running simulation and reset to zero.
    pub fn reset(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        self.percent.store(0, Ordering::SeqCst);
    }
}

impl Drop for SimulatedProgress {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}
