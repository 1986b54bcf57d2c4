//! Background idle/active ticker
//!
//! Drives [`TrackerEngine::tick`](crate::engine::TrackerEngine::tick) on a
//! one-second cadence for the process's life. The engine lives behind one
//! mutex; the ticker takes the lock once per tick, so ingestion calls and
//! ticks never interleave mid-operation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::engine::SharedEngine;

/// Cadence of the ticker thread
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to the ticker thread. Stopping (or dropping) the handle signals
/// the thread and joins it.
#[derive(Debug)]
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the ticker thread over a shared engine.
    pub fn spawn(engine: SharedEngine) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();

        let handle = std::thread::Builder::new()
            .name("sidetrack-ticker".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    std::thread::sleep(TICK_INTERVAL);
                    if flag.load(Ordering::Relaxed) {
                        break;
                    }
                    match engine.lock() {
                        Ok(mut engine) => engine.tick(),
                        // Poisoned engine: a panic elsewhere already ended the session.
                        Err(_) => break,
                    }
                }
            })?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
