//! Periodic Exporter
//!
//! Background thread that exports a snapshot on a fixed interval.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Sender};

use crate::engine::Engine;
use crate::error::{Result, SentinelError};

/// Handle on the background export thread
///
/// The thread stops when [`stop`](Self::stop) is called or the handle is
/// dropped.
pub struct PeriodicExporter {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicExporter {
    /// Spawn the exporter; each tick calls `Engine::save` (exclusive lock)
    pub fn start(engine: Arc<Engine>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(SentinelError::Config(
                "snapshot interval must be non-zero".to_string(),
            ));
        }

        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let ticker = channel::tick(interval);

        let handle = thread::Builder::new()
            .name("sentineldb-exporter".to_string())
            .spawn(move || loop {
                crossbeam::select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticker) -> _ => match engine.save() {
                        Ok(stats) => tracing::info!(
                            "[auto] Snapshot saved in background ({} entries)",
                            stats.entries
                        ),
                        Err(e) => tracing::error!("[auto] Snapshot failed: {}", e),
                    },
                }
            })?;

        tracing::debug!("Periodic exporter started (every {:?})", interval);

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the channel, which also ends the loop
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Periodic exporter thread panicked");
            }
        }
    }
}

impl Drop for PeriodicExporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
