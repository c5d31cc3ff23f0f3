//! Interrupt handling between batch phases

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::warn;

/// Set once SIGINT or SIGTERM arrives
///
/// The join itself is never interrupted; callers check the flag between
/// reading, joining and writing.
#[derive(Debug, Clone, Default)]
pub struct Shutdown(Arc<AtomicBool>);

impl Shutdown {
    /// Create a flag wired to the process signal handler
    pub fn install() -> Self {
        let shutdown = Self::default();
        let flag = shutdown.0.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        }) {
            warn!(error = %e, "Failed to install signal handler");
        }
        shutdown
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn requested(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fail with an interruption error once shutdown was requested
    pub fn check(&self, phase: &str) -> anyhow::Result<()> {
        if self.requested() {
            anyhow::bail!("Interrupted before {}", phase);
        }
        Ok(())
    }
}
