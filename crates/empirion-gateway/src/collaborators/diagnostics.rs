//! Diagnostics and manual override toggle

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct OverrideControl {
    active: AtomicBool,
    diagnostics_runs: AtomicU64,
}

impl OverrideControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the self-check. Passes unless the override is engaged.
    pub fn run_diagnostics(&self) -> bool {
        let run = self.diagnostics_runs.fetch_add(1, Ordering::Relaxed) + 1;
        let passed = !self.is_active();
        info!(run, passed, "Diagnostics complete");
        passed
    }

    /// Engage the manual override
    pub fn trigger(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            warn!("Manual override engaged");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn diagnostics_runs(&self) -> u64 {
        self.diagnostics_runs.load(Ordering::Relaxed)
    }
}
