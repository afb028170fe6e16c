//! Offline mode toggle

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

#[derive(Debug, Default)]
pub struct OfflineMode {
    enabled: AtomicBool,
    airgapped: AtomicBool,
}

impl OfflineMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&self) {
        if !self.enabled.swap(true, Ordering::SeqCst) {
            info!("Offline mode enabled");
        }
    }

    pub fn set_airgapped(&self, airgapped: bool) {
        self.airgapped.store(airgapped, Ordering::SeqCst);
        info!(airgapped, "Airgap updated");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_airgapped(&self) -> bool {
        self.airgapped.load(Ordering::SeqCst)
    }
}
