//! Boot sequence
//!
//! Loads every panel, runs diagnostics, and optionally takes the node
//! offline. Nothing here starts a task.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::{default_panels, EventLogger, OfflineMode, OverrideControl, Panel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootReport {
    /// Status lines, one per panel in load order
    pub panels: Vec<String>,
    pub diagnostics_passed: bool,
    pub airgapped: bool,
}

pub struct BootSequence {
    panels: Vec<Box<dyn Panel>>,
    diagnostics: OverrideControl,
    offline: OfflineMode,
    events: Arc<EventLogger>,
}

impl BootSequence {
    pub fn new(events: Arc<EventLogger>) -> Self {
        Self::with_panels(default_panels(), events)
    }

    pub fn with_panels(panels: Vec<Box<dyn Panel>>, events: Arc<EventLogger>) -> Self {
        Self {
            panels,
            diagnostics: OverrideControl::new(),
            offline: OfflineMode::new(),
            events,
        }
    }

    pub fn diagnostics(&self) -> &OverrideControl {
        &self.diagnostics
    }

    pub fn offline(&self) -> &OfflineMode {
        &self.offline
    }

    #[instrument(skip(self))]
    pub fn run(&self, airgapped: bool) -> BootReport {
        self.events.record("boot started");

        let panels: Vec<String> = self.panels.iter().map(|panel| panel.load()).collect();

        let diagnostics_passed = self.diagnostics.run_diagnostics();
        if !diagnostics_passed {
            warn!("Diagnostics failed, engaging override");
            self.diagnostics.trigger();
        }

        if airgapped {
            self.offline.enable();
            self.offline.set_airgapped(true);
        }

        self.events.record("boot complete");
        info!(panels = panels.len(), diagnostics_passed, airgapped, "Boot sequence complete");

        BootReport {
            panels,
            diagnostics_passed,
            airgapped: self.offline.is_airgapped(),
        }
    }
}
