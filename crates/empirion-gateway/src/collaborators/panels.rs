//! Status panels
//!
//! A panel has no state beyond its name and status line; `load` only reports
//! that the panel came up.

use tracing::info;

pub trait Panel: Send + Sync {
    fn name(&self) -> &str;

    /// Bring the panel up and return its status line
    fn load(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct StatusPanel {
    name: &'static str,
    status: &'static str,
}

impl StatusPanel {
    pub const fn new(name: &'static str, status: &'static str) -> Self {
        Self { name, status }
    }

    pub const fn command_room() -> Self {
        Self::new("Command Room", "system status monitor online")
    }

    pub const fn department_view() -> Self {
        Self::new("Department View", "department metrics tracking")
    }

    pub const fn feature_console() -> Self {
        Self::new("Feature Console", "analytics collection active")
    }

    pub const fn deep_vault() -> Self {
        Self::new("Deep Vault", "secure storage sealed")
    }

    pub const fn external_hub() -> Self {
        Self::new("External Hub", "external connections monitored")
    }
}

impl Panel for StatusPanel {
    fn name(&self) -> &str {
        self.name
    }

    fn load(&self) -> String {
        let line = format!("[Load] {} initialized: {}", self.name, self.status);
        info!(panel = self.name, "{}", line);
        line
    }
}

/// Panels loaded by the boot sequence, in load order
pub fn default_panels() -> Vec<Box<dyn Panel>> {
    vec![
        Box::new(StatusPanel::command_room()),
        Box::new(StatusPanel::department_view()),
        Box::new(StatusPanel::feature_console()),
        Box::new(StatusPanel::deep_vault()),
        Box::new(StatusPanel::external_hub()),
    ]
}
