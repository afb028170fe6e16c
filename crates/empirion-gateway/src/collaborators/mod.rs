//! Side-effect-only collaborators used by the boot sequence and supervisor
//!
//! Everything here is synchronous and holds no lock across a call into the
//! agent runtime.

pub mod boot;
pub mod diagnostics;
pub mod event_log;
pub mod offline;
pub mod panels;

pub use self::boot::{BootReport, BootSequence};
pub use self::diagnostics::OverrideControl;
pub use self::event_log::{EventLogger, EventRecord, DEFAULT_EVENT_CAPACITY};
pub use self::offline::OfflineMode;
pub use self::panels::{default_panels, Panel, StatusPanel};
