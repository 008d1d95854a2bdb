//! Built-in pages
//!
//! Welcome, success and failure pages are installed by the wizard itself;
//! the others make up the demo flow or serve as building blocks.

mod checklist;
mod complete;
mod configuration;
mod logs;
mod progress;
mod task;
mod welcome;

pub use checklist::{ChecklistPage, TRIGGER_ERROR_LABEL};
pub use complete::{FailurePage, SuccessPage};
pub use configuration::{ConfigurationPage, CONFIGURATION_LABEL, CONFIGURATION_OPTIONS};
pub use logs::LogsPage;
pub use progress::ProgressPage;
pub use task::{InfoPage, TaskPage};
pub use welcome::WelcomePage;

/// Answer key for the chosen configuration
pub const CONFIGURATION_KEY: &str = "configuration";

/// Answer key for the "trigger error" checkbox
pub const SIMULATE_ERROR_KEY: &str = "simulate_error";
