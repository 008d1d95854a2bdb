//! Stepwise Library - Linear wizard driver
//!
//! This library provides:
//! - Background processes with cooperative cancellation and a single-shot completion
//! - Steps wrapping page content and an optional process
//! - The wizard controller: ordered steps, navigation, terminal pages
//! - Built-in pages and reference workloads
//! - Terminal and headless presentation surfaces

pub mod answers;
pub mod config;
pub mod pages;
pub mod process;
pub mod report;
pub mod status;
pub mod step;
pub mod ui;
pub mod wizard;
pub mod work;

pub use answers::{Answer, Answers};
pub use config::{ConfigError, WizardConfig};
pub use process::{Outcome, Process, ProcessContext, ProcessError, ProcessId, Work};
pub use report::{LogSink, ProgressReporter, ProgressUpdate};
pub use status::{StepRole, StepStatus};
pub use step::{Page, Step, StepContext};
pub use ui::{Container, Navigation, SidebarEntry, Surface};
pub use wizard::{SessionEnd, Wizard};
