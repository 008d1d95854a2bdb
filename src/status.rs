//! Step Status and Role
//!
//! `StepStatus` tracks a single run of a step; `StepRole` marks the
//! distinguished pages the wizard inserts on its own.

use std::fmt;

/// Lifecycle of a step within one run
///
/// ```text
/// Pending ──► Running ──┬──► Success
///                       └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    /// Not started (or no process to run)
    #[default]
    Pending,

    /// Background process is running
    Running,

    /// Process completed successfully
    Success,

    /// Process failed or was cancelled
    Failed,
}

impl StepStatus {
    /// Marker shown next to the step in a step list
    pub fn glyph(self) -> &'static str {
        match self {
            StepStatus::Pending => "○",
            StepStatus::Running => "⟳",
            StepStatus::Success => "✓",
            StepStatus::Failed => "✗",
        }
    }

    /// Whether the run has reached a final state
    pub fn is_finished(self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepStatus::Pending => "pending",
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Role of a step in the sequence, compared by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepRole {
    /// A user-supplied page
    #[default]
    Normal,

    /// First page of every flow
    Welcome,

    /// Last page of a successful flow
    TerminalSuccess,

    /// Page the wizard jumps to when a step fails
    TerminalFailure,
}

impl StepRole {
    /// Whether this role ends the flow
    pub fn is_terminal(self) -> bool {
        matches!(self, StepRole::TerminalSuccess | StepRole::TerminalFailure)
    }
}
