//! Wizard Step - One page of the flow and its optional process
//!
//! A [`Step`] pairs a [`Page`] (what is shown, what work it starts) with the
//! status of the current run. The step owns its [`Process`] and turns the
//! process outcome into a [`StepStatus`].

use crate::answers::Answers;
use crate::config::WizardConfig;
use crate::process::{Envelope, EventSender, Outcome, Process, ProcessError, ProcessId};
use crate::status::{StepRole, StepStatus};
use crate::ui::Container;
use std::fmt;

/// What a page can see while it renders
pub struct StepContext<'a> {
    pub config: &'a WizardConfig,
    pub answers: &'a mut Answers,
    /// Why the most recent failed step failed
    pub last_failure: Option<&'a ProcessError>,
}

/// Content and work of one step
pub trait Page {
    /// Name shown in the step list
    fn title(&self) -> &str;

    /// Populate the container. Interactive answers go into `ctx.answers`.
    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>);

    /// The background work for this step, if any
    ///
    /// Called right after [`Page::produce_content`], so the page can take a
    /// progress bar or log view from the same container.
    fn produce_process(
        &mut self,
        _container: &mut dyn Container,
        _ctx: &StepContext<'_>,
    ) -> Option<Process> {
        None
    }
}

pub struct Step {
    role: StepRole,
    page: Box<dyn Page>,
    status: StepStatus,
    process: Option<Process>,
    failure: Option<ProcessError>,
}

impl Step {
    pub fn new(page: impl Page + 'static) -> Self {
        Self::with_role(StepRole::Normal, page)
    }

    pub fn with_role(role: StepRole, page: impl Page + 'static) -> Self {
        Self {
            role,
            page: Box::new(page),
            status: StepStatus::Pending,
            process: None,
            failure: None,
        }
    }

    pub fn welcome(page: impl Page + 'static) -> Self {
        Self::with_role(StepRole::Welcome, page)
    }

    pub fn terminal_success(page: impl Page + 'static) -> Self {
        Self::with_role(StepRole::TerminalSuccess, page)
    }

    pub fn terminal_failure(page: impl Page + 'static) -> Self {
        Self::with_role(StepRole::TerminalFailure, page)
    }

    pub fn role(&self) -> StepRole {
        self.role
    }

    pub fn title(&self) -> &str {
        self.page.title()
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Failure reason of the last run, if it failed
    pub fn failure(&self) -> Option<&ProcessError> {
        self.failure.as_ref()
    }

    pub fn process_id(&self) -> Option<ProcessId> {
        self.process.as_ref().map(Process::id)
    }

    pub fn has_process(&self) -> bool {
        self.process.is_some()
    }

    /// Show the page and start its work
    ///
    /// Content is produced on every render. A process is only requested
    /// when the step does not hold one yet, so revisiting a finished step
    /// never runs its work again. Returns `true` if a process was started.
    pub fn render(
        &mut self,
        container: &mut dyn Container,
        ctx: &mut StepContext<'_>,
        events: &EventSender,
    ) -> bool {
        self.page.produce_content(container, ctx);

        if self.process.is_some() {
            return false;
        }

        let Some(mut process) = self.page.produce_process(container, ctx) else {
            return false;
        };

        tracing::debug!(step = self.title(), process = process.id(), "step running");
        self.status = StepStatus::Running;
        self.failure = None;
        let started = process.start(events.clone());
        self.process = Some(process);
        started
    }

    /// No process, or the process succeeded
    pub fn can_proceed(&self) -> bool {
        self.process.is_none() || self.status == StepStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }

    pub fn is_running(&self) -> bool {
        self.status == StepStatus::Running
    }

    /// Apply an event from this step's process
    ///
    /// Events from any other (or a discarded) process are ignored. Returns
    /// the new status when the event completed the run.
    pub fn handle_event(&mut self, envelope: Envelope) -> Option<StepStatus> {
        let process = self.process.as_mut()?;
        if process.id() != envelope.process {
            return None;
        }
        let outcome = process.apply(envelope.event)?;
        self.settle(outcome)
    }

    /// Cancel the running process
    ///
    /// The step is `Failed` when this returns; the worker may still be
    /// winding down. Returns `None` if there was nothing left to cancel.
    pub fn cancel(&mut self) -> Option<StepStatus> {
        let outcome = self.process.as_ref()?.cancel()?;
        self.settle(outcome)
    }

    /// Discard the process and go back to `Pending`
    ///
    /// Only for built-in pages parked between flows. A step of the current
    /// flow never runs twice.
    pub(crate) fn reset(&mut self) {
        if let Some(process) = self.process.take() {
            let _ = process.cancel();
        }
        self.status = StepStatus::Pending;
        self.failure = None;
    }

    fn settle(&mut self, outcome: Outcome) -> Option<StepStatus> {
        if self.status != StepStatus::Running {
            return None;
        }

        self.status = match outcome {
            Ok(()) => StepStatus::Success,
            Err(err) => {
                tracing::info!(step = self.title(), "step failed: {}", err);
                self.failure = Some(err);
                StepStatus::Failed
            }
        };
        Some(self.status)
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("title", &self.title())
            .field("role", &self.role)
            .field("status", &self.status)
            .field("process", &self.process)
            .finish()
    }
}
