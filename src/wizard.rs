//! Wizard Controller - Ordered steps, navigation and terminal pages
//!
//! ARCHITECTURE: the wizard lives on the main context together with the
//! surface. Processes started by steps report back over one channel; the
//! embedding loop calls [`Wizard::dispatch_pending`] (or
//! [`Wizard::wait_event`]) to apply those reports, which is where status
//! changes, automatic failure jumps and button refreshes happen.
//!
//! The sequence is always `[welcome] + user steps + [success]`, with the
//! failure page appended the first time any step fails.

use crate::answers::Answers;
use crate::config::WizardConfig;
use crate::pages::{FailurePage, SuccessPage, WelcomePage};
use crate::process::{self, Envelope, EventReceiver, EventSender, ProcessError};
use crate::status::StepRole;
use crate::step::{Page, Step, StepContext};
use crate::ui::{
    Button, Navigation, SidebarEntry, Surface, BACK_LABEL, CANCEL_LABEL, FINISH_LABEL, NEXT_LABEL,
};
use std::time::Duration;

/// Question asked by [`Wizard::request_cancel`]
pub const CANCEL_QUESTION: &str = "Are you sure you want to cancel the wizard?";

/// How a wizard session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Finished from the success page (or the last step)
    Completed,
    /// Finished from the failure page
    Failed,
    /// Cancelled by the user
    Cancelled,
}

pub struct Wizard {
    config: WizardConfig,
    surface: Box<dyn Surface>,
    steps: Vec<Step>,
    current: usize,

    // Built-in steps, parked here while they are not in the sequence
    welcome: Option<Step>,
    success: Option<Step>,
    failure: Option<Step>,
    inserted_welcome: bool,
    inserted_success: bool,
    inserted_failure: bool,

    answers: Answers,
    last_failure: Option<ProcessError>,
    events_tx: EventSender,
    events_rx: EventReceiver,
    ended: Option<SessionEnd>,
}

impl Wizard {
    pub fn new(config: WizardConfig, surface: impl Surface + 'static) -> Self {
        let (events_tx, events_rx) = process::channel();
        let mut surface: Box<dyn Surface> = Box::new(surface);
        surface.set_title(&config.window_title());

        Self {
            config,
            surface,
            steps: Vec::new(),
            current: 0,
            welcome: Some(Step::welcome(WelcomePage::new())),
            success: Some(Step::terminal_success(SuccessPage::new())),
            failure: Some(Step::terminal_failure(FailurePage::new())),
            inserted_welcome: false,
            inserted_success: false,
            inserted_failure: false,
            answers: Answers::new(),
            last_failure: None,
            events_tx,
            events_rx,
            ended: None,
        }
    }

    /// Replace the flow with `[welcome] + steps + [success]` and show the first step
    ///
    /// The success page is not added when `steps` already contains a
    /// `TerminalSuccess` step. Steps of the previous flow are cancelled
    /// and dropped.
    pub fn set_steps(&mut self, steps: Vec<Step>) {
        self.reclaim_builtin();

        if let Some(welcome) = self.welcome.take() {
            self.steps.push(welcome);
            self.inserted_welcome = true;
        }
        self.steps.extend(steps);
        self.insert_terminal(StepRole::TerminalSuccess);

        self.current = 0;
        self.last_failure = None;
        self.ended = None;

        tracing::info!(steps = self.steps.len(), "wizard flow set");
        self.show_current();
    }

    /// Make sure the terminal step for `role` is in the sequence
    ///
    /// Returns its index, appending the built-in page only if no step with
    /// that role is present yet. `None` for non-terminal roles.
    pub fn insert_terminal(&mut self, role: StepRole) -> Option<usize> {
        if !role.is_terminal() {
            return None;
        }
        if let Some(index) = self.steps.iter().position(|s| s.role() == role) {
            return Some(index);
        }

        let (slot, inserted) = match role {
            StepRole::TerminalSuccess => (&mut self.success, &mut self.inserted_success),
            StepRole::TerminalFailure => (&mut self.failure, &mut self.inserted_failure),
            StepRole::Normal | StepRole::Welcome => return None,
        };
        let step = slot.take()?;
        *inserted = true;

        tracing::info!(?role, "terminal step appended");
        self.steps.push(step);
        Some(self.steps.len() - 1)
    }

    /// Go to the next step
    ///
    /// A failed step leads to the failure page. Otherwise this is a no-op
    /// while the step cannot proceed, on the last step or on a terminal page.
    pub fn next(&mut self) -> bool {
        if self.ended.is_some() || self.is_terminal() {
            return false;
        }
        let Some(step) = self.steps.get(self.current) else {
            return false;
        };

        if step.is_failed() {
            self.last_failure = step.failure().cloned();
            return self.jump_to_failure();
        }
        if !step.can_proceed() || self.current + 1 >= self.steps.len() {
            return false;
        }

        self.current += 1;
        tracing::debug!(index = self.current, "next step");
        self.show_current();
        true
    }

    /// Go to the previous step
    ///
    /// No-op while running, on the first step or on a terminal page.
    pub fn prev(&mut self) -> bool {
        if self.ended.is_some() || self.is_terminal() {
            return false;
        }
        let Some(step) = self.steps.get(self.current) else {
            return false;
        };
        if step.is_running() || self.current == 0 {
            return false;
        }

        self.current -= 1;
        tracing::debug!(index = self.current, "previous step");
        self.show_current();
        true
    }

    /// Jump straight to a step that already ran
    ///
    /// Only steps whose status is `Success` or `Failed` can be picked, and
    /// not while the current step is running. Picking the current step
    /// does nothing.
    pub fn go_to(&mut self, index: usize) -> bool {
        if !self.can_go_to(index) {
            return false;
        }

        self.current = index;
        tracing::debug!(index, "jumping to step");
        self.show_current();
        true
    }

    /// Whether [`Wizard::go_to`] would move to `index`
    pub fn can_go_to(&self, index: usize) -> bool {
        self.ended.is_none()
            && index != self.current
            && !self.is_running()
            && self
                .steps
                .get(index)
                .is_some_and(|s| s.status().is_finished())
    }

    /// React to the step at `index` finishing its run
    ///
    /// A failure jumps straight to the failure page; anything else only
    /// refreshes the step list and buttons.
    pub fn on_step_status_changed(&mut self, index: usize) {
        let Some(step) = self.steps.get(index) else {
            return;
        };

        if step.is_failed() {
            self.last_failure = step.failure().cloned();
            self.jump_to_failure();
        } else {
            self.refresh();
        }
    }

    /// Apply every report already waiting. Returns how many were applied.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.events_rx.try_recv() {
            self.dispatch(envelope);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for a report, then apply everything waiting
    ///
    /// Returns `false` if nothing arrived in time.
    pub fn wait_event(&mut self, timeout: Duration) -> bool {
        match self.events_rx.recv_timeout(timeout) {
            Ok(envelope) => {
                self.dispatch(envelope);
                self.dispatch_pending();
                true
            }
            Err(_) => false,
        }
    }

    /// Cancel the current step's process and end the session
    pub fn cancel_current(&mut self) {
        if self.ended.is_some() {
            return;
        }

        let index = self.current;
        if let Some(status) = self.steps.get_mut(index).and_then(Step::cancel) {
            tracing::info!(%status, "current step cancelled");
            self.on_step_status_changed(index);
        }
        self.end(SessionEnd::Cancelled);
    }

    /// Ask the user to confirm, then [`Wizard::cancel_current`]
    pub fn request_cancel(&mut self) -> bool {
        if self.ended.is_some() {
            return false;
        }
        if !self.surface.confirm(CANCEL_QUESTION) {
            tracing::debug!("cancel declined");
            return false;
        }
        self.cancel_current();
        true
    }

    /// End the session from a terminal page or a finished last step
    pub fn finish(&mut self) -> Option<SessionEnd> {
        if self.ended.is_some() {
            return None;
        }
        let step = self.steps.get(self.current)?;

        let end = match step.role() {
            StepRole::TerminalFailure => SessionEnd::Failed,
            StepRole::TerminalSuccess => SessionEnd::Completed,
            _ if self.current + 1 == self.steps.len() && step.can_proceed() => {
                SessionEnd::Completed
            }
            _ => return None,
        };

        self.end(end);
        Some(end)
    }

    pub fn set_welcome_page(&mut self, page: impl Page + 'static) {
        self.replace_builtin(Step::welcome(page));
    }

    pub fn set_success_page(&mut self, page: impl Page + 'static) {
        self.replace_builtin(Step::terminal_success(page));
    }

    pub fn set_failure_page(&mut self, page: impl Page + 'static) {
        self.replace_builtin(Step::terminal_failure(page));
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.steps.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether [`Wizard::prev`] would move
    pub fn can_go_back(&self) -> bool {
        self.ended.is_none()
            && self.current > 0
            && self
                .current_step()
                .is_some_and(|s| !s.is_running() && !s.role().is_terminal())
    }

    /// Whether [`Wizard::next`] would move
    pub fn can_go_forward(&self) -> bool {
        let has_next = self.current + 1 < self.steps.len();
        self.ended.is_none()
            && self.current_step().is_some_and(|s| {
                !s.role().is_terminal() && (s.is_failed() || (s.can_proceed() && has_next))
            })
    }

    pub fn is_terminal(&self) -> bool {
        self.current_step().is_some_and(|s| s.role().is_terminal())
    }

    /// Whether the current step's process is running
    pub fn is_running(&self) -> bool {
        self.current_step().is_some_and(Step::is_running)
    }

    pub fn session_end(&self) -> Option<SessionEnd> {
        self.ended
    }

    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut Answers {
        &mut self.answers
    }

    pub fn last_failure(&self) -> Option<&ProcessError> {
        self.last_failure.as_ref()
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    /// Button affordances for the current step
    pub fn navigation(&self) -> Navigation {
        let Some(step) = self.current_step() else {
            let hidden = |label| Button {
                visible: false,
                enabled: false,
                label,
            };
            return Navigation {
                back: hidden(BACK_LABEL),
                next: hidden(NEXT_LABEL),
                cancel: hidden(CANCEL_LABEL),
            };
        };

        let open = self.ended.is_none();
        let terminal = step.role().is_terminal();
        let last = self.current + 1 >= self.steps.len();

        Navigation {
            back: Button {
                visible: !terminal && self.current > 0,
                enabled: open && !step.is_running(),
                label: BACK_LABEL,
            },
            next: Button {
                visible: true,
                enabled: open && (terminal || step.can_proceed() || step.is_failed()),
                label: if terminal || last { FINISH_LABEL } else { NEXT_LABEL },
            },
            cancel: Button {
                visible: !terminal,
                enabled: open,
                label: CANCEL_LABEL,
            },
        }
    }

    /// Step list with status and current marker
    pub fn sidebar(&self) -> Vec<SidebarEntry> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| SidebarEntry {
                title: step.title().to_string(),
                status: step.status(),
                current: i == self.current,
            })
            .collect()
    }

    fn dispatch(&mut self, envelope: Envelope) {
        let Some(index) = self
            .steps
            .iter()
            .position(|s| s.process_id() == Some(envelope.process))
        else {
            tracing::debug!(process = envelope.process, "event for a discarded process");
            return;
        };

        if let Some(status) = self.steps[index].handle_event(envelope) {
            tracing::info!(step = self.steps[index].title(), %status, "step finished");
            self.on_step_status_changed(index);
        }
    }

    fn jump_to_failure(&mut self) -> bool {
        let Some(index) = self.insert_terminal(StepRole::TerminalFailure) else {
            tracing::warn!("no failure page available");
            self.refresh();
            return false;
        };
        if index == self.current {
            self.refresh();
            return false;
        }

        self.current = index;
        tracing::info!(index, "jumping to failure page");
        self.show_current();
        true
    }

    fn end(&mut self, end: SessionEnd) {
        tracing::info!(?end, "wizard session ended");
        self.ended = Some(end);
        self.refresh();
        self.surface.close(end);
    }

    fn show_current(&mut self) {
        let Some(step) = self.steps.get_mut(self.current) else {
            return;
        };

        self.surface.clear();
        let mut ctx = StepContext {
            config: &self.config,
            answers: &mut self.answers,
            last_failure: self.last_failure.as_ref(),
        };
        step.render(self.surface.content(), &mut ctx, &self.events_tx);

        self.refresh();
    }

    fn refresh(&mut self) {
        let sidebar = self.sidebar();
        let navigation = self.navigation();
        self.surface.show_steps(&sidebar);
        self.surface.show_navigation(&navigation);
    }

    /// Put a built-in page in place, in the sequence if it is there already
    fn replace_builtin(&mut self, step: Step) {
        let role = step.role();
        let in_sequence = match role {
            StepRole::Welcome => self.inserted_welcome,
            StepRole::TerminalSuccess => self.inserted_success,
            StepRole::TerminalFailure => self.inserted_failure,
            StepRole::Normal => return,
        };

        if in_sequence {
            let index = match role {
                StepRole::Welcome => Some(0),
                _ => self.steps.iter().position(|s| s.role() == role),
            };
            if let Some(index) = index.filter(|&i| i < self.steps.len()) {
                self.steps[index] = step;
                if index == self.current {
                    self.show_current();
                }
                return;
            }
        }

        match role {
            StepRole::Welcome => self.welcome = Some(step),
            StepRole::TerminalSuccess => self.success = Some(step),
            StepRole::TerminalFailure => self.failure = Some(step),
            StepRole::Normal => {}
        }
    }

    /// Park the built-in steps again and drop the rest of the sequence
    fn reclaim_builtin(&mut self) {
        for step in &mut self.steps {
            let _ = step.cancel();
        }

        // Failure is appended after success, which comes after the user steps.
        if std::mem::take(&mut self.inserted_failure) {
            if let Some(mut step) = self.steps.pop() {
                step.reset();
                self.failure = Some(step);
            }
        }
        if std::mem::take(&mut self.inserted_success) {
            if let Some(mut step) = self.steps.pop() {
                step.reset();
                self.success = Some(step);
            }
        }
        if std::mem::take(&mut self.inserted_welcome) && !self.steps.is_empty() {
            let mut step = self.steps.remove(0);
            step.reset();
            self.welcome = Some(step);
        }

        self.steps.clear();
    }
}

impl Drop for Wizard {
    fn drop(&mut self) {
        for step in &mut self.steps {
            let _ = step.cancel();
        }
    }
}
