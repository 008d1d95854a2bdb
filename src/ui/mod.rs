//! Presentation contracts
//!
//! A [`Surface`] is whatever shows the wizard: it is cleared and handed to
//! the current page as a [`Container`] on every render, then shown the step
//! list and the navigation buttons. Two surfaces ship with the crate:
//! [`terminal::TerminalSurface`] for interactive use and
//! [`headless::HeadlessSurface`] which records everything it is shown.

use crate::report::{LogSink, ProgressReporter};
use crate::status::StepStatus;
use crate::wizard::SessionEnd;

pub mod headless;
pub mod terminal;

/// Where a page puts its content
pub trait Container {
    fn heading(&mut self, text: &str);

    fn text(&mut self, text: &str);

    /// Show a checkbox and return its value
    fn toggle(&mut self, label: &str, current: bool) -> bool;

    /// Show a single choice between `options` and return the chosen index
    fn select(&mut self, label: &str, options: &[&str], current: usize) -> usize;

    /// A progress display for the process this page starts, if the surface has one
    fn progress_bar(&mut self) -> Option<Box<dyn ProgressReporter>>;

    /// A log display for the process this page starts, if the surface has one
    fn log_view(&mut self) -> Option<Box<dyn LogSink>>;
}

/// The window-level presentation layer the wizard drives
pub trait Surface {
    fn set_title(&mut self, _title: &str) {}

    /// Drop the previous page's content; displays handed out before become detached
    fn clear(&mut self);

    fn content(&mut self) -> &mut dyn Container;

    fn show_steps(&mut self, steps: &[SidebarEntry]);

    fn show_navigation(&mut self, navigation: &Navigation);

    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> bool;

    fn close(&mut self, _end: SessionEnd) {}
}

/// One entry of the step list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub title: String,
    pub status: StepStatus,
    pub current: bool,
}

impl SidebarEntry {
    /// "✓ Title"
    pub fn line(&self) -> String {
        format!("{} {}", self.status.glyph(), self.title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub visible: bool,
    pub enabled: bool,
    pub label: &'static str,
}

impl Button {
    pub fn is_clickable(&self) -> bool {
        self.visible && self.enabled
    }
}

pub const BACK_LABEL: &str = "< Back";
pub const NEXT_LABEL: &str = "Next >";
pub const FINISH_LABEL: &str = "Finish";
pub const CANCEL_LABEL: &str = "Cancel";

/// Button affordances for the current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub back: Button,
    pub next: Button,
    pub cancel: Button,
}
