//! Headless Surface - Records what the wizard shows
//!
//! Used for unattended runs and for driving the wizard from tests. Toggles,
//! selections and confirmations are answered from a script; everything shown
//! is appended to a shared [`Transcript`].

use crate::report::{LogSink, ProgressReporter};
use crate::ui::{Container, Navigation, SidebarEntry, Surface};
use crate::wizard::SessionEnd;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Everything a [`HeadlessSurface`] was shown
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub title: Option<String>,
    pub headings: Vec<String>,
    pub texts: Vec<String>,
    pub percents: Vec<f64>,
    pub etas: Vec<Option<f64>>,
    pub elapsed: Vec<f64>,
    pub log_lines: Vec<String>,
    pub sidebars: Vec<Vec<SidebarEntry>>,
    pub navigation: Vec<Navigation>,
    pub confirms: Vec<String>,
    pub clears: usize,
    pub closed: Option<SessionEnd>,
}

/// Shared handle to a [`Record`], kept by whoever inspects the run
#[derive(Debug, Clone, Default)]
pub struct Transcript(Rc<RefCell<Record>>);

impl Transcript {
    /// Snapshot of everything recorded so far
    pub fn record(&self) -> Record {
        self.0.borrow().clone()
    }

    pub fn clears(&self) -> usize {
        self.0.borrow().clears
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.0.borrow().log_lines.clone()
    }

    pub fn percents(&self) -> Vec<f64> {
        self.0.borrow().percents.clone()
    }

    pub fn headings(&self) -> Vec<String> {
        self.0.borrow().headings.clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.0.borrow().texts.clone()
    }

    pub fn last_navigation(&self) -> Option<Navigation> {
        self.0.borrow().navigation.last().copied()
    }

    pub fn last_sidebar(&self) -> Option<Vec<SidebarEntry>> {
        self.0.borrow().sidebars.last().cloned()
    }

    pub fn closed(&self) -> Option<SessionEnd> {
        self.0.borrow().closed
    }

    fn with<R>(&self, f: impl FnOnce(&mut Record) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

/// A surface without a terminal
#[derive(Debug)]
pub struct HeadlessSurface {
    transcript: Transcript,
    generation: Rc<Cell<u64>>,
    toggles: HashMap<String, bool>,
    choices: HashMap<String, usize>,
    confirm_answer: bool,
    with_progress: bool,
    with_log: bool,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::default(),
            generation: Rc::new(Cell::new(0)),
            toggles: HashMap::new(),
            choices: HashMap::new(),
            confirm_answer: true,
            with_progress: true,
            with_log: true,
        }
    }

    /// Answer the checkbox labelled `label` with `value`
    pub fn toggling(mut self, label: impl Into<String>, value: bool) -> Self {
        self.toggles.insert(label.into(), value);
        self
    }

    /// Answer the choice labelled `label` with option `index`
    pub fn choosing(mut self, label: impl Into<String>, index: usize) -> Self {
        self.choices.insert(label.into(), index);
        self
    }

    /// Answer every confirmation with `answer`
    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirm_answer = answer;
        self
    }

    pub fn without_progress_bar(mut self) -> Self {
        self.with_progress = false;
        self
    }

    pub fn without_log_view(mut self) -> Self {
        self.with_log = false;
        self
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }
}

impl Container for HeadlessSurface {
    fn heading(&mut self, text: &str) {
        self.transcript.with(|r| r.headings.push(text.to_string()));
    }

    fn text(&mut self, text: &str) {
        self.transcript.with(|r| r.texts.push(text.to_string()));
    }

    fn toggle(&mut self, label: &str, current: bool) -> bool {
        self.toggles.get(label).copied().unwrap_or(current)
    }

    fn select(&mut self, label: &str, options: &[&str], current: usize) -> usize {
        let index = self.choices.get(label).copied().unwrap_or(current);
        if index < options.len() {
            index
        } else {
            current
        }
    }

    fn progress_bar(&mut self) -> Option<Box<dyn ProgressReporter>> {
        if !self.with_progress {
            return None;
        }
        Some(Box::new(Attached {
            transcript: self.transcript.clone(),
            generation: Rc::clone(&self.generation),
            created: self.generation.get(),
        }))
    }

    fn log_view(&mut self) -> Option<Box<dyn LogSink>> {
        if !self.with_log {
            return None;
        }
        Some(Box::new(Attached {
            transcript: self.transcript.clone(),
            generation: Rc::clone(&self.generation),
            created: self.generation.get(),
        }))
    }
}

impl Surface for HeadlessSurface {
    fn set_title(&mut self, title: &str) {
        self.transcript.with(|r| r.title = Some(title.to_string()));
    }

    fn clear(&mut self) {
        self.generation.set(self.generation.get() + 1);
        self.transcript.with(|r| r.clears += 1);
    }

    fn content(&mut self) -> &mut dyn Container {
        self
    }

    fn show_steps(&mut self, steps: &[SidebarEntry]) {
        self.transcript.with(|r| r.sidebars.push(steps.to_vec()));
    }

    fn show_navigation(&mut self, navigation: &Navigation) {
        self.transcript.with(|r| r.navigation.push(*navigation));
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.transcript.with(|r| r.confirms.push(question.to_string()));
        self.confirm_answer
    }

    fn close(&mut self, end: SessionEnd) {
        self.transcript.with(|r| r.closed = Some(end));
    }
}

/// Progress bar or log view handed to a page; detached once the surface is cleared
struct Attached {
    transcript: Transcript,
    generation: Rc<Cell<u64>>,
    created: u64,
}

impl ProgressReporter for Attached {
    fn set_percent(&mut self, percent: f64) {
        self.transcript.with(|r| r.percents.push(percent));
    }

    fn set_eta(&mut self, seconds: Option<f64>) {
        self.transcript.with(|r| r.etas.push(seconds));
    }

    fn set_elapsed_time(&mut self, seconds: f64) {
        self.transcript.with(|r| r.elapsed.push(seconds));
    }

    fn is_attached(&self) -> bool {
        self.generation.get() == self.created
    }
}

impl LogSink for Attached {
    fn append_line(&mut self, line: &str) {
        self.transcript.with(|r| r.log_lines.push(line.to_string()));
    }

    fn is_attached(&self) -> bool {
        self.generation.get() == self.created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displays_detach_on_clear() {
        let mut surface = HeadlessSurface::new();
        let transcript = surface.transcript();

        let mut bar = surface.progress_bar().unwrap();
        let log = surface.log_view().unwrap();
        assert!(bar.is_attached());
        assert!(log.is_attached());

        bar.set_percent(10.0);
        surface.clear();

        assert!(!bar.is_attached());
        assert!(!log.is_attached());
        assert_eq!(transcript.percents(), vec![10.0]);
        assert_eq!(transcript.clears(), 1);
    }

    #[test]
    fn test_scripted_answers() {
        let mut surface = HeadlessSurface::new()
            .toggling("Trigger wizard error", true)
            .choosing("Setup type", 2)
            .confirming(false);

        assert!(surface.toggle("Trigger wizard error", false));
        assert!(!surface.toggle("Other", false));
        assert_eq!(surface.select("Setup type", &["a", "b", "c"], 0), 2);
        assert_eq!(surface.select("Setup type", &["a"], 0), 0);
        assert!(!surface.confirm("Quit?"));
        assert_eq!(surface.transcript().record().confirms, vec!["Quit?"]);
    }

    #[test]
    fn test_optional_displays() {
        let mut surface = HeadlessSurface::new()
            .without_progress_bar()
            .without_log_view();
        assert!(surface.progress_bar().is_none());
        assert!(surface.log_view().is_none());
    }
}
