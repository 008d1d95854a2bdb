//! Terminal Surface - Interactive console presentation
//!
//! Progress is drawn with `indicatif`, choices are asked with `dialoguer`.
//! Without a terminal (or after `--yes`) every prompt takes its default.

use crate::report::{format_elapsed, format_eta, LogSink, ProgressReporter};
use crate::ui::{Container, Navigation, SidebarEntry, Surface};
use crate::wizard::SessionEnd;
use dialoguer::{Confirm, Select};
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::io::IsTerminal;
use std::rc::Rc;

const BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% {msg}";

pub struct TerminalSurface {
    interactive: bool,
    generation: Rc<Cell<u64>>,
    bars: Vec<ProgressBar>,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSurface {
    /// Interactive when both stdin and stdout are terminals
    pub fn new() -> Self {
        let interactive = std::io::stdin().is_terminal() && std::io::stdout().is_terminal();
        Self::with_interactive(interactive)
    }

    pub fn with_interactive(interactive: bool) -> Self {
        Self {
            interactive,
            generation: Rc::new(Cell::new(0)),
            bars: Vec::new(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Container for TerminalSurface {
    fn heading(&mut self, text: &str) {
        println!("\n{text}");
        println!("{}", "-".repeat(text.chars().count()));
    }

    fn text(&mut self, text: &str) {
        for line in text.lines() {
            println!("  {line}");
        }
    }

    fn toggle(&mut self, label: &str, current: bool) -> bool {
        if !self.interactive {
            return current;
        }

        Confirm::new()
            .with_prompt(label)
            .default(current)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!("prompt failed: {}", e);
                current
            })
    }

    fn select(&mut self, label: &str, options: &[&str], current: usize) -> usize {
        if !self.interactive || options.is_empty() {
            return current;
        }

        Select::new()
            .with_prompt(label)
            .items(options)
            .default(current.min(options.len() - 1))
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!("prompt failed: {}", e);
                current
            })
    }

    fn progress_bar(&mut self) -> Option<Box<dyn ProgressReporter>> {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        bar.set_message(format!("{}  {}", format_eta(None), format_elapsed(0.0)));
        self.bars.push(bar.clone());

        Some(Box::new(TerminalBar {
            bar,
            eta: None,
            generation: Rc::clone(&self.generation),
            created: self.generation.get(),
        }))
    }

    fn log_view(&mut self) -> Option<Box<dyn LogSink>> {
        Some(Box::new(TerminalLog {
            generation: Rc::clone(&self.generation),
            created: self.generation.get(),
        }))
    }
}

impl Surface for TerminalSurface {
    fn set_title(&mut self, title: &str) {
        println!("{title}");
        println!("{}", "=".repeat(title.chars().count()));
    }

    fn clear(&mut self) {
        for bar in self.bars.drain(..) {
            bar.abandon();
        }
        self.generation.set(self.generation.get() + 1);
    }

    fn content(&mut self) -> &mut dyn Container {
        self
    }

    fn show_steps(&mut self, steps: &[SidebarEntry]) {
        // Redrawing the list under a live progress bar would tear it.
        if self.bars.iter().any(|b| !b.is_finished()) {
            return;
        }

        let line = steps
            .iter()
            .map(|entry| {
                if entry.current {
                    format!("[{}]", entry.line())
                } else {
                    entry.line()
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("\n{line}");
    }

    fn show_navigation(&mut self, navigation: &Navigation) {
        tracing::debug!(
            back = navigation.back.is_clickable(),
            next = navigation.next.is_clickable(),
            cancel = navigation.cancel.is_clickable(),
            "navigation updated"
        );
    }

    fn confirm(&mut self, question: &str) -> bool {
        if !self.interactive {
            return true;
        }

        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                tracing::warn!("prompt failed: {}", e);
                false
            })
    }

    fn close(&mut self, end: SessionEnd) {
        self.clear();
        match end {
            SessionEnd::Completed => println!("\n✓ Wizard completed."),
            SessionEnd::Failed => println!("\n✗ Wizard finished with errors."),
            SessionEnd::Cancelled => println!("\n✗ Wizard cancelled."),
        }
    }
}

struct TerminalBar {
    bar: ProgressBar,
    eta: Option<f64>,
    generation: Rc<Cell<u64>>,
    created: u64,
}

impl ProgressReporter for TerminalBar {
    fn set_percent(&mut self, percent: f64) {
        self.bar.set_position(percent.round() as u64);
        if percent >= 100.0 {
            self.bar.finish();
        }
    }

    fn set_eta(&mut self, seconds: Option<f64>) {
        self.eta = seconds;
    }

    fn set_elapsed_time(&mut self, seconds: f64) {
        self.bar
            .set_message(format!("{}  {}", format_eta(self.eta), format_elapsed(seconds)));
    }

    fn is_attached(&self) -> bool {
        self.generation.get() == self.created
    }
}

struct TerminalLog {
    generation: Rc<Cell<u64>>,
    created: u64,
}

impl LogSink for TerminalLog {
    fn append_line(&mut self, line: &str) {
        println!("  │ {line}");
    }

    fn is_attached(&self) -> bool {
        self.generation.get() == self.created
    }
}
