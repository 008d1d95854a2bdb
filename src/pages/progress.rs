use crate::process::Process;
use crate::step::{Page, StepContext};
use crate::ui::Container;
use crate::work::ProgressWork;
use std::time::Duration;

/// Runs [`ProgressWork`] with a progress bar
#[derive(Debug, Default)]
pub struct ProgressPage {
    work: ProgressWork,
}

impl ProgressPage {
    pub fn new(duration: Duration) -> Self {
        Self {
            work: ProgressWork::new(duration),
        }
    }
}

impl Page for ProgressPage {
    fn title(&self) -> &str {
        "Preparing"
    }

    fn produce_content(&mut self, container: &mut dyn Container, _ctx: &mut StepContext<'_>) {
        container.heading("Preparing");
        container.text("Please wait...");
    }

    fn produce_process(
        &mut self,
        container: &mut dyn Container,
        _ctx: &StepContext<'_>,
    ) -> Option<Process> {
        let process = Process::new(self.work);
        Some(match container.progress_bar() {
            Some(bar) => process.with_reporter(bar),
            None => process,
        })
    }
}
