use super::SIMULATE_ERROR_KEY;
use crate::process::Process;
use crate::step::{Page, StepContext};
use crate::ui::Container;
use crate::work::LogWork;
use std::time::Duration;

/// Streams [`LogWork`] into a log view
///
/// When the checklist asked for an error there is no log view and the
/// work fails right away.
#[derive(Debug, Default)]
pub struct LogsPage {
    work: LogWork,
    failing: bool,
}

impl LogsPage {
    pub fn new(work: LogWork) -> Self {
        Self {
            work,
            failing: false,
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self::new(LogWork::default().with_delay(delay))
    }
}

impl Page for LogsPage {
    fn title(&self) -> &str {
        "Processing"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        self.failing = ctx.answers.flag(SIMULATE_ERROR_KEY);

        if self.failing {
            container.heading("Checking Status");
            container.text("Checking wizard status...");
        } else {
            container.heading("Processing");
            container.text("Processing...");
        }
    }

    fn produce_process(
        &mut self,
        container: &mut dyn Container,
        _ctx: &StepContext<'_>,
    ) -> Option<Process> {
        let work = self.work.clone().failing(self.failing);
        if self.failing {
            return Some(Process::new(work));
        }

        let process = Process::new(work);
        Some(match container.log_view() {
            Some(view) => process.with_log(view),
            None => process,
        })
    }
}
