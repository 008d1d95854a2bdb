//! Terminal pages

use super::CONFIGURATION_KEY;
use crate::step::{Page, StepContext};
use crate::ui::Container;

/// Shown when the flow completed
#[derive(Debug, Default)]
pub struct SuccessPage;

impl SuccessPage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for SuccessPage {
    fn title(&self) -> &str {
        "Finished"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        container.heading("Setup Completed Successfully!");
        container.text(&format!(
            "{} has been set up successfully.\n\nClick \"Finish\" to close the wizard.",
            ctx.config.name
        ));

        if let Some(choice) = ctx.answers.choice(CONFIGURATION_KEY) {
            container.text(&format!("Selected configuration: {choice}"));
        }
    }
}

/// Shown after a step failed or was cancelled
#[derive(Debug, Default)]
pub struct FailurePage;

impl FailurePage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for FailurePage {
    fn title(&self) -> &str {
        "Failed"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        container.heading("Setup Completed with Errors");
        container.text("An error occurred during setup.\n\nClick \"Finish\" to close the wizard.");

        if let Some(reason) = ctx.last_failure {
            container.text(&format!("Reason: {reason}"));
        }
    }
}
