use super::SIMULATE_ERROR_KEY;
use crate::step::{Page, StepContext};
use crate::ui::Container;

pub const TRIGGER_ERROR_LABEL: &str = "Trigger wizard error";

/// Asks whether a later step should fail
#[derive(Debug, Default)]
pub struct ChecklistPage;

impl ChecklistPage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for ChecklistPage {
    fn title(&self) -> &str {
        "System Check"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        container.heading("System Check");
        container.text("Check the option below to simulate an error:");

        let current = ctx.answers.flag(SIMULATE_ERROR_KEY);
        let checked = container.toggle(TRIGGER_ERROR_LABEL, current);
        ctx.answers.set_flag(SIMULATE_ERROR_KEY, checked);

        container.text("(If unchecked, the wizard will complete successfully)");
    }
}
