use super::CONFIGURATION_KEY;
use crate::step::{Page, StepContext};
use crate::ui::Container;

pub const CONFIGURATION_LABEL: &str = "Configuration type";
pub const CONFIGURATION_OPTIONS: [&str; 3] = ["Standard", "Minimal", "Full"];

/// Lets the user pick a configuration type
#[derive(Debug, Default)]
pub struct ConfigurationPage;

impl ConfigurationPage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for ConfigurationPage {
    fn title(&self) -> &str {
        "Configuration"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        container.heading("Configuration");
        container.text("Select configuration type:");

        let current = ctx
            .answers
            .choice(CONFIGURATION_KEY)
            .and_then(|c| CONFIGURATION_OPTIONS.iter().position(|o| *o == c))
            .unwrap_or(0);
        let chosen = container.select(CONFIGURATION_LABEL, &CONFIGURATION_OPTIONS, current);
        let chosen = CONFIGURATION_OPTIONS
            .get(chosen)
            .copied()
            .unwrap_or(CONFIGURATION_OPTIONS[0]);

        ctx.answers.set_choice(CONFIGURATION_KEY, chosen);
    }
}
