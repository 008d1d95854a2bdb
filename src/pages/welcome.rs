use crate::step::{Page, StepContext};
use crate::ui::Container;

const DEFAULT_INTRO: &str = "This wizard will guide you through the setup.\n\nClick \"Next\" to continue.";

/// First page of every flow
#[derive(Debug, Default)]
pub struct WelcomePage;

impl WelcomePage {
    pub fn new() -> Self {
        Self
    }
}

impl Page for WelcomePage {
    fn title(&self) -> &str {
        "Welcome"
    }

    fn produce_content(&mut self, container: &mut dyn Container, ctx: &mut StepContext<'_>) {
        container.heading(&format!("Welcome to {}", ctx.config.name));

        if ctx.config.long_description.is_empty() {
            container.text(DEFAULT_INTRO);
        } else {
            container.text(&ctx.config.long_description);
        }
        container.text(&format!("Version {}", ctx.config.version));
    }
}
