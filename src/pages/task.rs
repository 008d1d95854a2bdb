//! Generic pages for building flows without a custom [`Page`] impl

use crate::process::{Process, Work};
use crate::step::{Page, StepContext};
use crate::ui::Container;
use std::fmt;

/// Title and paragraphs, no work
#[derive(Debug, Clone)]
pub struct InfoPage {
    title: String,
    paragraphs: Vec<String>,
}

impl InfoPage {
    pub fn new<I, S>(title: impl Into<String>, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            paragraphs: paragraphs.into_iter().map(Into::into).collect(),
        }
    }
}

impl Page for InfoPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn produce_content(&mut self, container: &mut dyn Container, _ctx: &mut StepContext<'_>) {
        container.heading(&self.title);
        for paragraph in &self.paragraphs {
            container.text(paragraph);
        }
    }
}

type WorkFactory = Box<dyn FnMut(&StepContext<'_>) -> Box<dyn Work>>;

/// A page running work built by a factory
///
/// The factory is called for every fresh run, so a retried step gets new
/// work. Progress bar and log view are attached when the surface has them.
pub struct TaskPage {
    title: String,
    text: Option<String>,
    factory: WorkFactory,
}

impl TaskPage {
    pub fn new<F, W>(title: impl Into<String>, mut factory: F) -> Self
    where
        F: FnMut(&StepContext<'_>) -> W + 'static,
        W: Work + 'static,
    {
        Self {
            title: title.into(),
            text: None,
            factory: Box::new(move |ctx: &StepContext<'_>| -> Box<dyn Work> {
                Box::new(factory(ctx))
            }),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl Page for TaskPage {
    fn title(&self) -> &str {
        &self.title
    }

    fn produce_content(&mut self, container: &mut dyn Container, _ctx: &mut StepContext<'_>) {
        container.heading(&self.title);
        if let Some(text) = &self.text {
            container.text(text);
        }
    }

    fn produce_process(
        &mut self,
        container: &mut dyn Container,
        ctx: &StepContext<'_>,
    ) -> Option<Process> {
        let mut process = Process::from_boxed((self.factory)(ctx));
        if let Some(bar) = container.progress_bar() {
            process = process.with_reporter(bar);
        }
        if let Some(view) = container.log_view() {
            process = process.with_log(view);
        }
        Some(process)
    }
}

impl fmt::Debug for TaskPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskPage")
            .field("title", &self.title)
            .field("text", &self.text)
            .finish_non_exhaustive()
    }
}
