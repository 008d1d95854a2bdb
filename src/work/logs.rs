//! Log streaming workload

use crate::process::{ProcessContext, Work};
use std::thread;
use std::time::Duration;

pub const DEFAULT_LINES: &[&str] = &[
    "[INFO] Starting setup",
    "[INFO] Checking available disk space",
    "[OK] Enough space available",
    "[INFO] Unpacking application files",
    "[OK] Files unpacked",
    "[INFO] Writing configuration",
    "[OK] Configuration written",
    "[INFO] Creating menu entries",
    "[OK] Menu entries created",
    "[INFO] Cleaning up temporary files",
];

/// Appended after all lines when the run is set to fail
pub const ERROR_LINE: &str = "[ERROR] Setup finished with errors";

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Delay before a failing run without a log sink gives up
const FAIL_FAST_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct LogWork {
    lines: Vec<String>,
    fail: bool,
    delay: Duration,
}

impl Default for LogWork {
    fn default() -> Self {
        Self::new(DEFAULT_LINES.iter().copied())
    }
}

impl LogWork {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            fail: false,
            delay: DEFAULT_DELAY,
        }
    }

    /// End the run with an error line and a failure
    pub fn failing(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }

    /// Pause after each line
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl Work for LogWork {
    fn run(&mut self, ctx: &ProcessContext) -> anyhow::Result<()> {
        // Nowhere to show the lines: fail right away.
        if self.fail && !ctx.has_log_sink() {
            thread::sleep(FAIL_FAST_DELAY);
            ctx.complete(false);
            return Ok(());
        }

        for line in &self.lines {
            if ctx.is_cancelled() {
                return Ok(());
            }
            ctx.append_log(line.as_str());
            thread::sleep(self.delay);
        }

        if self.fail {
            ctx.append_log(ERROR_LINE);
            ctx.complete(false);
        } else {
            ctx.complete(true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lines() {
        let work = LogWork::default();
        assert_eq!(work.lines().len(), DEFAULT_LINES.len());
        assert!(!work.fail);
        assert_eq!(work.delay, DEFAULT_DELAY);
    }

    #[test]
    fn test_builders() {
        let work = LogWork::new(["one", "two"])
            .failing(true)
            .with_delay(Duration::ZERO);
        assert_eq!(work.lines(), ["one".to_string(), "two".to_string()]);
        assert!(work.fail);
        assert_eq!(work.delay, Duration::ZERO);
    }
}
