//! Timed progress workload
//!
//! Polls elapsed time every tick and reports
//! `percent = min(elapsed / duration * 100, 100)` until it reaches 100.

use crate::process::{ProcessContext, Work};
use crate::report::derive_eta;
use std::thread;
use std::time::Duration;

pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);
pub const DEFAULT_TICK: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy)]
pub struct ProgressWork {
    duration: Duration,
    tick: Duration,
}

impl Default for ProgressWork {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

impl ProgressWork {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Completion percentage after `elapsed` of `duration`
pub fn percent_at(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64() * 100.0).min(100.0)
}

/// Seconds left: the full duration before any progress, zero once done
pub fn remaining(elapsed: Duration, percent: f64, duration: Duration) -> f64 {
    if percent >= 100.0 {
        0.0
    } else {
        derive_eta(elapsed.as_secs_f64(), percent).unwrap_or(duration.as_secs_f64())
    }
}

impl Work for ProgressWork {
    fn run(&mut self, ctx: &ProcessContext) -> anyhow::Result<()> {
        while !ctx.is_cancelled() {
            let elapsed = ctx.elapsed();
            let percent = percent_at(elapsed, self.duration);
            ctx.report_progress(percent, Some(remaining(elapsed, percent, self.duration)));

            if percent >= 100.0 {
                ctx.complete(true);
                break;
            }
            thread::sleep(self.tick);
        }

        Ok(())
    }
}
