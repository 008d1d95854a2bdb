//! Progress and Log Reporting
//!
//! Contracts implemented by the presentation layer. Updates produced on a
//! worker thread travel as [`ProgressUpdate`] values and are applied on the
//! main context, after checking that the target is still attached.

/// Receives percent / ETA / elapsed-time updates
pub trait ProgressReporter {
    /// Completion percentage (0-100)
    fn set_percent(&mut self, percent: f64);

    /// Remaining time in seconds, `None` when unknown
    fn set_eta(&mut self, seconds: Option<f64>);

    /// Time since the process started, in seconds
    fn set_elapsed_time(&mut self, seconds: f64);

    /// Whether the underlying display still exists
    ///
    /// Updates are skipped once this returns `false`.
    fn is_attached(&self) -> bool {
        true
    }
}

/// Receives log lines
pub trait LogSink {
    fn append_line(&mut self, line: &str);

    /// Whether the underlying display still exists
    fn is_attached(&self) -> bool {
        true
    }
}

/// One progress sample, ready to be applied to a reporter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Completion percentage, clamped to 0-100
    pub percent: f64,

    /// Remaining seconds (explicit or derived)
    pub eta: Option<f64>,

    /// Seconds since the process started
    pub elapsed: f64,
}

impl ProgressUpdate {
    /// Build an update, deriving the ETA from elapsed time when none is given
    pub fn new(percent: f64, eta: Option<f64>, elapsed: f64) -> Self {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };

        Self {
            percent,
            eta: eta.or_else(|| derive_eta(elapsed, percent)),
            elapsed,
        }
    }

    /// Push this update into a reporter
    ///
    /// Returns `false` (and touches nothing) if the reporter is detached.
    pub fn apply(&self, reporter: &mut dyn ProgressReporter) -> bool {
        if !reporter.is_attached() {
            return false;
        }

        reporter.set_percent(self.percent);
        reporter.set_eta(self.eta);
        reporter.set_elapsed_time(self.elapsed);
        true
    }
}

/// Estimate remaining seconds from the current rate
///
/// Only defined strictly between 0% and 100%.
pub fn derive_eta(elapsed: f64, percent: f64) -> Option<f64> {
    if percent > 0.0 && percent < 100.0 {
        Some(elapsed * (100.0 / percent - 1.0))
    } else {
        None
    }
}

/// "Remaining: MM:SS", or "Remaining: --:--" when unknown
pub fn format_eta(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s > 0.0 => {
            let total = s as u64;
            format!("Remaining: {:02}:{:02}", total / 60, total % 60)
        }
        _ => "Remaining: --:--".to_string(),
    }
}

/// "Elapsed: M:SS"
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("Elapsed: {}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture {
        percent: Vec<f64>,
        eta: Vec<Option<f64>>,
        elapsed: Vec<f64>,
        attached: bool,
    }

    impl ProgressReporter for Capture {
        fn set_percent(&mut self, percent: f64) {
            self.percent.push(percent);
        }
        fn set_eta(&mut self, seconds: Option<f64>) {
            self.eta.push(seconds);
        }
        fn set_elapsed_time(&mut self, seconds: f64) {
            self.elapsed.push(seconds);
        }
        fn is_attached(&self) -> bool {
            self.attached
        }
    }

    #[test]
    fn test_derive_eta() {
        assert_eq!(derive_eta(1.0, 50.0), Some(1.0));
        assert_eq!(derive_eta(1.0, 25.0), Some(3.0));
        assert_eq!(derive_eta(1.0, 0.0), None);
        assert_eq!(derive_eta(1.0, 100.0), None);
    }

    #[test]
    fn test_explicit_eta_wins() {
        let update = ProgressUpdate::new(50.0, Some(7.0), 1.0);
        assert_eq!(update.eta, Some(7.0));

        let derived = ProgressUpdate::new(50.0, None, 2.0);
        assert_eq!(derived.eta, Some(2.0));
    }

    #[test]
    fn test_percent_is_clamped() {
        assert_eq!(ProgressUpdate::new(140.0, None, 1.0).percent, 100.0);
        assert_eq!(ProgressUpdate::new(-3.0, None, 1.0).percent, 0.0);
        assert_eq!(ProgressUpdate::new(f64::NAN, None, 1.0).percent, 0.0);
    }

    #[test]
    fn test_apply_skips_detached_reporter() {
        let update = ProgressUpdate::new(20.0, None, 1.0);

        let mut detached = Capture::default();
        assert!(!update.apply(&mut detached));
        assert!(detached.percent.is_empty());

        let mut attached = Capture {
            attached: true,
            ..Default::default()
        };
        assert!(update.apply(&mut attached));
        assert_eq!(attached.percent, vec![20.0]);
        assert_eq!(attached.eta, vec![Some(4.0)]);
        assert_eq!(attached.elapsed, vec![1.0]);
    }

    #[test]
    fn test_time_formatting() {
        assert_eq!(format_eta(Some(75.0)), "Remaining: 01:15");
        assert_eq!(format_eta(Some(0.0)), "Remaining: --:--");
        assert_eq!(format_eta(None), "Remaining: --:--");
        assert_eq!(format_elapsed(65.4), "Elapsed: 1:05");
        assert_eq!(format_elapsed(3.0), "Elapsed: 0:03");
    }
}
