//! Reference workloads
//!
//! - [`ProgressWork`]: fills a progress bar over a fixed duration
//! - [`LogWork`]: streams predefined log lines, optionally ending in failure

pub mod logs;
pub mod progress;

pub use logs::LogWork;
pub use progress::ProgressWork;
