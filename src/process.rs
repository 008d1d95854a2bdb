//! Background Process - Cancellable single-shot unit of work
//!
//! ARCHITECTURE: every started process runs its [`Work`] on a native OS
//! thread. Progress samples, log lines and the final outcome travel back to
//! the main context over an `std::sync::mpsc` channel, and are applied there
//! by the owner of the [`Process`], which also holds the reporter and log sink.
//!
//! The outcome is guarded by a [`CompletionToken`] that lives in the process
//! state until exactly one path claims it: the worker completing, the worker
//! faulting, or [`Process::cancel`] on the main context.

use crate::report::{LogSink, ProgressReporter, ProgressUpdate};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Identifier tagging every event a process emits
pub type ProcessId = u64;

static NEXT_PROCESS_ID: AtomicU64 = AtomicU64::new(1);

/// Poll interval for [`Process::wait`] with a timeout
const WAIT_POLL: Duration = Duration::from_millis(5);

/// Why a process failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// The user cancelled the step
    #[error("cancelled by user")]
    Cancelled,

    /// The work called `complete(false)`
    #[error("the task reported a failure")]
    Reported,

    /// The work returned an error
    #[error("{0}")]
    Fault(String),

    /// The work panicked
    #[error("the task panicked: {0}")]
    Panicked(String),
}

/// Final result of a process
pub type Outcome = Result<(), ProcessError>;

/// Something a process produced for the main context
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    Progress(ProgressUpdate),
    Log(String),
    /// Always the last event of a process
    Finished(Outcome),
}

/// An event tagged with the process that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub process: ProcessId,
    pub event: ProcessEvent,
}

pub type EventSender = mpsc::Sender<Envelope>;
pub type EventReceiver = mpsc::Receiver<Envelope>;

/// Create the worker-to-main event channel
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::channel()
}

/// The unit of work a process executes on its worker thread
///
/// Implementations should poll [`ProcessContext::is_cancelled`] and stop
/// promptly once it returns `true`. Returning `Ok(())` without calling
/// [`ProcessContext::complete`] completes the process successfully; returning
/// an error or panicking completes it with a failure.
pub trait Work: Send {
    fn run(&mut self, ctx: &ProcessContext) -> anyhow::Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// Work that does nothing and succeeds
#[derive(Debug, Default, Clone, Copy)]
pub struct Idle;

impl Work for Idle {}

/// Work backed by a closure, see [`from_fn`]
pub struct FnWork<F>(F);

/// Wrap a closure as [`Work`]
pub fn from_fn<F>(f: F) -> FnWork<F>
where
    F: FnMut(&ProcessContext) -> anyhow::Result<()> + Send,
{
    FnWork(f)
}

impl<F> Work for FnWork<F>
where
    F: FnMut(&ProcessContext) -> anyhow::Result<()> + Send,
{
    fn run(&mut self, ctx: &ProcessContext) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

/// The right to deliver a process outcome
///
/// Not `Clone`: claiming it moves it out of the shared state, so a second
/// completion has nothing left to claim.
#[must_use]
#[derive(Debug)]
struct CompletionToken {
    process: ProcessId,
}

impl CompletionToken {
    fn deliver(self, events: &EventSender, outcome: Outcome) {
        // A closed receiver means the session is gone; nobody is waiting.
        let _ = events.send(Envelope {
            process: self.process,
            event: ProcessEvent::Finished(outcome),
        });
    }
}

/// State shared between the worker and the main context
#[derive(Debug)]
struct Control {
    cancelled: bool,
    success: bool,
    completion: Option<CompletionToken>,
}

#[derive(Debug)]
struct Shared {
    control: Mutex<Control>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle the work uses to report back
#[derive(Clone)]
pub struct ProcessContext {
    id: ProcessId,
    shared: Arc<Shared>,
    events: EventSender,
    started: Instant,
    has_reporter: bool,
    has_log: bool,
}

impl ProcessContext {
    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.lock().cancelled
    }

    /// Time since the process was started
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether a progress reporter is attached to this process
    pub fn has_reporter(&self) -> bool {
        self.has_reporter
    }

    /// Whether a log sink is attached to this process
    pub fn has_log_sink(&self) -> bool {
        self.has_log
    }

    /// Report completion percentage and optional ETA in seconds
    ///
    /// Without an ETA one is derived from elapsed time. Ignored once the
    /// process is cancelled or completed.
    pub fn report_progress(&self, percent: f64, eta: Option<f64>) {
        let update = ProgressUpdate::new(percent, eta, self.elapsed().as_secs_f64());
        self.send_live(ProcessEvent::Progress(update));
    }

    /// Append a line to the log sink. Ignored once cancelled or completed.
    pub fn append_log(&self, line: impl Into<String>) {
        self.send_live(ProcessEvent::Log(line.into()));
    }

    /// Complete the process. No-op after cancellation or a prior completion.
    pub fn complete(&self, success: bool) {
        let outcome = if success {
            Ok(())
        } else {
            Err(ProcessError::Reported)
        };
        self.finish(outcome);
    }

    /// Complete the process with a failure carrying `reason`
    pub fn fail(&self, reason: impl fmt::Display) {
        self.finish(Err(ProcessError::Fault(reason.to_string())));
    }

    /// Send `event` unless the outcome is already settled
    ///
    /// The check and the send happen under one lock, so nothing can be
    /// queued after the completion token has been claimed.
    fn send_live(&self, event: ProcessEvent) {
        let control = self.shared.lock();
        if !control.cancelled && control.completion.is_some() {
            self.send(event);
        }
    }

    fn finish(&self, outcome: Outcome) -> bool {
        let token = {
            let mut control = self.shared.lock();
            if control.cancelled {
                return false;
            }
            let token = control.completion.take();
            if token.is_some() {
                control.success = outcome.is_ok();
            }
            token
        };

        match token {
            Some(token) => {
                tracing::info!(process = self.id, success = outcome.is_ok(), "process completed");
                token.deliver(&self.events, outcome);
                true
            }
            None => false,
        }
    }

    fn send(&self, event: ProcessEvent) {
        let _ = self.events.send(Envelope {
            process: self.id,
            event,
        });
    }
}

/// A cancellable background task with a single-shot completion
///
/// Lives on the main context. The worker thread only sees the shared
/// flags and a [`ProcessContext`]; reporter and log sink stay here and are
/// driven through [`Process::apply`].
pub struct Process {
    id: ProcessId,
    shared: Arc<Shared>,
    work: Option<Box<dyn Work>>,
    reporter: Option<Box<dyn ProgressReporter>>,
    log: Option<Box<dyn LogSink>>,
    started_at: Option<Instant>,
    handle: Option<JoinHandle<()>>,
    // Set once the outcome has been applied; later reports are dropped
    settled: bool,
}

impl Process {
    pub fn new(work: impl Work + 'static) -> Self {
        Self::from_boxed(Box::new(work))
    }

    pub fn from_boxed(work: Box<dyn Work>) -> Self {
        let id = NEXT_PROCESS_ID.fetch_add(1, Ordering::Relaxed);
        let control = Control {
            cancelled: false,
            success: true,
            completion: Some(CompletionToken { process: id }),
        };

        Self {
            id,
            shared: Arc::new(Shared {
                control: Mutex::new(control),
            }),
            work: Some(work),
            reporter: None,
            log: None,
            started_at: None,
            handle: None,
            settled: false,
        }
    }

    /// Attach the display that receives progress updates
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Attach the display that receives log lines
    pub fn with_log(mut self, log: Box<dyn LogSink>) -> Self {
        self.log = Some(log);
        self
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.lock().cancelled
    }

    /// The success flag: `true` until a failing completion or cancellation
    pub fn is_success(&self) -> bool {
        self.shared.lock().success
    }

    /// Whether the outcome has been claimed (by completion or cancellation)
    pub fn is_completed(&self) -> bool {
        self.shared.lock().completion.is_none()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Start the work on its own thread
    ///
    /// Returns `false` without doing anything if the process was already
    /// started or has already been cancelled; a process never runs twice.
    pub fn start(&mut self, events: EventSender) -> bool {
        if self.started_at.is_some() {
            tracing::debug!(process = self.id, "process already started");
            return false;
        }
        if self.is_completed() {
            tracing::debug!(process = self.id, "process settled before start, not running it");
            return false;
        }
        let Some(work) = self.work.take() else {
            return false;
        };

        let started = Instant::now();
        self.started_at = Some(started);

        let ctx = ProcessContext {
            id: self.id,
            shared: Arc::clone(&self.shared),
            events,
            started,
            has_reporter: self.reporter.is_some(),
            has_log: self.log.is_some(),
        };
        let fallback = ctx.clone();

        tracing::info!(process = self.id, "starting process");

        let spawned = thread::Builder::new()
            .name(format!("stepwise-process-{}", self.id))
            .spawn(move || run_guarded(work, ctx));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(e) => {
                tracing::warn!(process = self.id, "could not spawn worker thread: {}", e);
                fallback.finish(Err(ProcessError::Fault(format!(
                    "failed to spawn worker thread: {e}"
                ))));
                false
            }
        }
    }

    /// Cancel the process
    ///
    /// Sets the cancellation flag for the worker to observe and, if the
    /// outcome was still open, claims it right here: the returned failure is
    /// the process outcome, and no `Finished` event will follow. Returns
    /// `None` if the process had already completed.
    pub fn cancel(&self) -> Option<Outcome> {
        let claimed = {
            let mut control = self.shared.lock();
            control.cancelled = true;
            let token = control.completion.take();
            if token.is_some() {
                control.success = false;
            }
            token
        };

        claimed.map(|_token| {
            tracing::info!(process = self.id, "process cancelled");
            Err(ProcessError::Cancelled)
        })
    }

    /// Wait for the worker thread to exit
    ///
    /// Returns `false` if `timeout` elapsed first. Returns `true` right away
    /// for a process that never started.
    pub fn wait(&mut self, timeout: Option<Duration>) -> bool {
        let Some(handle) = self.handle.take() else {
            return true;
        };

        if let Some(timeout) = timeout {
            let deadline = Instant::now() + timeout;
            while !handle.is_finished() {
                if Instant::now() >= deadline {
                    self.handle = Some(handle);
                    return false;
                }
                thread::sleep(WAIT_POLL);
            }
        }

        // Panics are caught inside the worker, join cannot carry one.
        let _ = handle.join();
        true
    }

    /// Apply an event from this process on the main context
    ///
    /// Progress and log events go to the attached displays (skipped after
    /// cancellation or completion, or when the display is detached). Returns the outcome
    /// when the event is the completion.
    pub fn apply(&mut self, event: ProcessEvent) -> Option<Outcome> {
        match event {
            ProcessEvent::Finished(outcome) => {
                self.settled = true;
                Some(outcome)
            }
            _ if self.settled || self.is_cancelled() => None,
            ProcessEvent::Progress(update) => {
                if let Some(reporter) = self.reporter.as_deref_mut() {
                    if !update.apply(reporter) {
                        tracing::debug!(process = self.id, "progress reporter detached, update dropped");
                    }
                }
                None
            }
            ProcessEvent::Log(line) => {
                if let Some(log) = self.log.as_deref_mut() {
                    if log.is_attached() {
                        log.append_line(&line);
                    } else {
                        tracing::debug!(process = self.id, "log sink detached, line dropped");
                    }
                }
                None
            }
        }
    }
}

impl Drop for Process {
    fn drop(&mut self) {
        // Ask a still-running worker to stop; its outcome has no owner anymore.
        if self.handle.as_ref().is_some_and(|h| !h.is_finished()) {
            self.shared.lock().cancelled = true;
            tracing::debug!(process = self.id, "process dropped while running");
        }
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("id", &self.id)
            .field("started", &self.started_at.is_some())
            .field("cancelled", &self.is_cancelled())
            .field("completed", &self.is_completed())
            .finish_non_exhaustive()
    }
}

/// Worker thread body: run the work, turn every exit path into one outcome
fn run_guarded(mut work: Box<dyn Work>, ctx: ProcessContext) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| work.run(&ctx)));

    let outcome = match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => {
            tracing::warn!(process = ctx.id, "task failed: {:#}", err);
            Err(ProcessError::Fault(format!("{err:#}")))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!(process = ctx.id, "task panicked: {}", message);
            Err(ProcessError::Panicked(message))
        }
    };

    // No-op if the work already completed or the process was cancelled.
    ctx.finish(outcome);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
