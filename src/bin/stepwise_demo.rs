//! Stepwise Demo - Runs the demo wizard in a terminal
//!
//! Usage:
//!   stepwise-demo                    Configuration, progress, checklist and log steps
//!   stepwise-demo --simulate-error   Preset the checklist so the log step fails
//!   stepwise-demo --yes              Run unattended, taking every default
//!   stepwise-demo --init [NAME]      Print a template wizard.toml

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Select;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use stepwise::config::{generate_template, WizardConfig};
use stepwise::pages::{ChecklistPage, ConfigurationPage, LogsPage, ProgressPage, SIMULATE_ERROR_KEY};
use stepwise::ui::terminal::TerminalSurface;
use stepwise::ui::FINISH_LABEL;
use stepwise::{SessionEnd, Step, Wizard};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How often process reports are applied while a step runs
const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "stepwise-demo")]
#[command(about = "Demo wizard with cancellable background steps")]
#[command(version)]
struct Args {
    /// Path to wizard.toml (default: ./wizard.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seconds the progress step takes
    #[arg(long, value_name = "SECS", default_value_t = 3.0)]
    duration: f64,

    /// Check "Trigger wizard error" before the checklist is shown
    #[arg(long)]
    simulate_error: bool,

    /// Do not prompt; take every default
    #[arg(short, long)]
    yes: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    /// Print a template wizard.toml and exit
    #[arg(long, value_name = "NAME", num_args = 0..=1, default_missing_value = "My Wizard")]
    init: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Next,
    Finish,
    Back,
    Cancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Next => "Next >",
            Action::Finish => "Finish",
            Action::Back => "< Back",
            Action::Cancel => "Cancel",
        };
        f.write_str(label)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(name) = args.init.as_deref() {
        print!("{}", generate_template(name));
        return Ok(ExitCode::SUCCESS);
    }

    let config = match &args.config {
        Some(path) => WizardConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => WizardConfig::discover().context("Failed to load wizard.toml")?,
    };
    config.validate().context("Invalid wizard configuration")?;

    let duration = Duration::try_from_secs_f64(args.duration)
        .with_context(|| format!("Invalid --duration: {}", args.duration))?;

    let surface = if args.yes {
        TerminalSurface::with_interactive(false)
    } else {
        TerminalSurface::new()
    };
    let interactive = surface.is_interactive();

    info!("{} v{}", config.name, config.version);

    let mut wizard = Wizard::new(config, surface);
    wizard
        .answers_mut()
        .set_flag(SIMULATE_ERROR_KEY, args.simulate_error);
    wizard.set_steps(vec![
        Step::new(ConfigurationPage::new()),
        Step::new(ProgressPage::new(duration)),
        Step::new(ChecklistPage::new()),
        Step::new(LogsPage::default()),
    ]);

    let end = drive(&mut wizard, interactive).await?;
    Ok(exit_code(end))
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Run the wizard until the session ends
///
/// While a step runs, reports are applied every [`POLL_INTERVAL`] and
/// Ctrl-C cancels the step. Otherwise the user picks the next action.
async fn drive(wizard: &mut Wizard, interactive: bool) -> Result<SessionEnd> {
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if let Some(end) = wizard.session_end() {
            return Ok(end);
        }

        if wizard.is_running() {
            tokio::select! {
                res = &mut ctrl_c => {
                    res.context("Failed to listen for Ctrl-C")?;
                    info!("interrupted, cancelling current step");
                    wizard.cancel_current();
                }
                _ = tokio::time::sleep(POLL_INTERVAL) => {
                    wizard.dispatch_pending();
                }
            }
            continue;
        }

        wizard.dispatch_pending();
        let actions = available_actions(wizard);
        let Some(action) = pick(&actions, interactive) else {
            // Prompt interrupted
            wizard.cancel_current();
            continue;
        };
        perform(wizard, action);
    }
}

fn available_actions(wizard: &Wizard) -> Vec<Action> {
    let navigation = wizard.navigation();
    let mut actions = Vec::new();

    if navigation.next.is_clickable() {
        if navigation.next.label == FINISH_LABEL {
            actions.push(Action::Finish);
        } else {
            actions.push(Action::Next);
        }
    }
    if navigation.back.is_clickable() {
        actions.push(Action::Back);
    }
    if navigation.cancel.is_clickable() {
        actions.push(Action::Cancel);
    }
    actions
}

fn pick(actions: &[Action], interactive: bool) -> Option<Action> {
    if !interactive || actions.len() <= 1 {
        return actions.first().copied();
    }

    match Select::new()
        .with_prompt("Action")
        .items(actions)
        .default(0)
        .interact()
    {
        Ok(index) => actions.get(index).copied(),
        Err(e) => {
            warn!("prompt failed: {}", e);
            None
        }
    }
}

fn perform(wizard: &mut Wizard, action: Action) {
    let moved = match action {
        Action::Next => wizard.next(),
        Action::Finish => wizard.finish().is_some(),
        Action::Back => wizard.prev(),
        Action::Cancel => wizard.request_cancel(),
    };
    if !moved {
        info!("{} had no effect", action);
    }
}

fn exit_code(end: SessionEnd) -> ExitCode {
    match end {
        SessionEnd::Completed => ExitCode::SUCCESS,
        SessionEnd::Failed => ExitCode::from(1),
        SessionEnd::Cancelled => ExitCode::from(130),
    }
}
