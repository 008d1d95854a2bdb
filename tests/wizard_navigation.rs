//! Wizard navigation driven through the headless surface

use std::thread;
use std::time::{Duration, Instant};
use stepwise::pages::{
    ChecklistPage, ConfigurationPage, InfoPage, LogsPage, ProgressPage, TaskPage,
    CONFIGURATION_LABEL, TRIGGER_ERROR_LABEL,
};
use stepwise::process::{self, Idle};
use stepwise::ui::headless::{HeadlessSurface, Transcript};
use stepwise::ui::FINISH_LABEL;
use stepwise::wizard::CANCEL_QUESTION;
use stepwise::work::logs::DEFAULT_LINES;
use stepwise::{
    ProcessError, SessionEnd, Step, StepRole, StepStatus, Wizard, WizardConfig,
};

const TIMEOUT: Duration = Duration::from_secs(10);

fn wizard_with(surface: HeadlessSurface) -> (Wizard, Transcript) {
    let transcript = surface.transcript();
    let config = WizardConfig {
        name: "Demo".to_string(),
        short_description: "Setup".to_string(),
        ..Default::default()
    };
    (Wizard::new(config, surface), transcript)
}

/// Apply reports until the current step stops running
fn settle(wizard: &mut Wizard) {
    let deadline = Instant::now() + TIMEOUT;
    while wizard.is_running() {
        assert!(Instant::now() < deadline, "step did not finish in time");
        wizard.wait_event(Duration::from_millis(50));
    }
}

fn titles(wizard: &Wizard) -> Vec<String> {
    wizard.steps().iter().map(|s| s.title().to_string()).collect()
}

fn info(title: &str) -> Step {
    Step::new(InfoPage::new(title, [format!("{title} page")]))
}

fn failing(title: &str) -> Step {
    Step::new(TaskPage::new(title, |_| {
        process::from_fn(|_| anyhow::bail!("disk full"))
    }))
}

fn blocking(title: &str) -> Step {
    Step::new(TaskPage::new(title, |_| {
        process::from_fn(|ctx| {
            while !ctx.is_cancelled() {
                thread::sleep(Duration::from_millis(2));
            }
            Ok(())
        })
    }))
}

#[test]
fn test_set_steps_wraps_user_steps() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![info("A"), info("B")]);
    assert_eq!(titles(&wizard), ["Welcome", "A", "B", "Finished"]);
    assert_eq!(transcript.record().title.as_deref(), Some("Demo - Setup"));

    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![
        info("A"),
        Step::terminal_success(InfoPage::new("Done", ["done"])),
    ]);
    assert_eq!(titles(&wizard), ["Welcome", "A", "Done"]);
}

#[test]
fn test_step_without_process_can_proceed() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![info("A")]);

    assert!(wizard.next());
    let step = wizard.current_step().unwrap();
    assert_eq!(step.title(), "A");
    assert!(step.can_proceed());
    assert_eq!(step.status(), StepStatus::Pending);
    assert!(wizard.can_go_forward());
    assert!(transcript.headings().contains(&"A".to_string()));
}

#[test]
fn test_successful_task_enables_next() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![Step::new(TaskPage::new("Task", |_| Idle))]);

    wizard.next();
    settle(&mut wizard);

    assert_eq!(wizard.current_step().unwrap().status(), StepStatus::Success);
    assert!(wizard.can_go_forward());

    let sidebar = transcript.last_sidebar().unwrap();
    assert_eq!(sidebar[1].status, StepStatus::Success);
    assert!(sidebar[1].current);
    assert_eq!(sidebar[1].line(), "✓ Task");

    // Revisiting a finished step shows it again without re-running it
    let process = wizard.current_step().unwrap().process_id();
    assert!(wizard.prev());
    assert!(wizard.next());
    assert_eq!(wizard.current_step().unwrap().process_id(), process);
    assert!(!wizard.is_running());
}

#[test]
fn test_failure_jumps_to_single_failure_page() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![failing("Install")]);

    assert!(wizard.next());
    settle(&mut wizard);

    // The jump happens without any further navigation call
    assert_eq!(wizard.current_step().unwrap().role(), StepRole::TerminalFailure);
    assert_eq!(wizard.current_index(), 3);
    assert_eq!(wizard.steps().len(), 4);
    assert_eq!(
        wizard.last_failure(),
        Some(&ProcessError::Fault("disk full".to_string()))
    );
    assert!(transcript.texts().contains(&"Reason: disk full".to_string()));

    // Back is a no-op here; the failed step is reached from the step list
    assert!(!wizard.prev());
    assert!(wizard.go_to(1));
    let step = wizard.current_step().unwrap();
    assert!(step.is_failed());
    let process = step.process_id();

    // Revisiting does not run it again, and next() lands on the same page
    assert!(!wizard.is_running());
    assert!(wizard.next());
    assert_eq!(wizard.current_index(), 3);
    assert_eq!(wizard.steps().len(), 4);
    assert_eq!(wizard.steps()[1].status(), StepStatus::Failed);
    assert_eq!(wizard.steps()[1].process_id(), process);

    assert_eq!(wizard.finish(), Some(SessionEnd::Failed));
    assert_eq!(transcript.closed(), Some(SessionEnd::Failed));
}

#[test]
fn test_prev_blocked_while_running() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![blocking("Wait")]);

    assert!(wizard.next());
    assert!(wizard.is_running());

    let clears = transcript.clears();
    assert!(!wizard.prev());
    assert!(!wizard.next());
    assert_eq!(wizard.current_index(), 1);
    assert_eq!(transcript.clears(), clears);
    assert!(!wizard.can_go_back());

    let nav = wizard.navigation();
    assert!(nav.back.visible);
    assert!(!nav.back.enabled);
    assert!(!nav.next.enabled);
    assert!(nav.cancel.is_clickable());

    wizard.cancel_current();
}

#[test]
fn test_prev_on_first_step_does_not_rerender() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![info("A")]);

    let clears = transcript.clears();
    assert!(!wizard.can_go_back());
    assert!(!wizard.prev());
    assert_eq!(wizard.current_index(), 0);
    assert_eq!(transcript.clears(), clears);
}

#[test]
fn test_terminal_pages_do_not_navigate() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![failing("Install")]);
    wizard.next();
    settle(&mut wizard);
    assert_eq!(wizard.current_step().unwrap().role(), StepRole::TerminalFailure);

    let clears = transcript.clears();
    assert!(!wizard.can_go_back());
    assert!(!wizard.can_go_forward());
    assert!(!wizard.prev());
    assert!(!wizard.next());
    assert_eq!(wizard.current_index(), 3);
    assert_eq!(transcript.clears(), clears);

    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![info("A")]);
    wizard.next();
    wizard.next();
    assert!(wizard.is_terminal());
    assert!(!wizard.prev());
    assert_eq!(wizard.current_index(), 2);
}

#[test]
fn test_go_to_completed_step() {
    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![Step::new(TaskPage::new("Task", |_| Idle)), info("B")]);

    wizard.next();
    settle(&mut wizard);
    assert!(wizard.next());
    assert_eq!(wizard.current_index(), 2);

    let process = wizard.steps()[1].process_id();
    assert!(wizard.can_go_to(1));
    assert!(wizard.go_to(1));
    assert_eq!(wizard.current_index(), 1);
    assert_eq!(wizard.current_step().unwrap().process_id(), process);
    assert!(!wizard.is_running());

    // The current step is ignored
    assert!(!wizard.go_to(1));
}

#[test]
fn test_go_to_refuses_pending_steps() {
    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![Step::new(TaskPage::new("Task", |_| Idle)), info("B")]);

    // Welcome and B never ran, the success page is not reached yet
    assert!(!wizard.go_to(2));
    assert!(!wizard.go_to(3));
    assert!(!wizard.go_to(99));
    assert_eq!(wizard.current_index(), 0);

    wizard.next();
    settle(&mut wizard);
    assert!(!wizard.go_to(0));
    assert_eq!(wizard.steps()[0].status(), StepStatus::Pending);
    assert_eq!(wizard.current_index(), 1);
}

#[test]
fn test_go_to_refused_while_running() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![Step::new(TaskPage::new("Task", |_| Idle)), blocking("Wait")]);

    wizard.next();
    settle(&mut wizard);
    assert!(wizard.next());
    assert!(wizard.is_running());

    let clears = transcript.clears();
    assert!(!wizard.can_go_to(1));
    assert!(!wizard.go_to(1));
    assert_eq!(wizard.current_index(), 2);
    assert_eq!(transcript.clears(), clears);

    wizard.cancel_current();
}

#[test]
fn test_cancel_current_fails_step_and_ends_session() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![blocking("Wait")]);
    wizard.next();

    wizard.cancel_current();

    assert_eq!(wizard.steps()[1].status(), StepStatus::Failed);
    assert_eq!(wizard.steps()[1].failure(), Some(&ProcessError::Cancelled));
    assert_eq!(wizard.session_end(), Some(SessionEnd::Cancelled));
    assert_eq!(transcript.closed(), Some(SessionEnd::Cancelled));
    assert!(!wizard.next());
    assert_eq!(wizard.finish(), None);
}

#[test]
fn test_request_cancel_asks_first() {
    let (mut wizard, transcript) = wizard_with(HeadlessSurface::new().confirming(false));
    wizard.set_steps(vec![blocking("Wait")]);
    wizard.next();

    assert!(!wizard.request_cancel());
    assert!(wizard.is_running());
    assert_eq!(wizard.session_end(), None);
    assert_eq!(transcript.record().confirms, [CANCEL_QUESTION]);

    wizard.cancel_current();
    assert_eq!(wizard.session_end(), Some(SessionEnd::Cancelled));
}

#[test]
fn test_custom_failure_page() {
    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_failure_page(InfoPage::new("Oops", ["Something broke"]));
    wizard.set_steps(vec![failing("Install")]);

    wizard.next();
    settle(&mut wizard);

    assert_eq!(wizard.current_step().unwrap().title(), "Oops");
    assert!(wizard.is_terminal());
}

#[test]
fn test_finish_only_at_the_end() {
    let (mut wizard, _) = wizard_with(HeadlessSurface::new());
    wizard.set_steps(vec![info("A")]);

    assert_eq!(wizard.finish(), None);
    wizard.next();
    assert_eq!(wizard.finish(), None);
    wizard.next();

    assert_eq!(wizard.navigation().next.label, FINISH_LABEL);
    assert_eq!(wizard.finish(), Some(SessionEnd::Completed));
    assert_eq!(wizard.finish(), None);
}

#[test]
fn test_demo_flow_completes() {
    let surface = HeadlessSurface::new().choosing(CONFIGURATION_LABEL, 2);
    let (mut wizard, transcript) = wizard_with(surface);
    wizard.set_steps(vec![
        Step::new(ConfigurationPage::new()),
        Step::new(ProgressPage::new(Duration::from_millis(60))),
        Step::new(ChecklistPage::new()),
        Step::new(LogsPage::with_delay(Duration::ZERO)),
    ]);

    for _ in 0..5 {
        assert!(wizard.next());
        settle(&mut wizard);
    }

    assert_eq!(wizard.current_step().unwrap().role(), StepRole::TerminalSuccess);
    assert_eq!(transcript.log_lines(), DEFAULT_LINES);
    assert_eq!(transcript.percents().last().copied(), Some(100.0));
    assert!(transcript
        .texts()
        .contains(&"Selected configuration: Full".to_string()));
    assert_eq!(wizard.finish(), Some(SessionEnd::Completed));
}

#[test]
fn test_demo_flow_with_simulated_error() {
    let surface = HeadlessSurface::new().toggling(TRIGGER_ERROR_LABEL, true);
    let (mut wizard, transcript) = wizard_with(surface);
    wizard.set_steps(vec![
        Step::new(ChecklistPage::new()),
        Step::new(LogsPage::with_delay(Duration::ZERO)),
    ]);

    wizard.next();
    wizard.next();
    settle(&mut wizard);

    assert_eq!(wizard.current_step().unwrap().role(), StepRole::TerminalFailure);
    assert_eq!(wizard.last_failure(), Some(&ProcessError::Reported));
    assert!(transcript.log_lines().is_empty());
    assert!(transcript.headings().contains(&"Checking Status".to_string()));
    assert_eq!(wizard.finish(), Some(SessionEnd::Failed));
}
