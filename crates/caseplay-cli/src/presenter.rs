//! Renders engine notifications to the terminal.

use std::sync::Arc;

use caseplay_core::{ReferenceData, RunState, RunStatus, SubjectId};
use caseplay_engine::SessionSnapshot;
use caseplay_events::ReplayEvent;

use crate::theme::Theme;

/// Prints the investigation log as it is produced.
pub(crate) struct Presenter {
    reference: Arc<ReferenceData>,
    show_progress: bool,
}

impl Presenter {
    pub(crate) fn new(reference: Arc<ReferenceData>) -> Self {
        Self {
            reference,
            show_progress: true,
        }
    }

    /// Skip the per-step progress bar.
    pub(crate) fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub(crate) fn render(&self, event: &ReplayEvent) {
        match event {
            ReplayEvent::RunStarted { token, subject, .. } => {
                println!();
                println!(
                    "{} {}",
                    Theme::header(&format!("Investigating {}", self.describe(subject))),
                    Theme::dimmed(&format!("({token})"))
                );
                println!("{}", Theme::separator());
            },
            ReplayEvent::EventEmitted { event, .. } => {
                println!("  {}", Theme::event(event));
            },
            ReplayEvent::StepCompleted { step, .. } => {
                println!("    {}", Theme::success(step.label()));
            },
            ReplayEvent::ProgressChanged { progress, .. } => {
                if self.show_progress {
                    let state = RunState {
                        progress: *progress,
                        status: RunStatus::Running,
                    };
                    println!("    {}", Theme::progress(&state));
                }
            },
            ReplayEvent::RunCompleted { .. } => {
                println!("{}", Theme::separator());
            },
            ReplayEvent::AutoplayToggled { enabled, .. } => {
                let state = if *enabled { "enabled" } else { "paused" };
                println!("{}", Theme::info(&format!("Autoplay {state}")));
            },
        }
    }

    /// Print the final state of a run.
    pub(crate) fn summary(&self, snapshot: &SessionSnapshot) {
        println!(
            "{}",
            Theme::kv("Subject", &self.describe(&snapshot.subject))
        );
        println!(
            "{}",
            Theme::kv("Steps", &format!("{} completed", snapshot.steps.len()))
        );
        println!(
            "{}  {}",
            Theme::kv("Status", &Theme::run_status(snapshot.run.status)),
            Theme::progress(&snapshot.run)
        );
    }

    fn describe(&self, subject: &SubjectId) -> String {
        match self.reference.subject(subject) {
            Some(details) => format!("{} [{subject}]", details.display_name),
            None => subject.to_string(),
        }
    }
}
