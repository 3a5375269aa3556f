//! CLI theme and styling.

use caseplay_core::{CaseEvent, EventCategory, RunState, RunStatus, ZoneStatus};
use colored::Colorize;

/// Width of the progress bar, in cells.
const BAR_WIDTH: usize = 20;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {}", key.bold(), value)
    }

    /// Format an investigation log line.
    pub(crate) fn event(event: &CaseEvent) -> String {
        format!(
            "{} — {} — {}",
            event.clock_label().dimmed(),
            Self::category(event.category),
            event.message
        )
    }

    /// Format an event category.
    pub(crate) fn category(category: EventCategory) -> String {
        let label = category.label();
        match category {
            EventCategory::Request => label.blue().to_string(),
            EventCategory::System => label.cyan().to_string(),
            EventCategory::Validation => label.magenta().to_string(),
            EventCategory::Result => label.yellow().bold().to_string(),
            EventCategory::Status => label.green().bold().to_string(),
        }
    }

    /// Format a zone status.
    pub(crate) fn zone_status(status: ZoneStatus) -> String {
        match status {
            ZoneStatus::Active => "ACTIVE".red().bold().to_string(),
            ZoneStatus::None => "NONE".green().to_string(),
        }
    }

    /// Format a run status.
    pub(crate) fn run_status(status: RunStatus) -> String {
        match status {
            RunStatus::Idle => "IDLE".dimmed().to_string(),
            RunStatus::Running => "RUNNING".yellow().to_string(),
            RunStatus::Completed => "COMPLETED".green().bold().to_string(),
        }
    }

    /// Format a progress bar with its percentage.
    pub(crate) fn progress(state: &RunState) -> String {
        let percent = state.percent();
        let filled = progress_cells(percent);
        format!(
            "[{}{}] {percent:>3}%",
            "█".repeat(filled).cyan(),
            "░".repeat(BAR_WIDTH.saturating_sub(filled)).dimmed()
        )
    }
}

/// Number of filled cells for a percentage.
fn progress_cells(percent: u8) -> usize {
    usize::from(percent.min(100)).saturating_mul(BAR_WIDTH) / 100
}

/// Print a banner for the CLI.
pub(crate) fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!("{}", format!("caseplay v{version}").cyan().bold());
    println!("{}", "Scripted investigation replay".dimmed());
    println!();
}
