//! Subjects command - list the reference data.

use anyhow::Result;
use caseplay_core::ReferenceData;
use colored::Colorize;

use crate::theme::Theme;

/// List subjects with their zone status.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn list_subjects(reference: &ReferenceData) -> Result<()> {
    println!("\n{}", Theme::header("Subjects"));
    println!(
        "{:<16} {:<16} {:<12} {:<6} {:<8} {}",
        "ID".dimmed(),
        "NAME".dimmed(),
        "LOCATION".dimmed(),
        "ZONE".dimmed(),
        "STATUS".dimmed(),
        "INCIDENT".dimmed()
    );
    println!("{}", Theme::separator());

    for (id, subject) in reference.subjects() {
        let (status, incident) = match reference.zone(&subject.zone) {
            Some(zone) => (
                Theme::zone_status(zone.status),
                zone.incident_id.as_deref().map_or_else(
                    || "-".to_string(),
                    |incident| format!("{incident} ({} affected)", zone.affected),
                ),
            ),
            None => ("?".to_string(), "-".to_string()),
        };

        println!(
            "{:<16} {:<16} {:<12} {:<6} {:<8} {}",
            id.as_str().cyan(),
            subject.display_name,
            subject.location,
            subject.zone.as_str(),
            status,
            incident
        );
    }

    println!();
    Ok(())
}
