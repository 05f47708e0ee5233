//! Entries command implementation

use anyhow::Result;

use super::format::{local_timestamp, payload_kind, payload_preview, print_json, truncate};
use super::project_path;
use crate::browser::Browser;
use crate::store::RecordSource;

pub fn run<S: RecordSource>(
    browser: &Browser<S>,
    project: &str,
    session_id: &str,
    json: bool,
) -> Result<()> {
    let project_path = project_path(browser, project)?;
    let entries = browser.entries(&project_path, session_id)?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!(
            "No entries found for session '{}' in '{}'.",
            session_id, project_path
        );
        return Ok(());
    }

    println!("Session: {} ({} entries)", session_id, entries.len());
    println!("Project: {}", project_path);
    println!("{}", "=".repeat(100));

    for entry in entries {
        println!(
            "{:<20} {:<12} {:<18} {}",
            local_timestamp(entry.created_at),
            truncate(&entry.id, 12),
            truncate(&payload_kind(&entry.payload), 18),
            payload_preview(&entry.payload, 60),
        );
    }

    Ok(())
}
