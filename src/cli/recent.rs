//! Recent command implementation

use anyhow::Result;
use chrono::Utc;

use super::format::{payload_kind, print_json, relative_time, truncate};
use crate::browser::Browser;
use crate::derive::display_name;
use crate::store::RecordSource;

pub fn run<S: RecordSource>(browser: &Browser<S>, limit: usize, json: bool) -> Result<()> {
    let entries = browser.recent(limit)?;

    if json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No records yet.");
        return Ok(());
    }

    println!(
        "{:<26} {:<24} {:<20} {}",
        "When", "Project", "Kind", "ID"
    );
    println!("{}", "-".repeat(100));

    let now = Utc::now();
    for entry in entries {
        println!(
            "{:<26} {:<24} {:<20} {}",
            relative_time(entry.created_at, now),
            truncate(&display_name(&entry.working_directory), 24),
            truncate(&payload_kind(&entry.payload), 20),
            entry.id,
        );
    }

    Ok(())
}
