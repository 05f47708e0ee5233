//! Sessions command implementation

use anyhow::Result;
use chrono::Utc;

use super::format::{local_timestamp, print_json, relative_time};
use super::project_path;
use crate::browser::Browser;
use crate::store::RecordSource;

pub fn run<S: RecordSource>(browser: &Browser<S>, project: &str, json: bool) -> Result<()> {
    let project_path = project_path(browser, project)?;
    let sessions = browser.sessions(&project_path)?;

    if json {
        return print_json(&sessions);
    }

    if sessions.is_empty() {
        println!("No sessions found for '{}'.", project_path);
        return Ok(());
    }

    println!("Project: {}", project_path);
    println!(
        "{:<20} {:<26} {:<38} {}",
        "Started", "Age", "Session", "File"
    );
    println!("{}", "-".repeat(100));

    let now = Utc::now();
    for session in sessions {
        println!(
            "{:<20} {:<26} {:<38} {}",
            local_timestamp(session.start_time),
            relative_time(session.start_time, now),
            session.session_id,
            session.source_file_path.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
