//! Projects command implementation

use anyhow::Result;
use chrono::Utc;

use super::format::{print_json, relative_time, truncate};
use crate::browser::Browser;
use crate::store::RecordSource;

pub fn run<S: RecordSource>(browser: &Browser<S>, json: bool) -> Result<()> {
    let projects = browser.projects()?;

    if json {
        return print_json(&projects);
    }

    if projects.is_empty() {
        println!("No projects found. Is the logger writing to this database?");
        return Ok(());
    }

    println!(
        "{:<28} {:<26} {:<9} {}",
        "Project", "Last activity", "Worktrees", "Path"
    );
    println!("{}", "-".repeat(100));

    let now = Utc::now();
    for project in projects {
        println!(
            "{:<28} {:<26} {:<9} {}",
            truncate(&project.display_name, 28),
            relative_time(project.last_activity, now),
            project.worktrees.len(),
            project.canonical_path,
        );
    }

    Ok(())
}
