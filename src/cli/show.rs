//! Show command implementation

use anyhow::Result;

use super::format::{local_timestamp, pretty_payload, print_json};
use crate::browser::Browser;
use crate::store::RecordSource;

pub fn run<S: RecordSource>(browser: &Browser<S>, ids: &[String], json: bool) -> Result<()> {
    let records = browser.records(ids)?;

    if json {
        return print_json(&records);
    }

    if records.is_empty() {
        println!("No records found for {}.", ids.join(", "));
        return Ok(());
    }

    for record in records {
        println!("\n{}", "=".repeat(80));
        println!("Record: {}", record.id);
        println!("Created: {}", local_timestamp(record.created_at));
        println!("Working directory: {}", record.working_directory);
        if let Some(file) = &record.source_file_path {
            println!("File: {}", file);
        }
        println!("{}", "-".repeat(80));
        println!("{}", pretty_payload(&record.payload));
    }

    Ok(())
}
