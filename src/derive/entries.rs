//! Entry listing

use std::time::Instant;

use super::{project_directories, Entry};
use crate::descriptor::SchemaDescriptor;
use crate::error::Result;
use crate::resolver::PathResolver;
use crate::store::RecordSource;

/// Records of one session, in descriptor order, reported against the
/// canonical project path. Unknown sessions and projects yield no entries.
pub fn list_entries<S: RecordSource + ?Sized>(
    store: &S,
    resolver: &PathResolver,
    project_path: &str,
    session_id: &str,
    descriptor: &SchemaDescriptor,
) -> Result<Vec<Entry>> {
    let started = Instant::now();

    let dirs = project_directories(store, resolver, project_path)?;
    if dirs.is_empty() {
        return Ok(vec![]);
    }

    let entries: Vec<Entry> = store
        .session_records(
            &dirs,
            &descriptor.session_id_field,
            session_id,
            descriptor.order,
        )?
        .into_iter()
        .map(|record| Entry::from_record(record, project_path.to_string()))
        .collect();

    tracing::debug!(
        project = project_path,
        session = session_id,
        count = entries.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "listed entries"
    );
    Ok(entries)
}

/// Newest records across the dataset, each under its canonical path
pub fn recent_entries<S: RecordSource + ?Sized>(
    store: &S,
    resolver: &PathResolver,
    limit: usize,
) -> Result<Vec<Entry>> {
    let started = Instant::now();

    let entries: Vec<Entry> = store
        .recent_records(limit)?
        .into_iter()
        .map(|record| {
            let canonical = resolver.resolve(&record.working_directory);
            Entry::from_record(record, canonical)
        })
        .collect();

    tracing::debug!(
        count = entries.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "listed recent entries"
    );
    Ok(entries)
}
