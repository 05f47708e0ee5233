//! Project listing

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{display_name, Project};
use crate::error::Result;
use crate::resolver::PathResolver;
use crate::store::RecordSource;

#[derive(Default)]
struct Fold {
    last_activity: Option<DateTime<Utc>>,
    observed_directly: bool,
    worktrees: Vec<String>,
}

/// Canonical projects in the store, most recently active first, ties by path.
pub fn list_projects<S: RecordSource + ?Sized>(
    store: &S,
    resolver: &PathResolver,
) -> Result<Vec<Project>> {
    let started = Instant::now();
    let mut folded: BTreeMap<String, Fold> = BTreeMap::new();

    for (cwd, activity) in store.working_directories_with_activity()? {
        let canonical = resolver.resolve(&cwd);
        let fold = folded.entry(canonical.clone()).or_default();

        fold.last_activity = Some(fold.last_activity.map_or(activity, |t| t.max(activity)));
        if cwd == canonical {
            fold.observed_directly = true;
        } else {
            fold.worktrees.push(cwd);
        }
    }

    let mut projects: Vec<Project> = folded
        .into_iter()
        .filter_map(|(canonical_path, mut fold)| {
            if !fold.observed_directly {
                tracing::debug!(
                    project = %canonical_path,
                    worktrees = fold.worktrees.len(),
                    "project only observed through worktrees"
                );
            }
            fold.worktrees.sort();
            Some(Project {
                display_name: display_name(&canonical_path),
                last_activity: fold.last_activity?,
                worktrees: fold.worktrees,
                canonical_path,
            })
        })
        .collect();

    projects.sort_by(|a, b| {
        b.last_activity
            .cmp(&a.last_activity)
            .then_with(|| a.canonical_path.cmp(&b.canonical_path))
    });

    tracing::debug!(
        count = projects.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "listed projects"
    );
    Ok(projects)
}
