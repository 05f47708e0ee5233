//! Project, session and entry derivation
//!
//! Neither log has a project or session table. Projects are canonical working
//! directories, sessions are groups of records sharing an embedded session id,
//! and entries are the records of one session. All three are recomputed from
//! the raw log on every call; only path resolution is cached.

mod entries;
mod projects;
mod sessions;

pub use entries::{list_entries, recent_entries};
pub use projects::list_projects;
pub use sessions::list_sessions;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::resolver::PathResolver;
use crate::store::{Record, RecordSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    pub canonical_path: String,
    pub display_name: String,
    pub last_activity: DateTime<Utc>,
    /// Raw working directories, other than the canonical path, folded into
    /// this project
    pub worktrees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub session_id: String,
    pub project_path: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file_path: Option<String>,
}

/// A record reported against its canonical project path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: String,
    pub payload: String,
    pub working_directory: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file_path: Option<String>,
}

impl Entry {
    pub(crate) fn from_record(record: Record, canonical_path: String) -> Self {
        Self {
            id: record.id,
            payload: record.payload,
            working_directory: canonical_path,
            created_at: record.created_at,
            source_file_path: record.source_file_path,
        }
    }
}

/// Last two non-empty segments: `/home/u/repo` -> `u/repo`
pub fn display_name(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.len() {
        0 => path.to_string(),
        n => segments[n.saturating_sub(2)..].join("/"),
    }
}

/// Every raw working directory in the store that canonicalizes to `project_path`:
/// the main checkout plus any worktrees of it.
pub(crate) fn project_directories<S: RecordSource + ?Sized>(
    store: &S,
    resolver: &PathResolver,
    project_path: &str,
) -> Result<Vec<String>> {
    Ok(store
        .working_directories()?
        .into_iter()
        .filter(|cwd| resolver.resolve(cwd) == project_path)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::worktree_resolver;
    use crate::store::fixtures::FixtureDb;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("/home/u/repo"), "u/repo");
        assert_eq!(display_name("/home/u/repo/"), "u/repo");
        assert_eq!(display_name("/repo"), "repo");
        assert_eq!(display_name("/"), "/");
        assert_eq!(display_name("C:/work/app"), "work/app");
    }

    #[test]
    fn test_project_directories_collects_worktrees() {
        let db = FixtureDb::hooks();
        db.hook("1", "/home/u/repo", r#"{"session_id":"a"}"#, 1)
            .hook("2", "/home/u/.worktrees/repo-feat", r#"{"session_id":"a"}"#, 2)
            .hook("3", "/home/u/.worktrees/unknown", r#"{"session_id":"b"}"#, 3)
            .hook("4", "/home/u/other", r#"{"session_id":"c"}"#, 4);
        let store = db.open();
        let resolver = worktree_resolver();

        let dirs = project_directories(&store, &resolver, "/home/u/repo").unwrap();
        assert_eq!(dirs, vec!["/home/u/.worktrees/repo-feat", "/home/u/repo"]);
        assert!(project_directories(&store, &resolver, "/nowhere")
            .unwrap()
            .is_empty());
    }
}
