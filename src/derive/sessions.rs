//! Session listing

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};

use super::{project_directories, Session};
use crate::descriptor::SchemaDescriptor;
use crate::error::Result;
use crate::resolver::PathResolver;
use crate::store::RecordSource;

/// Sessions of one canonical project, newest first.
///
/// Records are grouped by session id, or by session id and source file when
/// the descriptor asks for it. A project with no records yields no sessions.
pub fn list_sessions<S: RecordSource + ?Sized>(
    store: &S,
    resolver: &PathResolver,
    project_path: &str,
    descriptor: &SchemaDescriptor,
) -> Result<Vec<Session>> {
    let started = Instant::now();

    let dirs = project_directories(store, resolver, project_path)?;
    if dirs.is_empty() {
        return Ok(vec![]);
    }

    let mut groups: HashMap<(String, Option<String>), DateTime<Utc>> = HashMap::new();
    for key in store.session_keys(&dirs, &descriptor.session_id_field)? {
        let file = if descriptor.include_file_path {
            key.source_file_path
        } else {
            None
        };
        groups
            .entry((key.session_id, file))
            .and_modify(|start| *start = (*start).min(key.created_at))
            .or_insert(key.created_at);
    }

    let mut sessions: Vec<Session> = groups
        .into_iter()
        .map(|((session_id, source_file_path), start_time)| Session {
            session_id,
            project_path: project_path.to_string(),
            start_time,
            source_file_path,
        })
        .collect();

    sessions.sort_by(|a, b| {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| a.session_id.cmp(&b.session_id))
            .then_with(|| a.source_file_path.cmp(&b.source_file_path))
    });

    tracing::debug!(
        project = project_path,
        directories = dirs.len(),
        count = sessions.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "listed sessions"
    );
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::worktree_resolver;
    use crate::store::fixtures::FixtureDb;

    #[test]
    fn test_session_spans_checkout_and_worktree() {
        let db = FixtureDb::hooks();
        db.hook("1", "/home/u/repo", r#"{"session_id":"abc"}"#, 150)
            .hook("2", "/home/u/.worktrees/repo-feat", r#"{"session_id":"abc"}"#, 120)
            .hook("3", "/home/u/repo", r#"{"session_id":"abc"}"#, 180);
        let store = db.open();

        let sessions = list_sessions(
            &store,
            &worktree_resolver(),
            "/home/u/repo",
            &SchemaDescriptor::hooks(),
        )
        .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "abc");
        assert_eq!(sessions[0].start_time.timestamp(), 120);
        assert_eq!(sessions[0].project_path, "/home/u/repo");
        assert_eq!(sessions[0].source_file_path, None);
    }

    #[test]
    fn test_unknown_project_has_no_sessions() {
        let db = FixtureDb::hooks();
        db.hook("1", "/home/u/repo", r#"{"session_id":"abc"}"#, 1);
        let store = db.open();

        let sessions = list_sessions(
            &store,
            &worktree_resolver(),
            "/home/u/elsewhere",
            &SchemaDescriptor::hooks(),
        )
        .unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_file_path_splits_sessions_only_when_requested() {
        let db = FixtureDb::chats();
        db.chat("1", "/home/u/repo", "/t/a.jsonl", r#"{"sessionId":"s1"}"#, 10)
            .chat("2", "/home/u/repo", "/t/b.jsonl", r#"{"sessionId":"s1"}"#, 20)
            .chat("3", "/home/u/repo", "/t/a.jsonl", r#"{"sessionId":"s1"}"#, 5);
        let store = db.open();
        let resolver = worktree_resolver();

        let split =
            list_sessions(&store, &resolver, "/home/u/repo", &SchemaDescriptor::chats()).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].source_file_path.as_deref(), Some("/t/b.jsonl"));
        assert_eq!(split[0].start_time.timestamp(), 20);
        assert_eq!(split[1].source_file_path.as_deref(), Some("/t/a.jsonl"));
        assert_eq!(split[1].start_time.timestamp(), 5);

        let merged_descriptor = SchemaDescriptor {
            include_file_path: false,
            ..SchemaDescriptor::chats()
        };
        let merged = list_sessions(&store, &resolver, "/home/u/repo", &merged_descriptor).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start_time.timestamp(), 5);
        assert_eq!(merged[0].source_file_path, None);
    }

    #[test]
    fn test_sorted_newest_first_and_excludes_unusable_ids() {
        let db = FixtureDb::hooks();
        db.hook("1", "/home/u/repo", r#"{"session_id":"old"}"#, 10)
            .hook("2", "/home/u/repo", r#"{"session_id":"new"}"#, 30)
            .hook("3", "/home/u/repo", r#"{"session_id":"mid"}"#, 20)
            .hook("4", "/home/u/repo", r#"{"no_session":true}"#, 40)
            .hook("5", "/home/u/repo", "{broken", 50)
            .hook("6", "/home/u/repo", r#"{"session_id":["list"]}"#, 60);
        let store = db.open();

        let sessions = list_sessions(
            &store,
            &worktree_resolver(),
            "/home/u/repo",
            &SchemaDescriptor::hooks(),
        )
        .unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_descriptor_field_selects_grouping_key() {
        let db = FixtureDb::hooks();
        db.hook("1", "/home/u/repo", r#"{"session_id":"a","run":{"id":7}}"#, 1)
            .hook("2", "/home/u/repo", r#"{"session_id":"b","run":{"id":7}}"#, 2);
        let store = db.open();

        let descriptor = SchemaDescriptor {
            session_id_field: "$.run.id".to_string(),
            ..SchemaDescriptor::hooks()
        };
        let sessions =
            list_sessions(&store, &worktree_resolver(), "/home/u/repo", &descriptor).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].session_id, "7");
        assert_eq!(sessions[0].start_time.timestamp(), 1);
    }
}
