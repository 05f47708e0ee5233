//! Record log layout
//!
//! Both loggers append to a single `entries` table. The hook logger writes
//! `id, data, cwd, created`; the chat logger adds `filepath`, the transcript file
//! each line was read from. `data` is the raw JSON payload and `created` is epoch
//! seconds. This crate never creates or alters these tables; the DDL below
//! documents the layout and builds test fixtures.

pub const TABLE: &str = "entries";

/// Columns every dataset must have
pub const REQUIRED_COLUMNS: [&str; 4] = ["id", "data", "cwd", "created"];

/// Present only in transcript logs
pub const FILE_PATH_COLUMN: &str = "filepath";

pub const HOOKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL,                    -- hook event JSON, carries session_id
    cwd TEXT NOT NULL,                     -- working directory of the agent
    created INTEGER NOT NULL               -- epoch seconds
);
CREATE INDEX IF NOT EXISTS idx_entries_cwd ON entries(cwd);
CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created DESC);
"#;

pub const CHATS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY,
    data TEXT NOT NULL,                    -- transcript line JSON, carries sessionId
    cwd TEXT NOT NULL,
    filepath TEXT,                         -- transcript file the line came from
    created INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_entries_cwd ON entries(cwd);
CREATE INDEX IF NOT EXISTS idx_entries_created ON entries(created DESC);
"#;
