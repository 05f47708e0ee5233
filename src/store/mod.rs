//! Read-only record store over SQLite
//!
//! The derivations only need a handful of query shapes, collected in the
//! `RecordSource` trait. `SqliteRecordStore` answers them against the `entries`
//! table the hook and chat loggers append to.

pub mod schema;

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use serde::Serialize;

use crate::descriptor::EntryOrder;
use crate::error::{Error, Result};

/// JSON types accepted as a session identifier
const SCALAR_TYPES: &str = "('text', 'integer', 'real')";

/// Rows missing any of these are skipped rather than failing the query
const COMPLETE_ROW: &str =
    "id IS NOT NULL AND data IS NOT NULL AND cwd IS NOT NULL AND created IS NOT NULL";

/// Query surface the derivations consume
pub trait RecordSource {
    /// Each distinct working directory with its newest record time
    fn working_directories_with_activity(&self) -> Result<Vec<(String, DateTime<Utc>)>>;

    fn working_directories(&self) -> Result<Vec<String>>;

    /// Session id, file path and time of every record under `dirs` whose
    /// `field` holds a scalar
    fn session_keys(&self, dirs: &[String], field: &str) -> Result<Vec<SessionKey>>;

    /// Records under `dirs` whose `field` equals `session_id`, ordered by
    /// creation time then id, both in `order`
    fn session_records(
        &self,
        dirs: &[String],
        field: &str,
        session_id: &str,
        order: EntryOrder,
    ) -> Result<Vec<Record>>;

    /// Newest records across the whole dataset
    fn recent_records(&self, limit: usize) -> Result<Vec<Record>>;

    fn records_by_ids(&self, ids: &[String]) -> Result<Vec<Record>>;
}

/// One row of a record log, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: String,
    pub payload: String,
    pub working_directory: String,
    pub created_at: DateTime<Utc>,
    pub source_file_path: Option<String>,
}

/// Grouping key of a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub session_id: String,
    pub source_file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct SqliteRecordStore {
    conn: Connection,
    has_file_path: bool,
}

impl SqliteRecordStore {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "database not found: {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let has_file_path = Self::inspect_columns(&conn, path)?;

        Ok(Self {
            conn,
            has_file_path,
        })
    }

    /// Verify the required columns; report whether `filepath` exists.
    fn inspect_columns(conn: &Connection, path: &Path) -> Result<bool> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", schema::TABLE))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(Error::Schema {
                path: path.to_path_buf(),
                message: format!("no '{}' table", schema::TABLE),
            });
        }

        let missing: Vec<&str> = schema::REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| !columns.iter().any(|have| have == c))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema {
                path: path.to_path_buf(),
                message: format!("missing columns: {}", missing.join(", ")),
            });
        }

        Ok(columns.iter().any(|c| c == schema::FILE_PATH_COLUMN))
    }

    /// Whether records carry a source file path
    pub fn has_file_path(&self) -> bool {
        self.has_file_path
    }

    fn file_path_expr(&self) -> &'static str {
        if self.has_file_path {
            schema::FILE_PATH_COLUMN
        } else {
            "NULL"
        }
    }

    fn record_columns(&self) -> String {
        format!(
            "CAST(id AS TEXT), data, cwd, CAST(created AS INTEGER), {}",
            self.file_path_expr()
        )
    }

    fn map_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
        Ok(Record {
            id: row.get(0)?,
            payload: row.get(1)?,
            working_directory: row.get(2)?,
            created_at: timestamp(row, 3)?,
            source_file_path: row.get(4)?,
        })
    }
}

impl RecordSource for SqliteRecordStore {
    fn working_directories_with_activity(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        let query = format!(
            "SELECT cwd, MAX(CAST(created AS INTEGER)) FROM entries WHERE {} GROUP BY cwd ORDER BY cwd",
            COMPLETE_ROW
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, timestamp(row, 1)?)))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn working_directories(&self) -> Result<Vec<String>> {
        let query = format!(
            "SELECT DISTINCT cwd FROM entries WHERE {} ORDER BY cwd",
            COMPLETE_ROW
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn session_keys(&self, dirs: &[String], field: &str) -> Result<Vec<SessionKey>> {
        if dirs.is_empty() {
            return Ok(vec![]);
        }

        // ?1 = field, ?2.. = dirs
        let query = format!(
            r#"SELECT CAST(json_extract(data, ?1) AS TEXT), {}, CAST(created AS INTEGER)
               FROM entries
               WHERE {}
                 AND cwd IN ({})
                 AND (CASE WHEN json_valid(data) THEN json_type(data, ?1) END) IN {}"#,
            self.file_path_expr(),
            COMPLETE_ROW,
            placeholders(2, dirs.len()),
            SCALAR_TYPES,
        );

        let values = std::iter::once(field).chain(dirs.iter().map(String::as_str));
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(values), |row| {
            Ok(SessionKey {
                session_id: row.get(0)?,
                source_file_path: row.get(1)?,
                created_at: timestamp(row, 2)?,
            })
        })?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn session_records(
        &self,
        dirs: &[String],
        field: &str,
        session_id: &str,
        order: EntryOrder,
    ) -> Result<Vec<Record>> {
        if dirs.is_empty() {
            return Ok(vec![]);
        }

        // ?1 = field, ?2 = session id, ?3.. = dirs
        // json_extract raises on malformed payloads, so it only runs behind json_valid
        let query = format!(
            r#"SELECT {}
               FROM entries
               WHERE {}
                 AND cwd IN ({})
                 AND (CASE WHEN json_valid(data) THEN json_type(data, ?1) END) IN {}
                 AND (CASE WHEN json_valid(data) THEN CAST(json_extract(data, ?1) AS TEXT) END) = ?2
               ORDER BY CAST(created AS INTEGER) {dir}, id {dir}"#,
            self.record_columns(),
            COMPLETE_ROW,
            placeholders(3, dirs.len()),
            SCALAR_TYPES,
            dir = order.as_sql(),
        );

        let values = [field, session_id]
            .into_iter()
            .chain(dirs.iter().map(String::as_str));
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(values), Self::map_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn recent_records(&self, limit: usize) -> Result<Vec<Record>> {
        let query = format!(
            "SELECT {} FROM entries WHERE {} ORDER BY CAST(created AS INTEGER) DESC, id DESC LIMIT ?1",
            self.record_columns(),
            COMPLETE_ROW
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params![limit], Self::map_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    fn records_by_ids(&self, ids: &[String]) -> Result<Vec<Record>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let query = format!(
            "SELECT {} FROM entries WHERE {} AND CAST(id AS TEXT) IN ({}) ORDER BY CAST(created AS INTEGER) ASC, id ASC",
            self.record_columns(),
            COMPLETE_ROW,
            placeholders(1, ids.len()),
        );
        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), Self::map_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

/// `?start, ?start+1, ...` for `count` parameters
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, secs))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Writable scratch database in the hook or chat layout
    pub(crate) struct FixtureDb {
        _dir: TempDir,
        pub(crate) path: PathBuf,
        conn: Connection,
    }

    impl FixtureDb {
        pub(crate) fn with_schema(ddl: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("entries.db");
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(ddl).unwrap();
            Self {
                _dir: dir,
                path,
                conn,
            }
        }

        pub(crate) fn hooks() -> Self {
            Self::with_schema(schema::HOOKS_TABLE)
        }

        pub(crate) fn chats() -> Self {
            Self::with_schema(schema::CHATS_TABLE)
        }

        pub(crate) fn hook(&self, id: &str, cwd: &str, data: &str, created: i64) -> &Self {
            self.conn
                .execute(
                    "INSERT INTO entries (id, data, cwd, created) VALUES (?, ?, ?, ?)",
                    params![id, data, cwd, created],
                )
                .unwrap();
            self
        }

        pub(crate) fn chat(
            &self,
            id: &str,
            cwd: &str,
            filepath: &str,
            data: &str,
            created: i64,
        ) -> &Self {
            self.conn
                .execute(
                    "INSERT INTO entries (id, data, cwd, filepath, created) VALUES (?, ?, ?, ?, ?)",
                    params![id, data, cwd, filepath, created],
                )
                .unwrap();
            self
        }

        /// Rows the regular builders cannot express, such as NULL columns
        pub(crate) fn raw(&self, sql: &str) -> &Self {
            self.conn.execute_batch(sql).unwrap();
            self
        }

        pub(crate) fn open(&self) -> SqliteRecordStore {
            SqliteRecordStore::open(&self.path).unwrap()
        }
    }
}
