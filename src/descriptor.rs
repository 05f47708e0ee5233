//! Schema descriptors
//!
//! A descriptor tells the session and entry derivations how one dataset embeds
//! its session identifier and how its entries are ordered. The hook-event log and
//! the chat-transcript log go through the same derivation code, differing only in
//! the descriptor they pass.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Display ordering of entries within a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

impl EntryOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            EntryOrder::Asc => "ASC",
            EntryOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// JSON path into the record payload, e.g. `$.session_id`
    pub session_id_field: String,

    /// Split sessions sharing an id across different source files
    #[serde(default)]
    pub include_file_path: bool,

    #[serde(default)]
    pub order: EntryOrder,
}

impl SchemaDescriptor {
    /// Hook-event log: `session_id` in the payload, newest entries first
    pub fn hooks() -> Self {
        Self {
            session_id_field: "$.session_id".to_string(),
            include_file_path: false,
            order: EntryOrder::Desc,
        }
    }

    /// Chat-transcript log: `sessionId` in the payload, one session per transcript
    /// file, read top to bottom
    pub fn chats() -> Self {
        Self {
            session_id_field: "$.sessionId".to_string(),
            include_file_path: true,
            order: EntryOrder::Asc,
        }
    }

    pub fn with_order(mut self, order: EntryOrder) -> Self {
        self.order = order;
        self
    }

    /// Reject field paths SQLite's JSON functions would fail on at query time.
    pub fn validate(&self) -> Result<()> {
        let field = self.session_id_field.as_str();
        if !is_json_path(field) {
            return Err(Error::Config(format!(
                "session_id_field must be a JSON path like '$.session_id', got '{}'",
                field
            )));
        }
        Ok(())
    }
}

/// `$` followed by one or more `.label`, `."quoted label"`, `[N]`, `[#]` or
/// `[#-N]` steps
fn is_json_path(path: &str) -> bool {
    let mut rest = match path.strip_prefix('$') {
        Some(rest) if !rest.is_empty() => rest,
        _ => return false,
    };

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            if let Some(quoted) = after.strip_prefix('"') {
                match quoted.find('"') {
                    Some(end) if end > 0 => rest = &quoted[end + 1..],
                    _ => return false,
                }
            } else {
                let end = after
                    .find(|c: char| c == '.' || c == '[')
                    .unwrap_or(after.len());
                let label = &after[..end];
                let bad_char = |c: char| c.is_whitespace() || c == '"' || c == ']';
                if label.is_empty() || label.chars().any(bad_char) {
                    return false;
                }
                rest = &after[end..];
            }
        } else if let Some(after) = rest.strip_prefix('[') {
            let Some(end) = after.find(']') else {
                return false;
            };
            if !is_array_index(&after[..end]) {
                return false;
            }
            rest = &after[end + 1..];
        } else {
            return false;
        }
    }
    true
}

fn is_array_index(index: &str) -> bool {
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    index == "#" || digits(index) || index.strip_prefix("#-").is_some_and(digits)
}
