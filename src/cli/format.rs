//! Shared terminal formatting

use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::Value;

/// Human-readable age of `then` as seen at `now`
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 5 {
        return "now".to_string();
    }
    if seconds < 60 {
        return plural(seconds, "second") + " ago";
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute") + " ago";
    }

    let hours = minutes / 60;
    if hours < 24 {
        let rem_minutes = minutes % 60;
        let rem_seconds = seconds % 60;
        let head = plural(hours, "hour");
        return match (rem_minutes, rem_seconds) {
            (0, 0) => format!("{} ago", head),
            (0, s) => format!("{} {} seconds ago", head, s),
            (m, _) => format!("{} {} minutes ago", head, m),
        };
    }

    let days = hours / 24;
    if days < 30 {
        let rem_hours = hours % 24;
        let rem_minutes = minutes % 60;
        let head = plural(days, "day");
        return match (rem_hours, rem_minutes) {
            (0, 0) => format!("{} ago", head),
            (0, m) => format!("{} {} minutes ago", head, m),
            (h, _) => format!("{} {} hours ago", head, h),
        };
    }

    let months = days / 30;
    if months < 12 {
        return plural(months, "month") + " ago";
    }

    plural(months / 12, "year") + " ago"
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

pub fn local_timestamp(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Cut to `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Event kind of a hook or transcript payload, when it names one
pub fn payload_kind(payload: &str) -> String {
    serde_json::from_str::<Value>(payload)
        .ok()
        .and_then(|json| {
            ["hook_event_name", "type", "role"]
                .iter()
                .find_map(|key| json.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| "-".to_string())
}

/// Single-line payload preview
pub fn payload_preview(payload: &str, max: usize) -> String {
    let compact = match serde_json::from_str::<Value>(payload) {
        Ok(json) => json.to_string(),
        Err(_) => payload.split_whitespace().collect::<Vec<_>>().join(" "),
    };
    truncate(&compact, max)
}

/// Indented payload, or the raw text when it is not JSON
pub fn pretty_payload(payload: &str) -> String {
    serde_json::from_str::<Value>(payload)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| payload.to_string())
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
