//! Backend log stream: frame parsing, the capped display buffer and the
//! reconnect schedule. The socket transport lives in `hints-client`.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MAX_LINES: usize = 100;

const RECONNECT_STEP: Duration = Duration::from_millis(1500);
const RECONNECT_CAP: Duration = Duration::from_secs(10);
const MAX_RECONNECT_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl LogLevel {
    fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "success" => LogLevel::Success,
            _ => LogLevel::Info,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Success => "success",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// When set, this entry updates an earlier one with the same id in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace_id: Option<String>,
}

impl LogEntry {
    /// Parse one text frame from the log stream; `None` for non-JSON frames.
    #[must_use]
    pub fn parse_frame(raw: &str) -> Option<Self> {
        Self::parse_frame_at(raw, Utc::now())
    }

    /// Like [`LogEntry::parse_frame`], stamping entries without a timestamp with `now`.
    #[must_use]
    pub fn parse_frame_at(raw: &str, now: DateTime<Utc>) -> Option<Self> {
        let data: Value = serde_json::from_str(raw).ok()?;
        let Value::Object(map) = data else {
            return None;
        };

        let text = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            timestamp: text("timestamp")
                .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            level: text("level").map_or(LogLevel::Info, |l| LogLevel::parse(&l)),
            message: text("message").or_else(|| text("content")).unwrap_or_default(),
            platform: text("platform"),
            replace_id: text("replace_id"),
        })
    }
}

/// The most recent log lines, capped at `max_lines`.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_lines: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl LogBuffer {
    #[must_use]
    pub fn new(max_lines: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_lines.min(1024)),
            max_lines: max_lines.max(1),
        }
    }

    /// Replace the entry with the same `replace_id` if one is buffered,
    /// otherwise append and drop the oldest lines beyond the cap.
    pub fn push(&mut self, entry: LogEntry) {
        if let Some(id) = entry.replace_id.as_deref() {
            if let Some(slot) = self
                .entries
                .iter_mut()
                .rev()
                .find(|e| e.replace_id.as_deref() == Some(id))
            {
                *slot = entry;
                return;
            }
        }

        self.entries.push_back(entry);
        while self.entries.len() > self.max_lines {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }
}

/// Capped linear backoff: `min(1.5s * attempt, 10s)`, at most 10 attempts.
#[derive(Debug, Clone, Default)]
pub struct ReconnectPolicy {
    attempts: u32,
}

impl ReconnectPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next reconnect, or `None` once attempts are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= MAX_RECONNECT_ATTEMPTS {
            return None;
        }
        self.attempts += 1;
        Some((RECONNECT_STEP * self.attempts).min(RECONNECT_CAP))
    }

    /// Call after a successful connect.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn entry(message: &str, replace_id: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            level: LogLevel::Info,
            message: message.to_string(),
            platform: None,
            replace_id: replace_id.map(str::to_string),
        }
    }

    #[test]
    fn parse_frame_fills_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let parsed = LogEntry::parse_frame_at(r#"{"content":"crawling page 2","platform":"dy"}"#, now)
            .expect("json frame parses");
        assert_eq!(parsed.message, "crawling page 2");
        assert_eq!(parsed.level, LogLevel::Info);
        assert_eq!(parsed.timestamp, "2024-03-01T12:00:00.000Z");
        assert_eq!(parsed.platform.as_deref(), Some("dy"));
    }

    #[test]
    fn parse_frame_reads_replace_id_and_level() {
        let parsed = LogEntry::parse_frame(
            r#"{"timestamp":"t","level":"success","message":"done","replace_id":"p1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.level, LogLevel::Success);
        assert_eq!(parsed.replace_id.as_deref(), Some("p1"));
        assert_eq!(parsed.timestamp, "t");
    }

    #[test]
    fn non_json_frames_are_ignored() {
        assert!(LogEntry::parse_frame("ping").is_none());
        assert!(LogEntry::parse_frame("[1,2]").is_none());
    }

    #[test]
    fn buffer_caps_to_last_lines() {
        let mut buf = LogBuffer::new(3);
        for i in 0..5 {
            buf.push(entry(&i.to_string(), None));
        }
        let messages: Vec<&str> = buf.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["2", "3", "4"]);
    }

    #[test]
    fn replace_id_updates_in_place() {
        let mut buf = LogBuffer::new(10);
        buf.push(entry("start", None));
        buf.push(entry("progress 10%", Some("bar")));
        buf.push(entry("other", None));
        buf.push(entry("progress 50%", Some("bar")));

        let messages: Vec<&str> = buf.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["start", "progress 50%", "other"]);
    }

    #[test]
    fn reconnect_backoff_is_linear_capped_and_bounded() {
        let mut policy = ReconnectPolicy::new();
        let delays: Vec<Duration> = std::iter::from_fn(|| policy.next_delay()).collect();
        assert_eq!(delays.len(), 10);
        assert_eq!(delays[0], Duration::from_millis(1500));
        assert_eq!(delays[1], Duration::from_millis(3000));
        assert_eq!(delays[6], Duration::from_secs(10));
        assert_eq!(delays[9], Duration::from_secs(10));

        policy.reset();
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(1500)));
    }
}
