//! Housekeeping markers written by the capture agent
//!
//! The agent brackets each session and periodically stamps the running key count:
//! [Keylogging begin]
//! [keycount 100 timestamp Tue Mar 12 09:15:42 2024]
//! [Keylogging end]
//!
//! These markers are not keystrokes and are kept out of the frequency table.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const KEYCOUNT_PREFIX: &str = "[keycount ";
pub const SESSION_BEGIN_PREFIX: &str = "[Keylogging begin]";
pub const SESSION_END_PREFIX: &str = "[Keylogging end]";

/// ctime(3) layout used by the agent's timestamps
const CTIME_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Static regex for the periodic key count marker
/// Format: [keycount N timestamp TEXT]
static KEYCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[keycount\s+(\d+)(?:\s+timestamp\s+([^\]]*))?")
        .expect("Invalid KEYCOUNT_RE regex")
});

/// A recognized housekeeping marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaTag {
    SessionBegin,
    SessionEnd,
    KeyCount {
        count: Option<u64>,
        timestamp: Option<NaiveDateTime>,
        raw_timestamp: Option<String>,
    },
}

impl MetaTag {
    /// Classify token text by its prefix; `None` for ordinary tokens
    pub fn classify(text: &str) -> Option<MetaTag> {
        if text.starts_with(KEYCOUNT_PREFIX) {
            Some(parse_keycount(text))
        } else if text.starts_with(SESSION_BEGIN_PREFIX) {
            Some(MetaTag::SessionBegin)
        } else if text.starts_with(SESSION_END_PREFIX) {
            Some(MetaTag::SessionEnd)
        } else {
            None
        }
    }
}

/// Whether a token is a housekeeping marker
#[allow(dead_code)]
pub fn is_meta_tag(text: &str) -> bool {
    MetaTag::classify(text).is_some()
}

fn parse_keycount(text: &str) -> MetaTag {
    let Some(caps) = KEYCOUNT_RE.captures(text) else {
        return MetaTag::KeyCount {
            count: None,
            timestamp: None,
            raw_timestamp: None,
        };
    };

    let count = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let raw_timestamp = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());
    let timestamp = raw_timestamp.as_deref().and_then(parse_ctime);

    MetaTag::KeyCount {
        count,
        timestamp,
        raw_timestamp,
    }
}

/// Parse a ctime(3) string, tolerating the space padding of single-digit days
fn parse_ctime(raw: &str) -> Option<NaiveDateTime> {
    let normalized = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, CTIME_FORMAT).ok()
}

/// Session activity reconstructed from filtered markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionLog {
    pub sessions_begun: u64,
    pub sessions_ended: u64,
    pub keycount_markers: u64,
    /// Key count from the most recent marker; the agent restarts it each session
    pub last_keycount: Option<u64>,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

impl SessionLog {
    pub fn record(&mut self, tag: &MetaTag) {
        match tag {
            MetaTag::SessionBegin => self.sessions_begun += 1,
            MetaTag::SessionEnd => self.sessions_ended += 1,
            MetaTag::KeyCount {
                count, timestamp, ..
            } => {
                self.keycount_markers += 1;
                if let Some(count) = *count {
                    self.last_keycount = Some(count);
                }
                if let Some(ts) = *timestamp {
                    self.first_timestamp = Some(self.first_timestamp.map_or(ts, |f| f.min(ts)));
                    self.last_timestamp = Some(self.last_timestamp.map_or(ts, |l| l.max(ts)));
                }
            }
        }
    }

    /// Number of markers recorded
    pub fn total(&self) -> u64 {
        self.sessions_begun + self.sessions_ended + self.keycount_markers
    }
}
