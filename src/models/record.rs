use chrono::{DateTime, Local, SecondsFormat, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Length of the random part appended to every generated id.
const ID_SUFFIX_LEN: usize = 9;

/// A captured link, the only entity the stores persist.
///
/// The serialized shape (`id`, `name`, `url`, `timestamp`) is shared by the
/// local slot and the remote wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,        // ⇔ "<unix millis>-<base36 suffix>", never reused
    pub name: String,      // ⇔ page heading or fallback label
    pub url: String,       // ⇔ dedup key, not unique at the storage level
    pub timestamp: String, // ⇔ ISO-8601, UTC, millisecond precision
}

impl Record {
    /// Build a record captured at `now`, generating a fresh id.
    pub fn captured_at(name: impl Into<String>, url: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: generate_id(now),
            name: name.into(),
            url: url.into(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Build a record captured right now.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::captured_at(name, url, Utc::now())
    }

    pub fn captured_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Timestamp in local time, as shown in tables and CSV exports.
    /// Falls back to the raw string when it cannot be parsed.
    pub fn display_timestamp(&self) -> String {
        self.captured_instant()
            .map(|dt| {
                dt.with_timezone(&Local)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string()
            })
            .unwrap_or_else(|| self.timestamp.clone())
    }

    /// A record is storable only with a non-empty id and url.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.url.trim().is_empty()
    }
}

/// `<unix millis>-<9 lowercase base36 chars>`
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("{}-{}", now.timestamp_millis(), suffix)
}

/// Newest first. Records whose timestamp does not parse go last.
pub fn newest_first(a: &Record, b: &Record) -> Ordering {
    match (a.captured_instant(), b.captured_instant()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.timestamp.cmp(&a.timestamp),
    }
}

/// Sort a snapshot in display order.
pub fn sort_for_display(records: &mut [Record]) {
    records.sort_by(newest_first);
}
