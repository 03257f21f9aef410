//! Event types shared by the feed, the cache and the chat router.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Display format for event start times in chat payloads.
pub const BEGIN_FORMAT: &str = "%Y-%m-%d %H:%M";

/// An upcoming event read from the campus feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub title: String,
    #[serde(rename = "begin", serialize_with = "serialize_begin")]
    pub start: DateTime<Utc>,
    pub location: Option<String>,
}

/// Upcoming events, ascending by start and bounded by the requested limit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventQueryResult {
    pub events: Vec<CalendarEvent>,
}

impl EventQueryResult {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn serialize_begin<S>(start: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&start.format(BEGIN_FORMAT))
}
