//! Keyword routing for chat queries.
//!
//! A placeholder for real intent classification: the lower-cased message is
//! checked for substrings, in this order, and the first class that matches wins:
//!
//! 1. events: `event`, `happening`
//! 2. dining: `dining`, `menu`
//! 3. cost: `tuition`, `average cost`, `cost`
//!
//! Anything else gets a fixed placeholder answer.

use serde::Serialize;

use crate::error::CampusResult;
use crate::feed::EventFeed;
use crate::sources::CampusSources;

const EVENT_TERMS: &[&str] = &["event", "happening"];
const DINING_TERMS: &[&str] = &["dining", "menu"];
const COST_TERMS: &[&str] = &["tuition", "average cost", "cost"];

pub const DEFAULT_ANSWER: &str =
    "RAG answer placeholder. Try asking about events, dining, or cost.";

/// Served on the events route when the feed cannot be fetched or parsed.
pub const EVENTS_FALLBACK: &str =
    r#"{"events":[],"notice":"Campus events are unavailable right now. Please try again later."}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryRoute {
    Events,
    Dining,
    Cost,
    Answer,
}

impl QueryRoute {
    pub fn classify(message: &str) -> Self {
        let text = message.to_lowercase();
        let mentions = |terms: &[&str]| terms.iter().any(|term| text.contains(term));

        if mentions(EVENT_TERMS) {
            QueryRoute::Events
        } else if mentions(DINING_TERMS) {
            QueryRoute::Dining
        } else if mentions(COST_TERMS) {
            QueryRoute::Cost
        } else {
            QueryRoute::Answer
        }
    }

    /// Name reported back to the client.
    pub fn label(self) -> &'static str {
        match self {
            QueryRoute::Events => "events",
            QueryRoute::Dining => "dining",
            QueryRoute::Cost => "avg_cost",
            QueryRoute::Answer => "answer",
        }
    }
}

/// Routed answer. `content` is a JSON document for data routes, plain text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub name: String,
    pub content: String,
}

pub struct Assistant {
    events: EventFeed,
    sources: CampusSources,
}

impl Assistant {
    pub fn new(events: EventFeed, sources: CampusSources) -> Self {
        Self { events, sources }
    }

    pub fn events(&self) -> &EventFeed {
        &self.events
    }

    /// Answer one message.
    ///
    /// The events route never fails: feed errors are logged and replaced by
    /// [`EVENTS_FALLBACK`]. The cost route propagates upstream errors.
    pub async fn route(&self, message: &str) -> CampusResult<Reply> {
        let route = QueryRoute::classify(message);
        tracing::debug!(route = route.label(), "routing chat message");

        let content = match route {
            QueryRoute::Events => match self.events.upcoming().await {
                Ok(result) => serde_json::to_string(result.as_ref())?,
                Err(e) => {
                    tracing::warn!(error = %e, source = %self.events.source(), "event feed unavailable, serving fallback");
                    EVENTS_FALLBACK.to_string()
                }
            },
            QueryRoute::Dining => serde_json::to_string(&self.sources.dining_today())?,
            QueryRoute::Cost => serde_json::to_string(&self.sources.average_cost().await?)?,
            QueryRoute::Answer => DEFAULT_ANSWER.to_string(),
        };

        Ok(Reply {
            name: route.label().to_string(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampusError;
    use crate::fetch::Fetch;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FEED_URL: &str = "http://feed.test/calendar.ics";
    const COST_URL: &str = "http://campus.test/cost";

    /// Answers the feed URL and the cost URL, or fails everything.
    struct FakeCampus {
        healthy: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetch for FakeCampus {
        async fn fetch(&self, url: &str) -> CampusResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.healthy {
                return Err(CampusError::UpstreamFetch {
                    url: url.to_string(),
                    message: "connection refused".into(),
                });
            }
            match url {
                FEED_URL => {
                    let start = (Utc::now() + Duration::hours(2)).format("%Y%m%dT%H%M%SZ");
                    Ok(Bytes::from(format!(
                        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nBEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Maverick Speaker Series\r\nLOCATION:Texas Hall\r\nDTSTART:{start}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
                    )))
                }
                COST_URL => Ok(Bytes::from_static(b"<html>cost</html>")),
                other => panic!("unexpected url {other}"),
            }
        }
    }

    fn assistant(healthy: bool) -> (Assistant, Arc<FakeCampus>) {
        let fake = Arc::new(FakeCampus {
            healthy,
            calls: AtomicUsize::new(0),
        });
        let events = EventFeed::new(fake.clone(), FEED_URL, 10, std::time::Duration::from_secs(60));
        let sources = CampusSources::new(fake.clone(), "http://dining.test", COST_URL);
        (Assistant::new(events, sources), fake)
    }

    #[test]
    fn test_classify_each_keyword_class() {
        assert_eq!(QueryRoute::classify("Any events this week?"), QueryRoute::Events);
        assert_eq!(QueryRoute::classify("What's HAPPENING tonight"), QueryRoute::Events);
        assert_eq!(QueryRoute::classify("dining hall hours"), QueryRoute::Dining);
        assert_eq!(QueryRoute::classify("Show me the menu"), QueryRoute::Dining);
        assert_eq!(QueryRoute::classify("How much is tuition?"), QueryRoute::Cost);
        assert_eq!(QueryRoute::classify("average cost of attendance"), QueryRoute::Cost);
        assert_eq!(QueryRoute::classify("what does parking cost"), QueryRoute::Cost);
        assert_eq!(QueryRoute::classify("Where is the library?"), QueryRoute::Answer);
        assert_eq!(QueryRoute::classify(""), QueryRoute::Answer);
    }

    #[test]
    fn test_classify_precedence_when_combined() {
        // Events beat dining and cost regardless of word order
        assert_eq!(QueryRoute::classify("dining events"), QueryRoute::Events);
        assert_eq!(QueryRoute::classify("menu for the event"), QueryRoute::Events);
        assert_eq!(QueryRoute::classify("tuition event"), QueryRoute::Events);
        // Dining beats cost
        assert_eq!(QueryRoute::classify("cost of the dining plan"), QueryRoute::Dining);
        assert_eq!(QueryRoute::classify("menu prices and tuition"), QueryRoute::Dining);
    }

    #[test]
    fn test_labels() {
        assert_eq!(QueryRoute::Events.label(), "events");
        assert_eq!(QueryRoute::Dining.label(), "dining");
        assert_eq!(QueryRoute::Cost.label(), "avg_cost");
        assert_eq!(QueryRoute::Answer.label(), "answer");
    }

    #[tokio::test]
    async fn test_events_route_returns_feed_payload() {
        let (assistant, _) = assistant(true);

        let reply = assistant.route("any events?").await.unwrap();

        assert_eq!(reply.name, "events");
        let payload: serde_json::Value = serde_json::from_str(&reply.content).unwrap();
        assert_eq!(payload["events"][0]["title"], "Maverick Speaker Series");
        assert_eq!(payload["events"][0]["location"], "Texas Hall");
    }

    #[tokio::test]
    async fn test_events_route_falls_back_on_failure() {
        let (assistant, fake) = assistant(false);

        let reply = assistant.route("what's happening").await.unwrap();

        assert_eq!(reply.name, "events");
        assert_eq!(reply.content, EVENTS_FALLBACK);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dining_route_needs_no_network() {
        let (assistant, fake) = assistant(false);

        let reply = assistant.route("dining options").await.unwrap();

        assert_eq!(reply.name, "dining");
        let payload: serde_json::Value = serde_json::from_str(&reply.content).unwrap();
        assert_eq!(payload["source"], "http://dining.test");
        assert_eq!(payload["venues"].as_array().unwrap().len(), 2);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cost_route_reports_page_length() {
        let (assistant, _) = assistant(true);

        let reply = assistant.route("tuition?").await.unwrap();

        assert_eq!(reply.name, "avg_cost");
        let payload: serde_json::Value = serde_json::from_str(&reply.content).unwrap();
        assert_eq!(payload["source"], COST_URL);
        assert_eq!(payload["html_length"], 17);
    }

    #[tokio::test]
    async fn test_cost_route_propagates_failure() {
        let (assistant, _) = assistant(false);

        let err = assistant.route("average cost").await.unwrap_err();

        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_unmatched_message_gets_placeholder() {
        let (assistant, fake) = assistant(true);

        let reply = assistant.route("hello").await.unwrap();

        assert_eq!(
            reply,
            Reply {
                name: "answer".to_string(),
                content: DEFAULT_ANSWER.to_string(),
            }
        );
        assert_eq!(fake.calls.load(Ordering::SeqCst), 0);
    }
}
