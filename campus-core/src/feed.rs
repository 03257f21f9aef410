//! Upcoming campus events: fetch the feed, filter it, cache the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::cache::EventCache;
use crate::error::CampusResult;
use crate::event::EventQueryResult;
use crate::fetch::Fetch;
use crate::ics::parse_and_filter;

pub struct EventFeed {
    fetcher: Arc<dyn Fetch>,
    cache: EventCache,
    source: String,
    limit: usize,
}

impl EventFeed {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        source: impl Into<String>,
        limit: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache: EventCache::new(ttl),
            source: source.into(),
            limit,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn cache(&self) -> &EventCache {
        &self.cache
    }

    /// Upcoming events from the configured feed.
    pub async fn upcoming(&self) -> CampusResult<Arc<EventQueryResult>> {
        self.events(&self.source, self.limit).await
    }

    /// Upcoming events from `source`, at most `limit` of them.
    ///
    /// The cache has one slot shared by every source and limit, so a fresh
    /// entry for another configuration is returned as-is.
    pub async fn events(&self, source: &str, limit: usize) -> CampusResult<Arc<EventQueryResult>> {
        self.cache
            .get_or_fetch(|| self.fetch_upcoming(source, limit))
            .await
    }

    async fn fetch_upcoming(&self, source: &str, limit: usize) -> CampusResult<EventQueryResult> {
        let raw = self.fetcher.fetch(source).await?;
        let result = parse_and_filter(&raw, Utc::now(), limit)?;
        tracing::info!(%source, events = result.len(), "refreshed event feed");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CampusError;
    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(60);

    /// Serves queued responses in order and records requested URLs.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: Mutex<Vec<CampusResult<Bytes>>>,
        urls: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<CampusResult<Bytes>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                ..Default::default()
            })
        }
    }

    #[async_trait]
    impl Fetch for ScriptedFetcher {
        async fn fetch(&self, url: &str) -> CampusResult<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .expect("unexpected fetch")
        }
    }

    fn feed_with(titles_and_offsets: &[(&str, i64)]) -> CampusResult<Bytes> {
        let now = Utc::now();
        let events: String = titles_and_offsets
            .iter()
            .map(|(title, hours)| {
                let start = (now + ChronoDuration::hours(*hours)).format("%Y%m%dT%H%M%SZ");
                format!("BEGIN:VEVENT\r\nUID:{title}\r\nSUMMARY:{title}\r\nDTSTART:{start}\r\nEND:VEVENT\r\n")
            })
            .collect();
        Ok(Bytes::from(format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n{events}END:VCALENDAR\r\n"
        )))
    }

    #[tokio::test]
    async fn test_upcoming_filters_and_limits() {
        let fetcher = ScriptedFetcher::new(vec![feed_with(&[
            ("past", -1),
            ("soon", 1),
            ("later", 3),
            ("much later", 48),
        ])]);
        let feed = EventFeed::new(fetcher.clone(), "http://feed/calendar.ics", 2, TTL);

        let result = feed.upcoming().await.unwrap();

        let titles: Vec<_> = result.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["soon", "later"]);
        assert_eq!(*fetcher.urls.lock().unwrap(), vec!["http://feed/calendar.ics"]);
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_uses_cache() {
        let fetcher = ScriptedFetcher::new(vec![feed_with(&[("soon", 1)])]);
        let feed = EventFeed::new(fetcher.clone(), "http://feed/calendar.ics", 10, TTL);

        let first = feed.upcoming().await.unwrap();
        let second = feed.upcoming().await.unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_cache_slot_ignores_source_and_limit() {
        let fetcher = ScriptedFetcher::new(vec![feed_with(&[("a", 1), ("b", 2), ("c", 3)])]);
        let feed = EventFeed::new(fetcher.clone(), "http://feed/one.ics", 3, TTL);

        feed.upcoming().await.unwrap();
        let other = feed.events("http://feed/two.ics", 1).await.unwrap();

        // Served from the first configuration's slot
        assert_eq!(other.len(), 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fetch_and_parse_errors_propagate() {
        let fetcher = ScriptedFetcher::new(vec![
            Err(CampusError::UpstreamStatus {
                url: "http://feed/calendar.ics".into(),
                status: 500,
            }),
            Ok(Bytes::from_static(b"<html>oops</html>")),
        ]);
        let feed = EventFeed::new(fetcher.clone(), "http://feed/calendar.ics", 10, TTL);

        let err = feed.upcoming().await.unwrap_err();
        assert!(err.is_upstream());

        let err = feed.upcoming().await.unwrap_err();
        assert!(matches!(err, CampusError::Parse(_)));

        assert!(feed.cache().cached().is_none());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
