use std::sync::Arc;

use campus_core::CampusResult;
use campus_core::calendar_file::CalendarFileStore;
use campus_core::config::Settings;
use campus_core::feed::EventFeed;
use campus_core::fetch::{Fetch, HttpFetcher};
use campus_core::router::Assistant;
use campus_core::sources::CampusSources;
use campus_core::transcribe::{Transcriber, WhisperClient};

/// Shared application state
///
/// Built once at startup. The HTTP client and the event cache live here and
/// are dropped when the server shuts down.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub calendar_files: CalendarFileStore,
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    pub fn new(
        assistant: Assistant,
        calendar_files: CalendarFileStore,
        transcriber: Arc<dyn Transcriber>,
    ) -> Self {
        AppState {
            assistant: Arc::new(assistant),
            calendar_files,
            transcriber,
        }
    }

    pub fn from_settings(settings: &Settings) -> CampusResult<Self> {
        let http = HttpFetcher::new(settings.http_timeout)?;
        let fetcher: Arc<dyn Fetch> = Arc::new(http.clone());

        let events = EventFeed::new(
            Arc::clone(&fetcher),
            &settings.events_ics_url,
            settings.event_limit,
            settings.event_cache_ttl,
        );
        let sources = CampusSources::new(
            fetcher,
            &settings.dining_base_url,
            &settings.avg_cost_url,
        );

        let transcriber = WhisperClient::new(
            http.client().clone(),
            &settings.transcription_url,
            &settings.transcription_model,
            settings.openai_api_key.clone(),
        );

        let calendar_files = CalendarFileStore::new(settings.ics_dir())?;

        Ok(AppState::new(
            Assistant::new(events, sources),
            calendar_files,
            Arc::new(transcriber),
        ))
    }
}
