//! Core library for the campus assistant.
//!
//! - `feed` and `cache`: upcoming events from the campus iCalendar feed
//! - `sources`: dining and tuition-cost lookups
//! - `router`: keyword routing of chat messages to the lookups above
//! - `calendar_file`: generated single-event `.ics` downloads
//! - `transcribe`: speech-to-text for uploaded audio

pub mod cache;
pub mod calendar_file;
pub mod config;
pub mod error;
pub mod event;
pub mod feed;
pub mod fetch;
pub mod ics;
pub mod router;
pub mod sources;
pub mod transcribe;

pub use error::{CampusError, CampusResult};
pub use event::{CalendarEvent, EventQueryResult};
