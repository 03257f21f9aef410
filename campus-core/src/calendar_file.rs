//! Downloadable single-event calendar files.
//!
//! Each created event is written as `<uuid>.ics` into one storage directory.
//! There is no index: a file exists if it is in the directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{CampusError, CampusResult};
use crate::ics::generate_ics;

/// File extension of generated calendar files.
pub const ICS_EXTENSION: &str = "ics";

/// Route prefix under which stored files are served.
pub const DOWNLOAD_PREFIX: &str = "/calendar";

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Start or end of a created event, kept in the form the client sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTime {
    /// An instant; offsets are normalised to UTC.
    DateTimeUtc(DateTime<Utc>),
    /// Wall-clock time with no zone, interpreted by the calendar app.
    DateTimeFloating(NaiveDateTime),
    /// All-day.
    Date(NaiveDate),
}

impl EventTime {
    /// Parse an ISO 8601 timestamp: RFC 3339, zone-less date-time, or a bare date.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(EventTime::DateTimeUtc(dt.with_timezone(&Utc)));
        }

        if let Some(naive) = value.strip_suffix(['Z', 'z']).and_then(parse_naive_datetime) {
            return Some(EventTime::DateTimeUtc(naive.and_utc()));
        }

        if let Some(naive) = parse_naive_datetime(value) {
            return Some(EventTime::DateTimeFloating(naive));
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(EventTime::Date)
    }

    /// Naive position on the timeline, used to order start against end.
    fn ordering_key(&self) -> NaiveDateTime {
        match self {
            EventTime::DateTimeUtc(dt) => dt.naive_utc(),
            EventTime::DateTimeFloating(dt) => *dt,
            EventTime::Date(d) => d.and_time(chrono::NaiveTime::MIN),
        }
    }
}

fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Fields of a calendar-create request. All are optional on the wire so that
/// missing values surface as validation errors rather than decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCalendarFile {
    pub title: Option<String>,
    pub begin: Option<String>,
    pub end: Option<String>,
    pub location: Option<String>,
}

/// A validated event ready to be written.
#[derive(Debug, Clone)]
pub struct CalendarFile {
    pub id: Uuid,
    pub title: String,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    pub created: DateTime<Utc>,
}

impl CalendarFile {
    /// Validate a create request, assigning a fresh id.
    pub fn from_request(request: &NewCalendarFile) -> CampusResult<Self> {
        let title = required(&request.title, "title")?;
        let begin = required(&request.begin, "begin")?;
        let end = required(&request.end, "end")?;

        let start = EventTime::parse(begin).ok_or_else(|| invalid_time("begin", begin))?;
        let end_time = EventTime::parse(end).ok_or_else(|| invalid_time("end", end))?;

        if end_time.ordering_key() < start.ordering_key() {
            return Err(CampusError::Validation(
                "end must not be before begin".into(),
            ));
        }

        let location = request
            .location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string);

        Ok(CalendarFile {
            id: Uuid::new_v4(),
            title: title.to_string(),
            start,
            end: end_time,
            location,
            created: Utc::now(),
        })
    }

    pub fn filename(&self) -> String {
        format!("{}.{}", self.id.simple(), ICS_EXTENSION)
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> CampusResult<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CampusError::Validation(format!("Missing required field: {field}")))
}

fn invalid_time(field: &str, value: &str) -> CampusError {
    CampusError::Validation(format!(
        "Invalid {field} '{value}'. Expected an ISO 8601 date or date-time"
    ))
}

/// Reference to a stored calendar file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileHandle {
    pub id: Uuid,
    pub filename: String,
}

impl FileHandle {
    /// Download path relative to the server root.
    pub fn url(&self) -> String {
        format!("{}/{}", DOWNLOAD_PREFIX, self.filename)
    }
}

/// Filesystem-backed calendar file storage.
#[derive(Debug, Clone)]
pub struct CalendarFileStore {
    dir: PathBuf,
}

impl CalendarFileStore {
    /// Open storage rooted at `dir`, creating the directory if necessary.
    pub fn new(dir: impl Into<PathBuf>) -> CampusResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate the request and write a single-event calendar file.
    ///
    /// Nothing is written when validation fails.
    pub async fn build(&self, request: &NewCalendarFile) -> CampusResult<FileHandle> {
        let file = CalendarFile::from_request(request)?;
        let filename = file.filename();
        let contents = generate_ics(&file);

        tokio::fs::write(self.dir.join(&filename), contents).await?;

        tracing::info!(%filename, title = %file.title, "created calendar file");

        Ok(FileHandle {
            id: file.id,
            filename,
        })
    }

    /// Read a stored calendar file by name.
    ///
    /// Names that could escape the storage directory are reported as not found.
    pub async fn read(&self, filename: &str) -> CampusResult<Vec<u8>> {
        let path = self
            .resolve(filename)
            .ok_or_else(|| CampusError::NotFound(filename.to_string()))?;

        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CampusError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let path = Path::new(filename);

        let is_plain_name = path.file_name().and_then(|n| n.to_str()) == Some(filename)
            && !filename.starts_with('.')
            && !filename.contains(['/', '\\']);
        let has_extension = path.extension().and_then(|e| e.to_str()) == Some(ICS_EXTENSION);

        (is_plain_name && has_extension).then(|| self.dir.join(filename))
    }
}
