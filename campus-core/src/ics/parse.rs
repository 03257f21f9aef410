//! Feed parsing using the icalendar crate's parser.

use chrono::{DateTime, TimeZone, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::{CampusError, CampusResult};
use crate::event::{CalendarEvent, EventQueryResult};

const UNTITLED: &str = "(No title)";

/// Parse a raw feed and keep the first `limit` events starting at or after `now`.
///
/// Events are ordered by start time; events sharing a start keep their feed order.
/// Events without a usable DTSTART are skipped.
pub fn parse_and_filter(
    raw: &[u8],
    now: DateTime<Utc>,
    limit: usize,
) -> CampusResult<EventQueryResult> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| CampusError::Parse(format!("feed is not valid UTF-8: {e}")))?;

    let text = text.trim_start_matches('\u{feff}').trim_start();
    if !starts_with_ignore_case(text, "BEGIN:VCALENDAR") {
        return Err(CampusError::Parse(
            "feed does not start with BEGIN:VCALENDAR".into(),
        ));
    }

    let unfolded = unfold(text);
    let calendar = read_calendar(&unfolded).map_err(|e| CampusError::Parse(e.to_string()))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    let total = vevents.len();
    let mut upcoming: Vec<CalendarEvent> = vevents
        .into_iter()
        .filter_map(to_calendar_event)
        .filter(|event| event.start >= now)
        .collect();

    // Vec::sort_by_key is stable, so equal starts keep feed order
    upcoming.sort_by_key(|event| event.start);
    upcoming.truncate(limit);

    tracing::debug!(
        total,
        kept = upcoming.len(),
        limit,
        "parsed event feed"
    );

    Ok(EventQueryResult { events: upcoming })
}

/// Gather VEVENTs, descending into VCALENDARs when a feed concatenates several.
fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else if component.name == "VCALENDAR" {
            collect_vevents(&component.components, out);
        }
    }
}

fn to_calendar_event(vevent: &Component<'_>) -> Option<CalendarEvent> {
    let dtstart = vevent.find_prop("DTSTART")?;
    let start = effective_start(DatePerhapsTime::try_from(dtstart).ok()?)?;

    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let location = vevent
        .find_prop("LOCATION")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|l| !l.trim().is_empty());

    Some(CalendarEvent {
        title,
        start,
        location,
    })
}

/// Resolve a DTSTART value to an instant.
///
/// Floating times and unknown TZIDs are read as UTC; all-day dates start at midnight UTC.
fn effective_start(dpt: DatePerhapsTime) -> Option<DateTime<Utc>> {
    match dpt {
        DatePerhapsTime::Date(date) => date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => Some(dt),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => Some(naive.and_utc()),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<chrono_tz::Tz>() {
                // A wall time skipped by a DST jump is moved past the gap
                Ok(tz) => tz
                    .from_local_datetime(&date_time)
                    .earliest()
                    .or_else(|| {
                        tz.from_local_datetime(&(date_time + chrono::Duration::hours(1)))
                            .earliest()
                    })
                    .map(|dt| dt.with_timezone(&Utc)),
                Err(_) => {
                    tracing::debug!(%tzid, "unknown TZID, reading start as UTC");
                    Some(date_time.and_utc())
                }
            }
        }
    }
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
