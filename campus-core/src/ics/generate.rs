//! ICS generation for single-event calendar files.

use icalendar::{Calendar, Component, EventLike, Property, ValueType};

use crate::calendar_file::{CalendarFile, EventTime};

const PRODID: &str = "PRODID:-//Campus Assistant//Calendar Export//EN";

/// Generate a VCALENDAR holding exactly one VEVENT.
pub fn generate_ics(file: &CalendarFile) -> String {
    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&format!("{}@campus-assistant", file.id.simple()));
    ics_event.summary(&file.title);

    let dtstamp = file.created.format("%Y%m%dT%H%M%SZ").to_string();
    ics_event.add_property("DTSTAMP", &dtstamp);

    add_datetime_property(&mut ics_event, "DTSTART", &file.start);
    add_datetime_property(&mut ics_event, "DTEND", &file.end);

    if let Some(ref location) = file.location {
        ics_event.location(location);
    }

    let mut cal = Calendar::new();
    cal.push(ics_event.done());
    let cal = cal.done();

    strip_ics_bloat(&cal.to_string())
}

/// Clean up output from the icalendar crate
/// - Replace the crate's PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn add_datetime_property(ics_event: &mut icalendar::Event, name: &str, time: &EventTime) {
    match time {
        EventTime::Date(d) => {
            let mut prop = Property::new(name, d.format("%Y%m%d").to_string());
            prop.append_parameter(ValueType::Date);
            ics_event.append_property(prop);
        }
        EventTime::DateTimeUtc(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%SZ").to_string());
        }
        EventTime::DateTimeFloating(dt) => {
            ics_event.add_property(name, dt.format("%Y%m%dT%H%M%S").to_string());
        }
    }
}
