//! ICS parsing and generation.
//!
//! Feeds are read with the icalendar crate's parser; calendar files are
//! written with its builder, both according to RFC 5545.

mod generate;
mod parse;

pub use generate::generate_ics;
pub use parse::parse_and_filter;
