use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::models::DisplayEvent;
use crate::transform::DISPLAY_DATE_FORMAT;

/// Search state from the marketplace and admin filter bars.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventQuery {
    pub keyword: String,
    pub city: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

impl EventQuery {
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    /// Both bounds are inclusive of the whole day.
    pub fn between(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_start = start;
        self.date_end = end;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.trim().is_empty()
            && self.city.trim().is_empty()
            && self.date_start.is_none()
            && self.date_end.is_none()
    }
}

/// Parses a `YYYY-MM-DD` bound. Blank or malformed input means "no bound".
pub fn parse_query_date(input: &str) -> Option<NaiveDate> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(cleaned, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(err) => {
            warn!(input = cleaned, %err, "ignoring malformed date bound");
            None
        }
    }
}

/// Reads a display date such as `Oct 12, 2024 • 7:00 PM` back into a
/// comparable wall-clock time.
pub fn parse_display_date(date: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(date.trim(), DISPLAY_DATE_FORMAT).ok()
}

pub fn filter(events: &[DisplayEvent], query: &EventQuery) -> Vec<DisplayEvent> {
    let keyword = query.keyword.trim().to_lowercase();
    let city = query.city.trim().to_lowercase();

    events
        .iter()
        .filter(|event| matches_keyword(event, &keyword))
        .filter(|event| city.is_empty() || event.location.to_lowercase().contains(&city))
        .filter(|event| matches_dates(event, query.date_start, query.date_end))
        .cloned()
        .collect()
}

/// Distinct leading location segments in first-seen order, for the city picker.
pub fn city_options(events: &[DisplayEvent]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for event in events {
        let head = event.location.split(',').next().unwrap_or_default().trim();
        if head.is_empty() || out.iter().any(|existing| existing == head) {
            continue;
        }
        out.push(head.to_string());
    }
    out
}

fn matches_keyword(event: &DisplayEvent, keyword: &str) -> bool {
    keyword.is_empty()
        || event.title.to_lowercase().contains(keyword)
        || event.category.to_lowercase().contains(keyword)
}

// Records whose date cannot be read pass the range check so bad backend data
// stays visible to the curator.
fn matches_dates(event: &DisplayEvent, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(when) = parse_display_date(&event.date) else {
        warn!(event_id = %event.id, date = %event.date, "unparseable event date, keeping in results");
        return true;
    };
    let day = when.date();
    start.map_or(true, |start| day >= start) && end.map_or(true, |end| day <= end)
}
