use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Url;
use tracing::debug;

use crate::models::{DisplayEvent, EventStatus, WireEvent};

pub const DATE_TBA: &str = "Date TBA";
pub const LOCATION_TBA: &str = "Location TBA";
pub const DEFAULT_CATEGORY: &str = "General";
pub const UNTITLED: &str = "Untitled Event";
pub const IMPORTED_BY: &str = "Admin";

/// Rendered form of a start time, e.g. `Oct 12, 2024 • 7:00 PM`.
pub const DISPLAY_DATE_FORMAT: &str = "%b %-d, %Y • %-I:%M %p";

const VENUE_PLACEHOLDER: &str = "TBA";
const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/600/400";

pub fn transform(wire: &WireEvent) -> DisplayEvent {
    let imported = wire.is_approved;

    DisplayEvent {
        id: wire.id.clone(),
        title: non_blank(&wire.title).unwrap_or(UNTITLED).to_string(),
        date: format_start(
            wire.date_time_start.as_deref(),
            wire.date_time_timezone.as_deref(),
        ),
        location: build_location(
            wire.venue_name.as_deref(),
            wire.venue_address.as_deref(),
            wire.city.as_deref(),
        ),
        category: non_blank(&wire.category)
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        image: resolve_image(
            wire.image_url.as_deref(),
            wire.poster_url.as_deref(),
            &wire.id,
        ),
        tags: Vec::new(),
        status: wire.status.filter(|status| *status != EventStatus::Unknown),
        imported_at: if imported {
            non_blank(&wire.updated_at)
                .or_else(|| non_blank(&wire.created_at))
                .map(str::to_string)
        } else {
            None
        },
        imported_by: imported.then(|| IMPORTED_BY.to_string()),
        description: non_blank(&wire.description)
            .or_else(|| non_blank(&wire.summary))
            .map(str::to_string),
        source_url: non_blank(&wire.original_url).map(str::to_string),
    }
}

pub fn transform_all(wire_events: &[WireEvent]) -> Vec<DisplayEvent> {
    wire_events.iter().map(transform).collect()
}

/// Formats a start timestamp in the event's zone. Blank zones render in UTC;
/// anything unparseable yields [`DATE_TBA`].
pub fn format_start(start: Option<&str>, timezone: Option<&str>) -> String {
    let Some(instant) = start.and_then(parse_instant) else {
        debug!(start = ?start, "start time missing or malformed");
        return DATE_TBA.to_string();
    };

    match timezone.map(str::trim).filter(|tz| !tz.is_empty()) {
        None => instant.format(DISPLAY_DATE_FORMAT).to_string(),
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => instant
                .with_timezone(&tz)
                .format(DISPLAY_DATE_FORMAT)
                .to_string(),
            Err(_) => {
                debug!(timezone = name, "unknown timezone");
                DATE_TBA.to_string()
            }
        },
    }
}

pub fn build_location(name: Option<&str>, address: Option<&str>, city: Option<&str>) -> String {
    let name = name
        .map(str::trim)
        .filter(|value| *value != VENUE_PLACEHOLDER);
    let parts: Vec<&str> = [name, address.map(str::trim), city.map(str::trim)]
        .into_iter()
        .flatten()
        .filter(|value| !value.is_empty())
        .collect();

    if parts.is_empty() {
        LOCATION_TBA.to_string()
    } else {
        parts.join(", ")
    }
}

pub fn resolve_image(image: Option<&str>, poster: Option<&str>, id: &str) -> String {
    [image, poster]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder_image(id))
}

fn placeholder_image(id: &str) -> String {
    Url::parse_with_params(PLACEHOLDER_IMAGE, [("random", id)])
        .map(String::from)
        .unwrap_or_else(|_| format!("{PLACEHOLDER_IMAGE}?random={id}"))
}

fn parse_instant(input: &str) -> Option<DateTime<Utc>> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned)
        .or_else(|_| DateTime::parse_from_rfc2822(cleaned))
    {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"].iter() {
        if let Ok(dt) = DateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"].iter() {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
