use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

const OFFSET_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M%z",
];

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Renders an ISO-8601 timestamp as `YYYY-MM-DD HH:MM` in the offset it was
/// written in. Anything that does not parse is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|parsed| parsed.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_local());
    }
    // RFC 3339 requires seconds and a colon in the offset; ISO-8601 needs neither.
    if let Some(parsed) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    {
        return Some(parsed.naive_local());
    }
    if let Some(without_zulu) = trimmed.strip_suffix('Z') {
        if let Some(parsed) = parse_naive(without_zulu) {
            return Some(parsed);
        }
    }
    if let Some(parsed) = parse_naive(trimmed) {
        return Some(parsed);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_naive(raw: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
