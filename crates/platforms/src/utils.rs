use chrono::{DateTime, NaiveDateTime};

const KNOWN_EXTENSIONS: &[&str] = &[
    "mp4", "m4a", "m4v", "flv", "webm", "mp3", "aac", "ts", "m3u8", "mpd", "f4m", "smil", "ism",
];

/// Guesses the file extension of `url` from the last path component.
///
/// Query and fragment are ignored. Returns `None` when nothing that looks like
/// an extension is found.
pub fn determine_ext(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let (_, guess) = path.rsplit_once('.')?;

    if !guess.is_empty() && guess.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Some(guess.to_string());
    }

    let trimmed = guess.trim_end_matches('/');
    KNOWN_EXTENSIONS
        .contains(&trimmed)
        .then(|| trimmed.to_string())
}

/// Parses an ISO 8601 date time into epoch seconds.
///
/// Accepts RFC 3339 as well as a space separator, missing timezone (taken as
/// UTC), `+HHMM` offsets and a space before the offset. Anything else yields
/// `None`.
pub fn parse_iso8601(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let value = join_offset(value);
    if let Ok(dt) = DateTime::parse_from_rfc3339(&value) {
        return Some(dt.timestamp());
    }

    let normalized = value.replacen(' ', "T", 1);
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.timestamp());
        }
    }

    let naive = normalized.strip_suffix('Z').unwrap_or(&normalized);
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Drops a single space in front of a trailing `±HH:MM` or `±HHMM` offset.
fn join_offset(value: &str) -> String {
    if let Some((head, offset)) = value.rsplit_once(' ') {
        let digits = offset.get(1..).unwrap_or_default().replacen(':', "", 1);
        if offset.starts_with(['+', '-'])
            && digits.len() == 4
            && digits.chars().all(|c| c.is_ascii_digit())
        {
            return format!("{head}{offset}");
        }
    }
    value.to_string()
}
