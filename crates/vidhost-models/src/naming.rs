//! Stored-name conventions.
//!
//! Uploaded videos are stored as `video_<epoch-millis>_<sanitized name>`.
//! Listing reverses that convention to recover a human-readable title.

use chrono::{DateTime, Utc};

/// File suffixes recognized as videos (compared case-insensitively).
pub const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mov", ".avi", ".mkv", ".webm"];

/// Literal token that starts every generated stored name.
pub const STORED_NAME_PREFIX: &str = "video_";

/// Check whether a stored name carries a recognized video extension.
pub fn is_video_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Derive a display title from a stored name.
///
/// Strips the extension, then the `video_<digits>_` upload prefix, then
/// turns `_` and `-` into spaces. Deterministic for a given input.
pub fn display_title(stored_name: &str) -> String {
    let without_ext = match stored_name.rfind('.') {
        Some(idx) => &stored_name[..idx],
        None => stored_name,
    };
    let base = strip_upload_prefix(without_ext);

    let title: String = base
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect();

    if title.trim().is_empty() {
        stored_name.to_string()
    } else {
        title
    }
}

/// Remove a leading `video_<digits>_` token, if present.
fn strip_upload_prefix(name: &str) -> &str {
    let Some(rest) = name.strip_prefix(STORED_NAME_PREFIX) else {
        return name;
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return name;
    }

    match rest[digits..].strip_prefix('_') {
        Some(remainder) => remainder,
        None => name,
    }
}

/// Replace anything outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches('_').is_empty() {
        "upload".to_string()
    } else {
        sanitized
    }
}

/// Build the stored name for an upload received at `uploaded_at_ms`.
pub fn stored_name_for(original_name: &str, uploaded_at_ms: i64) -> String {
    format!(
        "{}{}_{}",
        STORED_NAME_PREFIX,
        uploaded_at_ms,
        sanitize_file_name(original_name)
    )
}

/// UTC calendar date (`YYYY-MM-DD`) of an epoch-millisecond timestamp.
pub fn upload_date_label(upload_timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(upload_timestamp_ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
