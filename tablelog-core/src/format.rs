//! Formatting helpers shared across shells.

use chrono::DateTime;

/// Format an epoch-millisecond list date as `YYYY-MM-DD` (UTC), or `-` if unset.
pub fn format_date(epoch_ms: i64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// First `max_chars` characters of `input` on one line, with `…` if cut.
pub fn preview(input: &str, max_chars: usize) -> String {
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let cut = flat
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| &flat[..idx])
        .unwrap_or(&flat);
    format!("{}…", cut)
}
