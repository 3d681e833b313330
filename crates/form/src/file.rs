//! File size and type helpers.

use std::sync::LazyLock;

use crate::values::SelectedFile;

/// Selection-time cap applied to every file, independent of a field's own
/// `max_size`.
pub const HARD_FILE_CAP: u64 = 10 * 1024 * 1024;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

static SIZE_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"(?i)^\s*(\d+)\s*(KB|MB|GB)\s*$").expect("size regex is valid")
});

/// Parse a human-readable size such as `"10MB"` or `"512kb"` into bytes.
///
/// Units are binary (1 KB = 1024 bytes). Without a recognized unit the
/// leading digits are read as a raw byte count, so `"7"` is 7 and `"1.5MB"`
/// is 1. Returns `None` only when the text has no leading digits at all.
///
/// This is a best-effort parse and does not validate the input.
#[must_use]
pub fn parse_human_size(text: &str) -> Option<u64> {
    if let Some(caps) = SIZE_REGEX.captures(text) {
        let amount: u64 = caps[1].parse().unwrap_or(u64::MAX);
        let unit = match caps[2].to_ascii_uppercase().as_str() {
            "KB" => KB,
            "MB" => MB,
            _ => GB,
        };
        return Some(amount.saturating_mul(unit));
    }

    let digits: String = text
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse().unwrap_or(u64::MAX))
}

/// Whether `file` matches at least one accepted pattern.
///
/// Patterns are `.ext` (case-insensitive extension), an exact MIME type, or
/// a `type/*` wildcard. An empty list matches nothing.
#[must_use]
pub fn file_matches_accept<S: AsRef<str>>(file: &SelectedFile, accept: &[S]) -> bool {
    let extension = file.extension();
    let mime = file.mime_type.as_str();

    accept.iter().any(|pattern| {
        let pattern = pattern.as_ref().trim();
        if pattern.starts_with('.') {
            return extension
                .as_deref()
                .is_some_and(|ext| ext == pattern.to_ascii_lowercase());
        }
        if let Some(category) = pattern.strip_suffix("/*") {
            return mime
                .split_once('/')
                .is_some_and(|(prefix, _)| prefix == category);
        }
        !pattern.contains('*') && pattern == mime
    })
}

/// Render a byte count for people, e.g. `"1.5 MB"`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
