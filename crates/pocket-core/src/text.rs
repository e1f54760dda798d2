//! Text helpers shared by the editors

use chrono::{DateTime, Local, TimeZone};

/// Characters kept when a title is taken from the body
pub const DERIVED_TITLE_MAX_CHARS: usize = 24;

/// Display format for record timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Whether `text` has anything besides whitespace and newlines
pub fn is_not_blank(text: &str) -> bool {
    !text.trim().is_empty()
}

/// First line of `body`, cut to [`DERIVED_TITLE_MAX_CHARS`] characters
pub fn derive_title(body: &str) -> String {
    body.lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(DERIVED_TITLE_MAX_CHARS)
        .collect()
}

/// Short date and time in the device's local zone
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_blank() {
        assert!(!is_not_blank(""));
        assert!(!is_not_blank(" \n\t "));
        assert!(is_not_blank(" a "));
    }

    #[test]
    fn test_derive_title_uses_first_line() {
        assert_eq!(derive_title("groceries\nmilk\neggs"), "groceries");
        assert_eq!(derive_title(""), "");
        assert_eq!(
            derive_title("abcdefghijklmnopqrstuvwxyz0123"),
            "abcdefghijklmnopqrstuvwx"
        );
        assert_eq!(derive_title("비밀번호 목록\n둘째 줄").chars().count(), 7);
    }

    #[test]
    fn test_format_timestamp_shape() {
        let formatted = format_timestamp(&chrono::Utc::now());
        assert_eq!(formatted.len(), 16);
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[13..14], ":");
    }
}
