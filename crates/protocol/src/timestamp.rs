//! Timestamp patterns
//!
//! Streams carry a CLP-style `%` pattern. It is translated once into a
//! `chrono` format string, and every event timestamp is rendered through it
//! in UTC.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{TimeZone, Utc};

use crate::{IrError, Result};

/// Pattern used when neither the stream nor the caller names one
pub const DEFAULT_TIMESTAMP_PATTERN: &str = "%Y-%m-%dT%H:%M:%S.%3";

/// A validated timestamp pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampPattern {
    pattern: String,
    chrono_format: String,
}

impl TimestampPattern {
    /// Translate and validate a CLP timestamp pattern
    pub fn parse(pattern: &str) -> Result<Self> {
        let mut chrono_format = String::with_capacity(pattern.len() + 4);
        let mut chars = pattern.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                chrono_format.push(c);
                continue;
            }
            let spec = chars.next().ok_or_else(|| {
                IrError::metadata_corrupted(format!(
                    "timestamp pattern '{pattern}' ends with a lone '%'"
                ))
            })?;
            match spec {
                'Y' | 'y' | 'B' | 'b' | 'A' | 'a' | 'm' | 'd' | 'e' | 'H' | 'k' | 'I' | 'l'
                | 'M' | 'S' | 'p' | 's' | '%' => {
                    chrono_format.push('%');
                    chrono_format.push(spec);
                }
                '3' | '6' | '9' => {
                    chrono_format.push('%');
                    chrono_format.push(spec);
                    chrono_format.push('f');
                }
                other => {
                    return Err(IrError::metadata_corrupted(format!(
                        "timestamp pattern '{pattern}' has unsupported specifier '%{other}'"
                    )));
                }
            }
        }

        if StrftimeItems::new(&chrono_format).any(|item| matches!(item, Item::Error)) {
            return Err(IrError::metadata_corrupted(format!(
                "timestamp pattern '{pattern}' is not formattable"
            )));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            chrono_format,
        })
    }

    /// The pattern as given by the stream or caller
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render epoch milliseconds
    pub fn format(&self, timestamp_ms: i64) -> String {
        let mut out = String::new();
        self.write_timestamp(timestamp_ms, &mut out);
        out
    }

    /// Insert the rendered timestamp at the start of `message`
    pub fn insert_formatted_timestamp(&self, timestamp_ms: i64, message: &mut String) {
        let mut prefix = String::with_capacity(self.pattern.len() + 8 + message.len());
        self.write_timestamp(timestamp_ms, &mut prefix);
        prefix.push_str(message);
        *message = prefix;
    }

    fn write_timestamp(&self, timestamp_ms: i64, out: &mut String) {
        let start = out.len();
        let written = match Utc.timestamp_millis_opt(timestamp_ms).single() {
            Some(dt) => write!(out, "{}", dt.format(&self.chrono_format)).is_ok(),
            None => false,
        };
        if !written {
            out.truncate(start);
            let _ = write!(out, "{timestamp_ms}ms");
        }
    }
}

impl Default for TimestampPattern {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_PATTERN.to_string(),
            chrono_format: "%Y-%m-%dT%H:%M:%S.%3f".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern = TimestampPattern::default();
        assert_eq!(pattern.pattern(), DEFAULT_TIMESTAMP_PATTERN);
        assert_eq!(pattern.format(0), "1970-01-01T00:00:00.000");
        assert_eq!(TimestampPattern::parse(DEFAULT_TIMESTAMP_PATTERN).unwrap(), pattern);
    }

    #[test]
    fn test_log4j_style_pattern() {
        let pattern = TimestampPattern::parse("%Y-%m-%d %H:%M:%S,%3").unwrap();
        assert_eq!(pattern.format(1_700_000_000_123), "2023-11-14 22:13:20,123");
    }

    #[test]
    fn test_sub_second_precision() {
        let pattern = TimestampPattern::parse("%S.%6|%9").unwrap();
        assert_eq!(pattern.format(1_500), "01.500000|500000000");
    }

    #[test]
    fn test_literal_percent_and_text() {
        let pattern = TimestampPattern::parse("[%H:%M] 100%%").unwrap();
        assert_eq!(pattern.format(3_600_000), "[01:00] 100%");
    }

    #[test]
    fn test_unknown_specifier_rejected() {
        let err = TimestampPattern::parse("%Y %Q").unwrap_err();
        assert!(matches!(err, IrError::MetadataCorrupted(_)));
    }

    #[test]
    fn test_trailing_percent_rejected() {
        let err = TimestampPattern::parse("%H:%").unwrap_err();
        assert!(matches!(err, IrError::MetadataCorrupted(_)));
    }

    #[test]
    fn test_out_of_range_timestamp_falls_back_to_millis() {
        let pattern = TimestampPattern::default();
        assert_eq!(pattern.format(i64::MAX), "9223372036854775807ms");
    }

    #[test]
    fn test_insert_prefixes_message() {
        let pattern = TimestampPattern::parse("%H:%M:%S").unwrap();
        let mut message = " INFO ready".to_string();
        pattern.insert_formatted_timestamp(61_000, &mut message);
        assert_eq!(message, "00:01:01 INFO ready");
    }
}
