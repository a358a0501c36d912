//! Producer timestamps and their display form.
//!
//! Sample sources stamp each frame with their own clock, either as
//! milliseconds since the Unix epoch or as a string. The pipeline keeps the
//! original value and derives a wall-clock label from it once, at ingestion.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Pattern used for `formattedTimestamp` (local clock reading).
pub const DISPLAY_FORMAT: &str = "%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Milliseconds since the Unix epoch.
    Millis(i64),

    /// Kept verbatim; either an integer in milliseconds or RFC 3339.
    Text(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TimestampError {
    #[error("timestamp must be a number or a string, got {0}")]
    UnsupportedType(&'static str),

    #[error("timestamp {0} ms is outside the representable range")]
    OutOfRange(i64),

    #[error("unrecognised timestamp string {0:?}")]
    Unparseable(String),
}

impl Timestamp {
    /// Read a timestamp out of a JSON value and check that it converts.
    ///
    /// Fractional milliseconds are truncated; floats beyond the `i64` range
    /// saturate and are then rejected as out of range.
    pub fn from_json(value: &Value) -> Result<Self, TimestampError> {
        let ts = match value {
            Value::Number(n) => {
                let ms = match (n.as_i64(), n.as_f64()) {
                    (Some(ms), _) => ms,
                    (None, Some(f)) => f as i64,
                    (None, None) => return Err(TimestampError::UnsupportedType("number")),
                };
                Timestamp::Millis(ms)
            }
            Value::String(s) => Timestamp::Text(s.clone()),
            Value::Null => return Err(TimestampError::UnsupportedType("null")),
            Value::Bool(_) => return Err(TimestampError::UnsupportedType("bool")),
            Value::Array(_) => return Err(TimestampError::UnsupportedType("array")),
            Value::Object(_) => return Err(TimestampError::UnsupportedType("object")),
        };

        ts.to_instant()?;
        Ok(ts)
    }

    pub fn to_instant(&self) -> Result<DateTime<Utc>, TimestampError> {
        match self {
            Timestamp::Millis(ms) => millis_to_instant(*ms),
            Timestamp::Text(raw) => {
                let trimmed = raw.trim();
                if let Ok(ms) = trimmed.parse::<i64>() {
                    return millis_to_instant(ms);
                }
                DateTime::parse_from_rfc3339(trimmed)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|_| TimestampError::Unparseable(raw.clone()))
            }
        }
    }

    /// Render with [`DISPLAY_FORMAT`] in the given time zone.
    pub fn format_in<Tz>(&self, tz: &Tz) -> Result<String, TimestampError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        Ok(self
            .to_instant()?
            .with_timezone(tz)
            .format(DISPLAY_FORMAT)
            .to_string())
    }

    pub fn format_local(&self) -> Result<String, TimestampError> {
        self.format_in(&Local)
    }
}

fn millis_to_instant(ms: i64) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or(TimestampError::OutOfRange(ms))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{ms}"),
            Timestamp::Text(s) => f.write_str(s),
        }
    }
}
