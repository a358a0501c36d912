//! Frame decoder.
//!
//! A frame is one text message from the sample source carrying a flat JSON
//! object: numeric channel readings plus a `timestamp`.
//!
//! ```jsonc
//! { "channel1": 0.5, "channel2": -0.3, "timestamp": 1000 }
//! ```
//!
//! Decoding is structural only. Channel names are not checked against any
//! list and readings are not range-checked. A `formattedTimestamp` sent by
//! the producer is discarded; the label is always derived locally.

use std::collections::BTreeMap;

use corelib::{SampleRecord, Timestamp, TimestampError};
use serde_json::Value;
use thiserror::Error;

pub const TIMESTAMP_FIELD: &str = "timestamp";
pub const FORMATTED_TIMESTAMP_FIELD: &str = "formattedTimestamp";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),

    #[error("frame has no `timestamp` field")]
    MissingTimestamp,

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    #[error("channel `{channel}` is not numeric")]
    NonNumericChannel { channel: String },

    #[error("frame carries no channel readings")]
    NoChannels,
}

pub fn decode_frame(raw: &str) -> Result<SampleRecord, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;

    let mut fields = match value {
        Value::Object(fields) => fields,
        other => return Err(DecodeError::NotAnObject(json_kind(&other))),
    };

    let timestamp = fields
        .remove(TIMESTAMP_FIELD)
        .ok_or(DecodeError::MissingTimestamp)?;
    let timestamp = Timestamp::from_json(&timestamp)?;

    fields.remove(FORMATTED_TIMESTAMP_FIELD);

    let mut channels = BTreeMap::new();
    for (name, reading) in fields {
        let Some(reading) = reading.as_f64() else {
            return Err(DecodeError::NonNumericChannel { channel: name });
        };
        channels.insert(name, reading);
    }

    if channels.is_empty() {
        return Err(DecodeError::NoChannels);
    }

    Ok(SampleRecord::new(channels, timestamp)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
