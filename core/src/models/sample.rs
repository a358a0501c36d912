use std::collections::BTreeMap;

use serde::Serialize;

use super::timestamp::{Timestamp, TimestampError};

/// One decoded, timestamped multi-channel reading.
///
/// Fields are private: a record cannot change once it has been built.
/// Serialises flat, the shape chart renderers key on:
/// `{"channel1": 0.5, "channel2": -0.3, "timestamp": 1000, "formattedTimestamp": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRecord {
    #[serde(flatten)]
    channels: BTreeMap<String, f64>,
    timestamp: Timestamp,
    formatted_timestamp: String,
}

impl SampleRecord {
    /// Build a record, deriving `formatted_timestamp` in the local time zone.
    pub fn new(
        channels: BTreeMap<String, f64>,
        timestamp: Timestamp,
    ) -> Result<Self, TimestampError> {
        let formatted_timestamp = timestamp.format_local()?;
        Ok(Self::with_formatted(channels, timestamp, formatted_timestamp))
    }

    pub fn with_formatted(
        channels: BTreeMap<String, f64>,
        timestamp: Timestamp,
        formatted_timestamp: String,
    ) -> Self {
        Self {
            channels,
            timestamp,
            formatted_timestamp,
        }
    }

    pub fn channel(&self, name: &str) -> Option<f64> {
        self.channels.get(name).copied()
    }

    pub fn channels(&self) -> &BTreeMap<String, f64> {
        &self.channels
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn formatted_timestamp(&self) -> &str {
        &self.formatted_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channels(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn new_derives_formatted_timestamp() {
        let rec =
            SampleRecord::new(channels(&[("channel1", 0.5)]), Timestamp::Millis(1000)).unwrap();

        assert_eq!(rec.channel("channel1"), Some(0.5));
        assert_eq!(rec.channel("channel2"), None);
        assert!(!rec.formatted_timestamp().is_empty());
    }

    #[test]
    fn new_rejects_unconvertible_timestamp() {
        let err = SampleRecord::new(channels(&[("channel1", 0.5)]), Timestamp::Text("soon".into()))
            .unwrap_err();
        assert_eq!(err, TimestampError::Unparseable("soon".into()));
    }

    #[test]
    fn serialises_flat_with_camel_case_label() {
        let rec = SampleRecord::with_formatted(
            channels(&[("channel1", 0.5), ("channel2", -0.3)]),
            Timestamp::Millis(1000),
            "00:00:01".into(),
        );

        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(
            v,
            json!({
                "channel1": 0.5,
                "channel2": -0.3,
                "timestamp": 1000,
                "formattedTimestamp": "00:00:01"
            })
        );
    }

    #[test]
    fn channel_names_are_sorted() {
        let rec = SampleRecord::with_formatted(
            channels(&[("channel2", 1.0), ("channel1", 2.0)]),
            Timestamp::Millis(0),
            "00:00:00".into(),
        );
        let names: Vec<&str> = rec.channel_names().collect();
        assert_eq!(names, vec!["channel1", "channel2"]);
    }
}
