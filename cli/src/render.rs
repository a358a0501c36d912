//! Headless stand-ins for the chart: turn a snapshot into text or JSON.

use corelib::ConnectionState;
use serde_json::{Map, Value, json};
use stream::WindowSnapshot;

/// "channel1" → "Channel 1", "emg_left" → "Emg_left".
pub fn channel_label(name: &str) -> String {
    if let Some(n) = name.strip_prefix("channel") {
        if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) {
            return format!("Channel {n}");
        }
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_text(state: ConnectionState, snap: &WindowSnapshot, capacity: usize) -> String {
    let last = snap.last().map_or("--:--:--", |r| r.formatted_timestamp());
    let mut out = format!(
        "[{last}] {state}  samples={}/{capacity}  (t: {})",
        snap.len(),
        state.toggle_label()
    );

    for name in snap.channel_names() {
        if let Some(s) = snap.summary(name) {
            out.push_str(&format!(
                "\n  {:<12} latest={:>9.3}  min={:>9.3}  max={:>9.3}",
                channel_label(name),
                s.latest,
                s.min,
                s.max
            ));
        }
    }

    out
}

pub fn render_json(state: ConnectionState, snap: &WindowSnapshot) -> Value {
    let channels: Map<String, Value> = snap
        .channel_names()
        .into_iter()
        .filter_map(|name| {
            let s = snap.summary(name)?;
            Some((name.to_string(), json!(s)))
        })
        .collect();

    json!({
        "state": state,
        "samples": snap.len(),
        "latest": snap.last(),
        "channels": channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use corelib::{SampleRecord, Timestamp};
    use stream::SampleWindow;

    fn record(c1: f64, c2: f64, at: &str) -> SampleRecord {
        let channels = BTreeMap::from([("channel1".to_string(), c1), ("channel2".to_string(), c2)]);
        SampleRecord::with_formatted(channels, Timestamp::Millis(0), at.to_string())
    }

    fn snapshot() -> WindowSnapshot {
        let mut w = SampleWindow::with_capacity(10);
        w.append(record(0.5, -0.3, "12:00:01"));
        w.append(record(0.9, 0.1, "12:00:02"));
        w.snapshot()
    }

    #[test]
    fn labels() {
        assert_eq!(channel_label("channel1"), "Channel 1");
        assert_eq!(channel_label("channel12"), "Channel 12");
        assert_eq!(channel_label("channel"), "Channel");
        assert_eq!(channel_label("emg"), "Emg");
        assert_eq!(channel_label(""), "");
    }

    #[test]
    fn text_lists_every_channel() {
        let out = render_text(ConnectionState::Connected, &snapshot(), 10);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[12:00:02] connected  samples=2/10  (t: Disconnect)");
        assert!(lines[1].contains("Channel 1"));
        assert!(lines[1].contains("latest=    0.900"));
        assert!(lines[2].contains("min=   -0.300"));
    }

    #[test]
    fn text_for_empty_window() {
        let out = render_text(ConnectionState::Disconnected, &WindowSnapshot::default(), 100);
        assert_eq!(out, "[--:--:--] disconnected  samples=0/100  (t: Connect)");
    }

    #[test]
    fn json_carries_latest_record_and_summaries() {
        let v = render_json(ConnectionState::Connected, &snapshot());

        assert_eq!(v["state"], "connected");
        assert_eq!(v["samples"], 2);
        assert_eq!(v["latest"]["channel1"], 0.9);
        assert_eq!(v["latest"]["formattedTimestamp"], "12:00:02");
        assert_eq!(v["channels"]["channel2"]["min"], -0.3);
        assert_eq!(v["channels"]["channel1"]["count"], 2);
    }
}
