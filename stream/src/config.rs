use std::time::Duration;

use crate::error::StreamError;
use crate::window::DEFAULT_CAPACITY;

pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct StreamConfig {
    /// WebSocket endpoint of the sample source (`ws://` or `wss://`).
    pub endpoint: String,

    /// Number of most recent samples kept for renderers.
    ///
    /// Older samples are evicted first once the window is full.
    pub window_capacity: usize,

    /// Capacity of the channel between the connection I/O task and the
    /// session task.
    ///
    /// Acts as backpressure: a burst larger than this makes the I/O task
    /// wait instead of buffering without bound.
    pub event_queue_capacity: usize,

    /// Capacity of the consumer → session command channel.
    pub command_queue_capacity: usize,

    /// How long a connection attempt may take before it is reported as
    /// failed.
    pub connect_timeout: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            window_capacity: DEFAULT_CAPACITY,
            event_queue_capacity: 256,
            command_queue_capacity: 16,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl StreamConfig {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if !(self.endpoint.starts_with("ws://") || self.endpoint.starts_with("wss://")) {
            return Err(StreamError::InvalidConfig(format!(
                "endpoint must use ws:// or wss://, got {:?}",
                self.endpoint
            )));
        }
        if self.window_capacity == 0 {
            return Err(StreamError::InvalidConfig(
                "window_capacity must be at least 1".into(),
            ));
        }
        if self.event_queue_capacity == 0 || self.command_queue_capacity == 0 {
            return Err(StreamError::InvalidConfig(
                "queue capacities must be at least 1".into(),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(StreamError::InvalidConfig(
                "connect_timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
