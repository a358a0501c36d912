use std::time::Duration;

use clap::Parser;
use common::logger::LogFormat;
use stream::StreamConfig;
use stream::config::DEFAULT_ENDPOINT;
use stream::window::DEFAULT_CAPACITY;

#[derive(Debug, Parser)]
#[clap(name = "emg-stream", version)]
pub struct Cli {
    /// WebSocket endpoint of the sample source
    #[clap(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Number of most recent samples to keep
    #[clap(long, default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Toggle the connection on at startup
    #[clap(long)]
    pub connect: bool,

    /// How often to redraw when new samples arrived (ms)
    #[clap(long, default_value = "250")]
    pub refresh_ms: u64,

    /// Emit logs as JSON
    #[clap(long)]
    pub json_logs: bool,

    /// Render snapshots as JSON lines instead of text
    #[clap(long)]
    pub json: bool,
}

impl Cli {
    pub fn to_stream_config(&self) -> StreamConfig {
        StreamConfig {
            window_capacity: self.capacity,
            ..StreamConfig::default().with_endpoint(self.endpoint.clone())
        }
    }

    pub fn log_format(&self) -> LogFormat {
        if self.json_logs {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stream_defaults() {
        let cli = Cli::parse_from(["emg-stream"]);
        let cfg = cli.to_stream_config();

        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.window_capacity, DEFAULT_CAPACITY);
        assert!(!cli.connect);
        assert_eq!(cli.log_format(), LogFormat::Pretty);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "emg-stream",
            "--endpoint",
            "ws://10.0.0.2:9000",
            "--capacity",
            "20",
            "--connect",
            "--json-logs",
            "--refresh-ms",
            "1",
        ]);
        let cfg = cli.to_stream_config();

        assert_eq!(cfg.endpoint, "ws://10.0.0.2:9000");
        assert_eq!(cfg.window_capacity, 20);
        assert!(cli.connect);
        assert_eq!(cli.log_format(), LogFormat::Json);
        assert_eq!(cli.refresh_interval(), Duration::from_millis(10));
    }
}
