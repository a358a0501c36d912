pub mod connection;
pub mod sample;
pub mod timestamp;

pub use connection::{ConnectionState, ConnectionToken};
pub use sample::SampleRecord;
pub use timestamp::{DISPLAY_FORMAT, Timestamp, TimestampError};
