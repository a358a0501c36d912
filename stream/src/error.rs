use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StreamError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("stream session has shut down")]
    SessionClosed,
}
