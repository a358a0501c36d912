use std::fmt::Display;

use tracing::Span;

use super::SessionId;

/// Root span for the task that owns a streaming session.
pub fn session_span(session_id: &SessionId) -> Span {
    tracing::info_span!("session", session_id = %session_id)
}

/// Child span for the I/O task of one connection attempt.
pub fn connection_span(token: impl Display, endpoint: &str) -> Span {
    tracing::info_span!("connection", token = %token, endpoint = %endpoint)
}
