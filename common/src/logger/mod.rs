mod init;
mod session_id;
mod spans;

pub use init::{LogFormat, init_logger};
pub use session_id::SessionId;
pub use spans::{connection_span, session_span};
