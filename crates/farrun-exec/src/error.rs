//! Error types for session establishment

use thiserror::Error;

/// Errors raised while establishing an SSH session
///
/// These are logged where they occur and collapse into
/// `ExecutionStatus::ConnectionFailed` at the runner boundary; no transport
/// error object travels further.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Connect or authentication did not finish within the timeout
    #[error("connect timed out after {0} ms")]
    Timeout(u64),

    /// Transport-level failure (network, handshake, protocol negotiation)
    #[error("connection failed: {0}")]
    Transport(#[from] russh::Error),

    /// Server rejected the supplied credentials
    #[error("authentication failed for user {0}")]
    AuthRejected(String),
}

/// Collapse a message to a single log line
pub(crate) fn sanitize(msg: &str) -> String {
    msg.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_collapses_newlines() {
        assert_eq!(sanitize("auth failed\nfor user\r\nops"), "auth failed for user  ops");
        assert_eq!(sanitize("single line"), "single line");
    }
}
