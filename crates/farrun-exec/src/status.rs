//! Terminal status model for a run

use serde::{Deserialize, Serialize};

/// Outcome of one remote command run
///
/// `CommandSent` is the only success value. A non-zero remote exit is folded
/// into `ExecutionFailed` together with channel and streaming errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Every phase succeeded and the remote command exited zero
    CommandSent,
    /// The session connected but channel open, streaming, or the command
    /// itself failed
    ExecutionFailed,
    /// Session establishment failed (network, timeout, auth)
    ConnectionFailed,
    /// The pre-connection hook vetoed the run
    ConnectionInitError,
}

impl ExecutionStatus {
    /// Whether the run completed successfully
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(self, ExecutionStatus::CommandSent)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::CommandSent => "command_sent",
            ExecutionStatus::ExecutionFailed => "execution_failed",
            ExecutionStatus::ConnectionFailed => "connection_failed",
            ExecutionStatus::ConnectionInitError => "connection_init_error",
        };
        write!(f, "{s}")
    }
}
