//! Channel completion detection
//!
//! Drains stdout while the remote command runs, then polls for channel
//! closure and classifies the outcome from the exit status.

use std::time::Duration;

use russh::{Channel, ChannelMsg, client};
use tokio::time::timeout;
use tracing::{error, info};

/// Interval between channel-closed checks
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Exit status recorded when the remote never reported one
const NO_EXIT_STATUS: i64 = -1;

/// Watches one exec channel until it closes and reports the verdict
pub(crate) struct CompletionWatcher {
    poll_interval: Duration,
}

impl CompletionWatcher {
    pub(crate) fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Wait until the channel closes and report whether the command
    /// succeeded
    ///
    /// Stdout is logged line by line as it arrives. Stderr is buffered and
    /// only rendered when the exit status turns out non-zero. Output
    /// draining runs to end-of-data before the closure poll starts, so a
    /// remote process that holds its stdout open stalls this call.
    pub(crate) async fn wait_closed(&self, channel: &mut Channel<client::Msg>) -> bool {
        let mut stdout_lines = LineBuffer::new();
        let mut stderr: Vec<u8> = Vec::new();
        let mut exit_status: Option<u32> = None;
        let mut closed = false;

        // Drain until the remote signals end of data.
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { ref data }) => {
                    for line in stdout_lines.push(data) {
                        info!("stdout: {line}");
                    }
                }
                Some(ChannelMsg::ExtendedData { ref data, ext }) if ext == 1 => {
                    stderr.extend_from_slice(data);
                }
                Some(ChannelMsg::ExitStatus {
                    exit_status: status,
                }) => exit_status = Some(status),
                Some(ChannelMsg::Eof) => break,
                Some(_) => {}
                None => {
                    closed = true;
                    break;
                }
            }
        }
        if let Some(line) = stdout_lines.take_remainder() {
            info!("stdout: {line}");
        }

        // The exit status is only final once the channel reports closed;
        // check on a fixed interval, swallowing elapsed ticks.
        while !closed {
            match timeout(self.poll_interval, channel.wait()).await {
                Err(_) => {}
                Ok(None) => closed = true,
                Ok(Some(ChannelMsg::ExitStatus {
                    exit_status: status,
                })) => exit_status = Some(status),
                Ok(Some(ChannelMsg::ExtendedData { ref data, ext })) if ext == 1 => {
                    stderr.extend_from_slice(data);
                }
                Ok(Some(_)) => {}
            }
        }

        match exit_status {
            Some(0) => true,
            status => {
                let code = status.map_or(NO_EXIT_STATUS, i64::from);
                error!("exit-status: {code} - {}", join_lines(&stderr));
                false
            }
        }
    }
}

/// Splits an incoming byte stream into complete lines, carrying a partial
/// trailing line between chunks
#[derive(Debug, Default)]
struct LineBuffer {
    pending: String,
}

impl LineBuffer {
    fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return the lines it completed
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.push_str(&String::from_utf8_lossy(chunk));
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.find('\n') {
            let mut line: String = self.pending.drain(..=pos).collect();
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
            lines.push(line);
        }
        lines
    }

    /// Remaining partial line, if the stream ended without a newline
    fn take_remainder(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}

/// Join buffered stderr into one space-separated log fragment
fn join_lines(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_buffer_carries_partial_lines() {
        let mut buf = LineBuffer::new();

        assert_eq!(buf.push(b"hel"), Vec::<String>::new());
        assert_eq!(buf.push(b"lo\nwor"), vec!["hello".to_string()]);
        assert_eq!(buf.push(b"ld\n"), vec!["world".to_string()]);
        assert_eq!(buf.take_remainder(), None);
    }

    #[test]
    fn line_buffer_splits_multiple_lines_in_one_chunk() {
        let mut buf = LineBuffer::new();

        assert_eq!(
            buf.push(b"one\ntwo\nthree"),
            vec!["one".to_string(), "two".to_string()]
        );
        assert_eq!(buf.take_remainder(), Some("three".to_string()));
        assert_eq!(buf.take_remainder(), None);
    }

    #[test]
    fn line_buffer_strips_carriage_returns() {
        let mut buf = LineBuffer::new();

        assert_eq!(buf.push(b"hi\r\n"), vec!["hi".to_string()]);
    }

    #[test]
    fn join_lines_uses_single_spaces() {
        assert_eq!(
            join_lines(b"command not found\npermission denied\n"),
            "command not found permission denied"
        );
        assert_eq!(join_lines(b""), "");
    }
}
