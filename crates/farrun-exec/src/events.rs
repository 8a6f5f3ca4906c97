//! Sticky lifecycle notifications
//!
//! Delivery follows a latest-value model: a subscriber attaching after an
//! event was published immediately observes the most recent value rather
//! than a historical sequence.

use tokio::sync::watch;

use crate::status::ExecutionStatus;

/// Marker published once per run, before any work begins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStart;

/// Terminal notification carrying the final status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandEnd {
    /// Final status of the run
    pub status: ExecutionStatus,
}

/// Last-value event publisher for one runner
///
/// Observers can either await changes on a subscription or query the most
/// recent value directly.
pub struct LifecycleEvents {
    start: watch::Sender<Option<CommandStart>>,
    end: watch::Sender<Option<CommandEnd>>,
}

impl LifecycleEvents {
    /// Create a publisher with no events recorded yet
    #[must_use]
    pub fn new() -> Self {
        let (start, _) = watch::channel(None);
        let (end, _) = watch::channel(None);
        Self { start, end }
    }

    /// Subscribe to start notifications
    #[must_use]
    pub fn subscribe_start(&self) -> watch::Receiver<Option<CommandStart>> {
        self.start.subscribe()
    }

    /// Subscribe to end notifications
    #[must_use]
    pub fn subscribe_end(&self) -> watch::Receiver<Option<CommandEnd>> {
        self.end.subscribe()
    }

    /// Most recently published start marker, if any
    #[must_use]
    pub fn last_start(&self) -> Option<CommandStart> {
        *self.start.borrow()
    }

    /// Most recently published end notification, if any
    #[must_use]
    pub fn last_end(&self) -> Option<CommandEnd> {
        *self.end.borrow()
    }

    pub(crate) fn mark_started(&self) {
        self.start.send_replace(Some(CommandStart));
    }

    pub(crate) fn mark_finished(&self, status: ExecutionStatus) {
        self.end.send_replace(Some(CommandEnd { status }));
    }
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn late_subscriber_sees_latest_values() {
        let events = LifecycleEvents::new();
        events.mark_started();
        events.mark_finished(ExecutionStatus::CommandSent);

        // Subscribed after both emissions; borrow still yields them.
        let start_rx = events.subscribe_start();
        let end_rx = events.subscribe_end();

        assert_eq!(*start_rx.borrow(), Some(CommandStart));
        assert_eq!(
            *end_rx.borrow(),
            Some(CommandEnd {
                status: ExecutionStatus::CommandSent
            })
        );
    }

    #[tokio::test]
    async fn subscriber_is_woken_on_publish() {
        let events = LifecycleEvents::new();
        let mut end_rx = events.subscribe_end();

        assert!(events.last_end().is_none());
        events.mark_finished(ExecutionStatus::ConnectionFailed);

        end_rx.changed().await.unwrap();
        assert_eq!(
            end_rx.borrow().map(|e| e.status),
            Some(ExecutionStatus::ConnectionFailed)
        );
    }

    #[tokio::test]
    async fn latest_value_replaces_older_one() {
        let events = LifecycleEvents::new();
        events.mark_finished(ExecutionStatus::ConnectionFailed);
        events.mark_finished(ExecutionStatus::CommandSent);

        assert_eq!(
            events.last_end().map(|e| e.status),
            Some(ExecutionStatus::CommandSent)
        );
    }
}
