//! Run lifecycle orchestration

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::LifecycleEvents;
use crate::hooks::{DefaultHooks, RunHooks};
use crate::params::ConnectionParams;
use crate::ssh::SshConnector;
use crate::status::ExecutionStatus;
use crate::traits::Connector;

/// Drives one command through connect, execute, and disconnect
///
/// A runner owns its session exclusively for the duration of a run;
/// concurrent commands use separate runners, each spawned as its own task
/// (see [`CommandRunner::spawn`]).
pub struct CommandRunner {
    params: ConnectionParams,
    connector: Arc<dyn Connector>,
    hooks: Arc<dyn RunHooks>,
    events: LifecycleEvents,
}

impl CommandRunner {
    /// Create a runner with the default SSH connector and pass-through hooks
    #[must_use]
    pub fn new(params: ConnectionParams) -> Self {
        Self {
            params,
            connector: Arc::new(SshConnector::new()),
            hooks: Arc::new(DefaultHooks),
            events: LifecycleEvents::new(),
        }
    }

    /// Replace the connector
    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Replace the lifecycle hooks
    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn RunHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Lifecycle notifications for this runner
    #[must_use]
    pub fn events(&self) -> &LifecycleEvents {
        &self.events
    }

    /// Execute one command through the full lifecycle
    ///
    /// Publishes the start notification, runs the phases, and publishes the
    /// end notification carrying the final status. Never fails: every
    /// outcome is one of the four status values, produced exactly once.
    pub async fn run(&self, command: &str) -> ExecutionStatus {
        self.events.mark_started();
        let status = self.execute(command).await;
        self.events.mark_finished(status);
        status
    }

    /// Run as an independent task
    ///
    /// Subscribe to [`CommandRunner::events`] before spawning to observe
    /// this run's notifications.
    pub fn spawn(self, command: String) -> JoinHandle<ExecutionStatus> {
        tokio::spawn(async move { self.run(&command).await })
    }

    async fn execute(&self, command: &str) -> ExecutionStatus {
        if !self.hooks.init_connection(&self.params).await {
            return ExecutionStatus::ConnectionInitError;
        }

        let Ok(mut session) = self.connector.connect(&self.params).await else {
            return ExecutionStatus::ConnectionFailed;
        };

        let cmd = self.hooks.format_cmd(&self.params, command);
        debug!(command = %cmd, "sending command");
        let sent = session.exec(&cmd).await;

        // The session was acquired, so it is released no matter how the
        // send went.
        session.close().await;

        if sent {
            ExecutionStatus::CommandSent
        } else {
            ExecutionStatus::ExecutionFailed
        }
    }
}
