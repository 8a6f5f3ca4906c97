//! SSH transport using the russh crate
//!
//! `SshConnector` covers the connect phase, `ExecChannel` the send phase.
//! Transport errors are caught, sanitized, and logged here; callers only see
//! `ConnectError` or a boolean verdict.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::keys::ssh_key;
use russh::{Channel, Disconnect, client};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::completion::CompletionWatcher;
use crate::error::{ConnectError, sanitize};
use crate::params::ConnectionParams;
use crate::traits::{Connector, Session};

/// Trust decision for a server host key
pub trait HostKeyPolicy: Send + Sync {
    /// Whether to proceed with the presented server key
    fn allow(&self, host: &str, port: u16, key: &ssh_key::PublicKey) -> bool;
}

/// Default policy: proceed with any server key
///
/// Deployments that pin host keys supply their own policy instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyHostKey;

impl HostKeyPolicy for AcceptAnyHostKey {
    fn allow(&self, host: &str, port: u16, _key: &ssh_key::PublicKey) -> bool {
        warn!(
            host = %host,
            port = port,
            "host key verification disabled, accepting server key"
        );
        true
    }
}

/// russh client handler delegating server-key checks to the policy
struct ClientHandler {
    policy: Arc<dyn HostKeyPolicy>,
    host: String,
    port: u16,
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(self.policy.allow(&self.host, self.port, server_public_key))
    }
}

/// Opens and authenticates SSH sessions
pub struct SshConnector {
    policy: Arc<dyn HostKeyPolicy>,
}

impl SshConnector {
    /// Create a connector with the default trust policy
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: Arc::new(AcceptAnyHostKey),
        }
    }

    /// Replace the host-key trust policy
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn HostKeyPolicy>) -> Self {
        self.policy = policy;
        self
    }

    async fn open_session(
        &self,
        params: &ConnectionParams,
    ) -> Result<client::Handle<ClientHandler>, ConnectError> {
        let config = Arc::new(client::Config::default());
        let handler = ClientHandler {
            policy: Arc::clone(&self.policy),
            host: params.host.clone(),
            port: params.port,
        };

        info!(
            host = %params.host,
            port = params.port,
            user = %params.user,
            "connecting"
        );

        let mut handle = timeout(
            params.timeout(),
            client::connect(config, (params.host.as_str(), params.port), handler),
        )
        .await
        .map_err(|_| ConnectError::Timeout(params.timeout_ms))??;

        let auth = timeout(
            params.timeout(),
            handle.authenticate_password(params.user.as_str(), params.password.as_str()),
        )
        .await
        .map_err(|_| ConnectError::Timeout(params.timeout_ms))??;

        if !auth.success() {
            return Err(ConnectError::AuthRejected(params.user.clone()));
        }

        Ok(handle)
    }
}

impl Default for SshConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn Session>, ConnectError> {
        match self.open_session(params).await {
            Ok(handle) => Ok(Box::new(SshSession {
                handle,
                timeout: params.timeout(),
            })),
            Err(e) => {
                error!("{}", sanitize(&e.to_string()));
                Err(e)
            }
        }
    }
}

/// An authenticated session; each exec opens its own channel
pub struct SshSession {
    handle: client::Handle<ClientHandler>,
    timeout: Duration,
}

#[async_trait]
impl Session for SshSession {
    async fn exec(&mut self, cmd: &str) -> bool {
        ExecChannel::new(self.timeout)
            .send(&mut self.handle, cmd)
            .await
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "English")
            .await
        {
            debug!("disconnect error: {}", sanitize(&e.to_string()));
        }
    }
}

/// Runs a single command over a dedicated exec channel
pub(crate) struct ExecChannel {
    timeout: Duration,
}

impl ExecChannel {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Open the channel, request execution, and wait for the verdict
    ///
    /// The channel is closed on every exit path.
    pub(crate) async fn send(&self, handle: &mut client::Handle<ClientHandler>, cmd: &str) -> bool {
        let mut channel = match timeout(self.timeout, handle.channel_open_session()).await {
            Ok(Ok(channel)) => channel,
            Ok(Err(e)) => {
                error!("{}", sanitize(&e.to_string()));
                return false;
            }
            Err(_) => {
                error!("channel open timed out after {} ms", self.timeout.as_millis());
                return false;
            }
        };

        let verdict = Self::drive(&mut channel, cmd).await;
        let _ = channel.close().await;
        verdict
    }

    async fn drive(channel: &mut Channel<client::Msg>, cmd: &str) -> bool {
        if let Err(e) = channel.exec(true, cmd).await {
            error!("{}", sanitize(&e.to_string()));
            return false;
        }
        // One-shot command; nothing is ever written to its stdin.
        if let Err(e) = channel.eof().await {
            error!("{}", sanitize(&e.to_string()));
            return false;
        }

        CompletionWatcher::new().wait_closed(channel).await
    }
}
