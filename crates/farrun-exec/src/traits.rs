//! Transport seam traits

use async_trait::async_trait;

use crate::error::ConnectError;
use crate::params::ConnectionParams;

/// Opens authenticated sessions to a remote host
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate; the caller owns closing the session
    async fn connect(&self, params: &ConnectionParams) -> Result<Box<dyn Session>, ConnectError>;
}

/// One authenticated session, executing a single command at a time
#[async_trait]
pub trait Session: Send {
    /// Execute one command; true iff it ran and exited zero
    async fn exec(&mut self, cmd: &str) -> bool;

    /// Tear the session down
    async fn close(self: Box<Self>);
}
