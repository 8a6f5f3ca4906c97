//! Extension hooks for the run lifecycle

use async_trait::async_trait;

use crate::params::ConnectionParams;

/// Fallback elevation binary when the params give no explicit path
const DEFAULT_SUDO: &str = "sudo";

/// Fallback no-hang-up wrapper when the params give no explicit path
const DEFAULT_NOHUP: &str = "nohup";

/// Per-run extension points
///
/// The defaults make a plain run: no preconditions, and the command is sent
/// exactly as supplied.
#[async_trait]
pub trait RunHooks: Send + Sync {
    /// Pre-connection check; returning false vetoes the run before any
    /// network activity
    async fn init_connection(&self, _params: &ConnectionParams) -> bool {
        true
    }

    /// Shape the raw command before it is sent
    fn format_cmd(&self, _params: &ConnectionParams, cmd: &str) -> String {
        cmd.to_string()
    }
}

/// Plain pass-through hooks
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

#[async_trait]
impl RunHooks for DefaultHooks {}

/// Hooks for fire-and-forget commands that may need elevation
///
/// Wraps the command with a no-hang-up binary so it survives the session
/// teardown and, when the params request it, prefixes the elevation binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElevatedHooks;

#[async_trait]
impl RunHooks for ElevatedHooks {
    fn format_cmd(&self, params: &ConnectionParams, cmd: &str) -> String {
        let nohup = params.nohup_path.as_deref().unwrap_or(DEFAULT_NOHUP);
        let mut formatted = format!("{nohup} {cmd} > /dev/null 2>&1 &");
        if params.sudo {
            let sudo = params.sudo_path.as_deref().unwrap_or(DEFAULT_SUDO);
            formatted = format!("{sudo} {formatted}");
        }
        formatted
    }
}
