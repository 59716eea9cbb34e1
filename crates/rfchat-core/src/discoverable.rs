//! Local discoverability toggle
//!
//! Before advertising, the server role asks the host's wireless control utility
//! to make the adapter discoverable. The outcome never blocks startup: the
//! command runs in a detached task, failures are logged and advertising
//! proceeds regardless.

use std::process::Stdio;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How long a launched command may run before it is killed
pub const COMMAND_TIME_LIMIT: Duration = Duration::from_secs(10);

/// External command that enables discoverable mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverableCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for DiscoverableCommand {
    fn default() -> Self {
        Self::new("bluetoothctl", ["discoverable", "on"])
    }
}

impl DiscoverableCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Start the command in the background and return immediately.
    ///
    /// The outcome is only logged; a command that hangs is killed after
    /// [`COMMAND_TIME_LIMIT`].
    pub fn launch(&self) {
        let command = self.clone();
        tokio::spawn(async move {
            command.run(COMMAND_TIME_LIMIT).await;
        });
    }

    /// Run the command for at most `limit`. Returns whether it succeeded.
    ///
    /// The child's stdout and stderr are discarded so that its chatter cannot
    /// interleave with the status markers on our own stdout.
    pub async fn run(&self, limit: Duration) -> bool {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to run {}: {}; continuing", self.program, e);
                return false;
            }
        };

        match timeout(limit, child.wait()).await {
            Ok(Ok(status)) if status.success() => {
                debug!("Enabled discoverable mode via {}", self.program);
                true
            }
            Ok(Ok(status)) => {
                warn!("{} exited with {}; continuing", self.program, status);
                false
            }
            Ok(Err(e)) => {
                warn!("Failed to wait for {}: {}; continuing", self.program, e);
                false
            }
            Err(_) => {
                warn!("{} still running after {:?}; killing it", self.program, limit);
                if let Err(e) = child.kill().await {
                    debug!("Failed to kill {}: {}", self.program, e);
                }
                false
            }
        }
    }
}
