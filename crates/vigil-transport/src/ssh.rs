//! One-shot SSH command execution.

use std::time::Duration;

use async_ssh2_tokio::client::{AuthMethod, Client, ServerCheckMethod};
use async_trait::async_trait;
use tracing::{info, warn};

use vigil_config::Target;

use crate::error::TransportError;

/// Captured output of a completed remote command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Executes a single command on a target host.
///
/// The seam between the SSH transport and the check/remediation layers;
/// tests implement this with scripted fakes.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        target: &Target,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError>;
}

/// Production [`CommandRunner`]: key-authenticated SSH, one session per call.
///
/// Password authentication is never attempted. The session value is
/// dropped (and the connection closed) on every return path, including
/// timeouts and errors.
#[derive(Debug, Clone)]
pub struct SshRunner {
    connect_timeout: Duration,
}

impl SshRunner {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(
        &self,
        target: &Target,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError> {
        let key = tokio::fs::read_to_string(&target.ssh_key_path)
            .await
            .map_err(|e| {
                TransportError::AuthFailed(format!(
                    "cannot read key {}: {e}",
                    target.ssh_key_path
                ))
            })?;

        let auth = AuthMethod::with_key(key.as_str(), None);
        let connect = Client::connect(
            (target.host.as_str(), target.port),
            target.ssh_user.as_str(),
            auth,
            ServerCheckMethod::NoCheck,
        );

        let client = match tokio::time::timeout(self.connect_timeout, connect).await {
            Ok(Ok(client)) => client,
            Ok(Err(e)) => {
                let err = classify_connect_error(&e);
                warn!("[{}] ssh session failed: {err}", target.name);
                return Err(err);
            }
            Err(_) => {
                warn!(
                    "[{}] ssh connect to {}:{} timed out",
                    target.name, target.host, target.port
                );
                return Err(TransportError::Timeout {
                    phase: "connect",
                    limit: self.connect_timeout,
                });
            }
        };

        info!(
            "[{}] connected to {}:{}",
            target.name, target.host, target.port
        );
        info!(
            "[{}] authentication as {} successful",
            target.name, target.ssh_user
        );

        match tokio::time::timeout(timeout, client.execute(command)).await {
            Ok(Ok(result)) => Ok(ExecOutput {
                exit_code: result.exit_status as i32,
                stdout: result.stdout,
                stderr: result.stderr,
            }),
            Ok(Err(e)) => Err(TransportError::CommandIo(e.to_string())),
            Err(_) => Err(TransportError::Timeout {
                phase: "command execution",
                limit: timeout,
            }),
        }
    }
}

/// Map a session-establishment error onto the transport taxonomy.
///
/// The SSH client reports connect and auth failures through one error
/// type; the key file is read before connecting, so what remains is
/// classified by message. Auth rejections mention authentication or the
/// offered key.
fn classify_connect_error(err: &async_ssh2_tokio::Error) -> TransportError {
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();
    if lower.contains("auth") || lower.contains("key") {
        TransportError::AuthFailed(msg)
    } else {
        TransportError::ConnectFailed(msg)
    }
}
