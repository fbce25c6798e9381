//! Remediation — restart an unhealthy target's service.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use vigil_config::Target;
use vigil_transport::CommandRunner;

/// How a remediation attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemediationOutcome {
    RestartSucceeded,
    RestartFailed,
    /// No restart command is configured for the target.
    RemediationSkipped,
}

/// Result of one remediation attempt. Created only for Unhealthy targets.
#[derive(Debug, Clone)]
pub struct RemediationResult {
    pub target: String,
    pub outcome: RemediationOutcome,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Runs restart commands and classifies the outcome.
///
/// There is no re-check after a restart within the same cycle; the next
/// sweep's health check is the source of truth for whether it worked.
#[derive(Clone)]
pub struct Remediator {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl Remediator {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    pub async fn remediate(&self, target: &Target) -> RemediationResult {
        let Some(command) = target.restart_command() else {
            warn!("[{}] unhealthy but no restart command configured", target.name);
            return RemediationResult {
                target: target.name.clone(),
                outcome: RemediationOutcome::RemediationSkipped,
                exit_code: None,
                stdout: String::new(),
                stderr: "no restart_command or service configured".to_string(),
            };
        };

        info!("[{}] restarting: {command}", target.name);
        match self.runner.run(target, &command, self.timeout).await {
            Ok(output) => {
                // Exit 0 wins even with noisy stderr; service managers
                // emit advisory warnings on perfectly good restarts.
                let outcome = if output.exit_code == 0 {
                    RemediationOutcome::RestartSucceeded
                } else {
                    RemediationOutcome::RestartFailed
                };
                RemediationResult {
                    target: target.name.clone(),
                    outcome,
                    exit_code: Some(output.exit_code),
                    stdout: output.stdout,
                    stderr: output.stderr,
                }
            }
            Err(e) => RemediationResult {
                target: target.name.clone(),
                outcome: RemediationOutcome::RestartFailed,
                exit_code: None,
                stdout: String::new(),
                stderr: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vigil_config::CheckSpec;
    use vigil_transport::{ExecOutput, TransportError};

    /// Returns one canned response and records the commands it ran.
    struct CannedRunner {
        response: Result<ExecOutput, TransportError>,
        commands: Mutex<Vec<String>>,
    }

    impl CannedRunner {
        fn new(response: Result<ExecOutput, TransportError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                commands: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for CannedRunner {
        async fn run(
            &self,
            _target: &Target,
            command: &str,
            _timeout: Duration,
        ) -> Result<ExecOutput, TransportError> {
            self.commands.lock().unwrap().push(command.to_string());
            self.response.clone()
        }
    }

    fn target(restart_command: Option<&str>, service: Option<&str>) -> Target {
        Target {
            name: "web-1".to_string(),
            host: "10.0.0.5".to_string(),
            ssh_user: "ops".to_string(),
            ssh_key_path: "/etc/vigil/id_ed25519".to_string(),
            port: 22,
            check: CheckSpec::RemoteCmd {
                command: "systemctl is-active nginx".to_string(),
                expect_stdout: Some("active".to_string()),
                expect_stdout_regex: None,
                timeout_seconds: 1,
            },
            restart_command: restart_command.map(str::to_string),
            service: service.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn exit_zero_with_noisy_stderr_succeeds() {
        let runner = CannedRunner::new(Ok(ExecOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: "Warning: unit file changed on disk, run daemon-reload".to_string(),
        }));
        let remediator = Remediator::new(runner.clone(), Duration::from_secs(1));
        let result = remediator.remediate(&target(None, Some("nginx"))).await;

        assert_eq!(result.outcome, RemediationOutcome::RestartSucceeded);
        assert_eq!(result.exit_code, Some(0));
        assert!(!result.stderr.is_empty());
        assert_eq!(
            runner.commands.lock().unwrap().as_slice(),
            ["sudo systemctl restart nginx"]
        );
    }

    #[tokio::test]
    async fn nonzero_exit_fails() {
        let runner = CannedRunner::new(Ok(ExecOutput {
            exit_code: 1,
            stdout: String::new(),
            stderr: "Job for nginx.service failed".to_string(),
        }));
        let remediator = Remediator::new(runner, Duration::from_secs(1));
        let result = remediator
            .remediate(&target(Some("sudo systemctl restart nginx"), None))
            .await;

        assert_eq!(result.outcome, RemediationOutcome::RestartFailed);
        assert_eq!(result.exit_code, Some(1));
        assert!(result.stderr.contains("failed"));
    }

    #[tokio::test]
    async fn transport_error_fails_with_cause() {
        let runner = CannedRunner::new(Err(TransportError::ConnectFailed(
            "connection reset".to_string(),
        )));
        let remediator = Remediator::new(runner, Duration::from_secs(1));
        let result = remediator.remediate(&target(None, Some("nginx"))).await;

        assert_eq!(result.outcome, RemediationOutcome::RestartFailed);
        assert_eq!(result.exit_code, None);
        assert!(result.stderr.contains("connection reset"));
    }

    #[tokio::test]
    async fn unconfigured_restart_is_skipped_without_ssh() {
        let runner = CannedRunner::new(Ok(ExecOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }));
        let remediator = Remediator::new(runner.clone(), Duration::from_secs(1));
        let result = remediator.remediate(&target(None, None)).await;

        assert_eq!(result.outcome, RemediationOutcome::RemediationSkipped);
        assert!(runner.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_restart_command_wins_over_service() {
        let runner = CannedRunner::new(Ok(ExecOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }));
        let remediator = Remediator::new(runner.clone(), Duration::from_secs(1));
        remediator
            .remediate(&target(Some("/opt/bin/restart-web"), Some("nginx")))
            .await;

        assert_eq!(
            runner.commands.lock().unwrap().as_slice(),
            ["/opt/bin/restart-web"]
        );
    }
}
