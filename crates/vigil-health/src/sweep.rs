//! The fleet sweep — per-target state machine and the outer loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use vigil_config::Target;
use vigil_notify::Notifier;

use crate::checker::{CheckResult, CheckStatus, Checker};
use crate::remediate::{RemediationOutcome, RemediationResult, Remediator};
use crate::report;

/// Everything that happened to one target in one cycle.
#[derive(Debug)]
pub struct TargetReport {
    pub check: CheckResult,
    pub remediation: Option<RemediationResult>,
    /// A notification was delivered to the sink.
    pub notified: bool,
}

/// Drives the check → decision → remediation → notification cycle.
///
/// The checker, remediator and sink are injected so the whole state
/// machine runs against fakes in tests.
#[derive(Clone)]
pub struct Sweeper {
    checker: Checker,
    remediator: Remediator,
    notifier: Arc<dyn Notifier>,
}

impl Sweeper {
    pub fn new(checker: Checker, remediator: Remediator, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            checker,
            remediator,
            notifier,
        }
    }

    /// Evaluate every target once, concurrently.
    ///
    /// Each target runs in its own task; one target's transport failure
    /// or panic never prevents the rest of the fleet from being checked.
    pub async fn sweep(&self, targets: &[Target]) -> Vec<TargetReport> {
        let mut handles: Vec<JoinHandle<TargetReport>> = Vec::with_capacity(targets.len());
        for target in targets {
            let sweeper = self.clone();
            let target = target.clone();
            handles.push(tokio::spawn(
                async move { sweeper.process_target(&target).await },
            ));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => error!("target task failed: {e}"),
            }
        }
        reports
    }

    /// One target, one cycle:
    /// `CHECKING → (Healthy: idle) | (Unhealthy: remediate → notify) |
    /// (CheckError: notify)`.
    async fn process_target(&self, target: &Target) -> TargetReport {
        info!("[{}] checking health", target.name);
        let check = self.checker.evaluate(target).await;

        match check.status {
            CheckStatus::Healthy => {
                info!("[{}] healthy: {}", target.name, report::detail(&check));
                TargetReport {
                    check,
                    remediation: None,
                    notified: false,
                }
            }
            CheckStatus::Unhealthy => {
                warn!("[{}] unhealthy: {}", target.name, report::detail(&check));
                let remediation = self.remediator.remediate(target).await;
                match remediation.outcome {
                    RemediationOutcome::RestartSucceeded => {
                        info!("[{}] restart succeeded", target.name)
                    }
                    RemediationOutcome::RestartFailed => {
                        warn!("[{}] restart failed: {}", target.name, remediation.stderr)
                    }
                    // The remediator already logged the missing command.
                    RemediationOutcome::RemediationSkipped => {}
                }
                let notified = self
                    .notify(&target.name, report::notification(&check, Some(&remediation)))
                    .await;
                TargetReport {
                    check,
                    remediation: Some(remediation),
                    notified,
                }
            }
            CheckStatus::CheckError => {
                error!("[{}] check failed: {}", target.name, check.stderr);
                let notified = self
                    .notify(&target.name, report::notification(&check, None))
                    .await;
                TargetReport {
                    check,
                    remediation: None,
                    notified,
                }
            }
        }
    }

    /// Delivery failures are logged and swallowed; a dead webhook must
    /// not take the sweep down with it, and there is no mid-cycle retry.
    async fn notify(&self, name: &str, message: String) -> bool {
        match self.notifier.send(&message).await {
            Ok(()) => true,
            Err(e) => {
                error!("[{name}] notification failed: {e}");
                false
            }
        }
    }

    /// Sweep on an interval until the stop signal fires, or once in
    /// single-shot mode. An in-flight sweep always finishes before the
    /// loop exits.
    pub async fn run(
        &self,
        targets: &[Target],
        interval: Duration,
        run_once: bool,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            let reports = self.sweep(targets).await;
            let healthy = reports
                .iter()
                .filter(|r| r.check.status == CheckStatus::Healthy)
                .count();
            let notified = reports.iter().filter(|r| r.notified).count();
            info!(
                "sweep complete: {healthy}/{} healthy, {notified} notification(s) sent",
                reports.len()
            );

            if run_once {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {
                    info!("stop signal received, exiting sweep loop");
                    break;
                }
            }
        }
    }
}
