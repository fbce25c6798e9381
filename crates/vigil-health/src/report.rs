//! Notification text for a target's cycle outcome.
//!
//! One message per deviating target per cycle: name, verdict, check
//! detail, and the remediation outcome when one ran. Command output is
//! truncated so a chatty service cannot flood the sink.

use crate::checker::{CheckResult, CheckStatus};
use crate::remediate::{RemediationOutcome, RemediationResult};

const SNIPPET_MAX: usize = 400;

/// Build the notification message for a deviating target.
pub fn notification(check: &CheckResult, remediation: Option<&RemediationResult>) -> String {
    let verdict = match check.status {
        CheckStatus::Healthy => "healthy",
        CheckStatus::Unhealthy => "unhealthy",
        CheckStatus::CheckError => "check failed",
    };

    let mut message = format!("⚠️ {} {verdict}\n{}", check.target, detail(check));
    if let Some(rem) = remediation {
        message.push('\n');
        message.push_str(&restart_line(rem));
    }
    message
}

/// One-line check detail, shared with sweep logging.
pub(crate) fn detail(check: &CheckResult) -> String {
    match check.exit_code {
        Some(code) => format!(
            "exit={code}, out={}, err={}",
            truncate(check.stdout.trim()),
            truncate(check.stderr.trim())
        ),
        None => {
            let mut parts = Vec::new();
            if !check.stdout.is_empty() {
                parts.push(truncate(check.stdout.trim()));
            }
            if !check.stderr.is_empty() {
                parts.push(truncate(check.stderr.trim()));
            }
            parts.join(", ")
        }
    }
}

fn restart_line(rem: &RemediationResult) -> String {
    match rem.outcome {
        RemediationOutcome::RestartSucceeded => format!(
            "Restart OK: exit={}, out={}, err={}",
            rem.exit_code.unwrap_or_default(),
            truncate(rem.stdout.trim()),
            truncate(rem.stderr.trim())
        ),
        RemediationOutcome::RestartFailed => match rem.exit_code {
            Some(code) => format!(
                "Restart FAILED: exit={code}, out={}, err={}",
                truncate(rem.stdout.trim()),
                truncate(rem.stderr.trim())
            ),
            None => format!("Restart FAILED: {}", truncate(rem.stderr.trim())),
        },
        RemediationOutcome::RemediationSkipped => {
            format!("Restart skipped: {}", rem.stderr)
        }
    }
}

fn truncate(s: &str) -> String {
    if s.len() <= SNIPPET_MAX {
        return s.to_string();
    }
    let mut end = SNIPPET_MAX;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn check(status: CheckStatus, exit_code: Option<i32>, stdout: &str, stderr: &str) -> CheckResult {
        CheckResult {
            target: "web-1".to_string(),
            status,
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn restart(outcome: RemediationOutcome, exit_code: Option<i32>, stderr: &str) -> RemediationResult {
        RemediationResult {
            target: "web-1".to_string(),
            outcome,
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn carries_name_verdict_and_exit_code() {
        let msg = notification(
            &check(CheckStatus::Unhealthy, Some(3), "inactive", ""),
            None,
        );
        assert!(msg.contains("web-1"));
        assert!(msg.contains("unhealthy"));
        assert!(msg.contains("exit=3"));
        assert!(msg.contains("inactive"));
    }

    #[test]
    fn check_error_message_carries_cause() {
        let msg = notification(
            &check(CheckStatus::CheckError, None, "", "connect failed: refused"),
            None,
        );
        assert!(msg.contains("check failed"));
        assert!(msg.contains("refused"));
    }

    #[test]
    fn successful_restart_line_keeps_warning_text() {
        let msg = notification(
            &check(CheckStatus::Unhealthy, Some(3), "inactive", ""),
            Some(&restart(
                RemediationOutcome::RestartSucceeded,
                Some(0),
                "unit file changed on disk",
            )),
        );
        assert!(msg.contains("Restart OK"));
        assert!(msg.contains("unit file changed"));
    }

    #[test]
    fn failed_restart_without_exit_code_reports_transport_cause() {
        let msg = notification(
            &check(CheckStatus::Unhealthy, Some(3), "inactive", ""),
            Some(&restart(
                RemediationOutcome::RestartFailed,
                None,
                "command execution timed out after 30s",
            )),
        );
        assert!(msg.contains("Restart FAILED"));
        assert!(msg.contains("timed out"));
    }

    #[test]
    fn skipped_restart_says_why() {
        let msg = notification(
            &check(CheckStatus::Unhealthy, Some(1), "", ""),
            Some(&restart(
                RemediationOutcome::RemediationSkipped,
                None,
                "no restart_command or service configured",
            )),
        );
        assert!(msg.contains("Restart skipped"));
        assert!(msg.contains("no restart_command"));
    }

    #[test]
    fn long_output_is_truncated() {
        let noisy = "x".repeat(5000);
        let msg = notification(&check(CheckStatus::Unhealthy, Some(1), &noisy, ""), None);
        assert!(msg.len() < 1200);
        assert!(msg.contains("..."));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Three-byte chars so the cut lands mid-char and must back up.
        let noisy = "€".repeat(SNIPPET_MAX);
        let out = truncate(&noisy);
        assert!(out.ends_with("..."));
        assert!(out.len() <= SNIPPET_MAX + 3);
    }
}
