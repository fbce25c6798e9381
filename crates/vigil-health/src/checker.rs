//! Health check strategies.
//!
//! Two probe variants: an HTTP probe and a remote-command probe over the
//! SSH transport. Both evaluate to Healthy/Unhealthy/CheckError. The
//! classification rules are pure functions, separate from probe I/O.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use vigil_config::{CheckSpec, Target};
use vigil_transport::{CommandRunner, ExecOutput};

/// Verdict of a single health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// The probe ran and the target looks fine.
    Healthy,
    /// The probe ran and the target is in a bad state.
    Unhealthy,
    /// The probe itself could not be executed, so the target's state is
    /// unknown (connectivity vs. service state is ambiguous).
    CheckError,
}

/// Result of one check, produced fresh each cycle. Never persisted.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub target: String,
    pub status: CheckStatus,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timestamp: DateTime<Utc>,
}

impl CheckResult {
    fn new(
        target: &Target,
        status: CheckStatus,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self {
            target: target.name.clone(),
            status,
            exit_code,
            stdout,
            stderr,
            timestamp: Utc::now(),
        }
    }
}

/// Evaluates a target's configured check.
#[derive(Clone)]
pub struct Checker {
    http: reqwest::Client,
    runner: Arc<dyn CommandRunner>,
}

impl Checker {
    pub fn new(http: reqwest::Client, runner: Arc<dyn CommandRunner>) -> Self {
        Self { http, runner }
    }

    pub async fn evaluate(&self, target: &Target) -> CheckResult {
        match &target.check {
            CheckSpec::Http {
                url,
                method,
                expected_status,
                contains,
                timeout_seconds,
            } => {
                self.http_check(
                    target,
                    url,
                    method,
                    *expected_status,
                    contains.as_deref(),
                    Duration::from_secs(*timeout_seconds),
                )
                .await
            }
            CheckSpec::RemoteCmd {
                command,
                expect_stdout,
                expect_stdout_regex,
                timeout_seconds,
            } => {
                self.remote_check(
                    target,
                    command,
                    expect_stdout.as_deref(),
                    expect_stdout_regex.as_deref(),
                    Duration::from_secs(*timeout_seconds),
                )
                .await
            }
        }
    }

    /// Probe a URL. Wrong status or missing body substring is Unhealthy;
    /// any network failure (DNS, refused connection, timeout) is a
    /// CheckError with the cause preserved.
    async fn http_check(
        &self,
        target: &Target,
        url: &str,
        method: &str,
        expected_status: u16,
        contains: Option<&str>,
        timeout: Duration,
    ) -> CheckResult {
        // Validated at config load; GET is the safe total fallback.
        let method =
            reqwest::Method::from_bytes(method.as_bytes()).unwrap_or(reqwest::Method::GET);

        let response = match self
            .http
            .request(method, url)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return CheckResult::new(
                    target,
                    CheckStatus::CheckError,
                    None,
                    String::new(),
                    format!("http probe failed: {e}"),
                );
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return CheckResult::new(
                    target,
                    CheckStatus::CheckError,
                    None,
                    format!("HTTP {status}"),
                    format!("failed to read response body: {e}"),
                );
            }
        };

        let verdict = classify_http(status, expected_status, &body, contains);
        debug!("[{}] http probe {url}: HTTP {status}", target.name);

        let detail = match (verdict, contains) {
            (CheckStatus::Unhealthy, Some(needle)) if status == expected_status => {
                format!("response body does not contain {needle:?}")
            }
            _ => String::new(),
        };
        CheckResult::new(target, verdict, None, format!("HTTP {status}"), detail)
    }

    /// Run the configured command over SSH and apply the success
    /// predicate. Transport failures are CheckErrors, distinct from a
    /// clean non-zero or non-matching response.
    async fn remote_check(
        &self,
        target: &Target,
        command: &str,
        expect_stdout: Option<&str>,
        expect_stdout_regex: Option<&str>,
        timeout: Duration,
    ) -> CheckResult {
        match self.runner.run(target, command, timeout).await {
            Ok(output) => {
                let verdict = classify_remote(&output, expect_stdout, expect_stdout_regex);
                debug!(
                    "[{}] remote probe exit={} stdout={:?}",
                    target.name,
                    output.exit_code,
                    output.stdout.trim()
                );
                CheckResult::new(
                    target,
                    verdict,
                    Some(output.exit_code),
                    output.stdout,
                    output.stderr,
                )
            }
            Err(e) => CheckResult::new(
                target,
                CheckStatus::CheckError,
                None,
                String::new(),
                e.to_string(),
            ),
        }
    }
}

/// Status/body classification for the HTTP probe.
fn classify_http(status: u16, expected: u16, body: &str, contains: Option<&str>) -> CheckStatus {
    if status != expected {
        return CheckStatus::Unhealthy;
    }
    match contains {
        Some(needle) if !body.contains(needle) => CheckStatus::Unhealthy,
        _ => CheckStatus::Healthy,
    }
}

/// Success predicate for the remote-command probe: exit 0 is always
/// required; the optional literal and regex both compare against trimmed
/// stdout (case-sensitive).
fn classify_remote(
    output: &ExecOutput,
    expect_stdout: Option<&str>,
    expect_stdout_regex: Option<&str>,
) -> CheckStatus {
    if output.exit_code != 0 {
        return CheckStatus::Unhealthy;
    }
    let stdout = output.stdout.trim();
    if let Some(literal) = expect_stdout {
        if stdout != literal {
            return CheckStatus::Unhealthy;
        }
    }
    if let Some(pattern) = expect_stdout_regex {
        match Regex::new(pattern) {
            Ok(re) if re.is_match(stdout) => {}
            Ok(_) => return CheckStatus::Unhealthy,
            // Rejected at config load; ambiguous if it slips through.
            Err(_) => return CheckStatus::CheckError,
        }
    }
    CheckStatus::Healthy
}
