//! Config schema and file loading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

fn default_ssh_port() -> u16 {
    22
}

fn default_ssh_connect_timeout() -> u64 {
    10
}

fn default_restart_timeout() -> u64 {
    30
}

fn default_http_timeout() -> u64 {
    5
}

fn default_cmd_timeout() -> u64 {
    10
}

fn default_expected_status() -> u16 {
    200
}

fn default_http_method() -> String {
    "GET".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("logs/vigild.log")
}

/// Top-level watchdog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between full fleet sweeps.
    pub sweep_interval_seconds: u64,
    /// Perform exactly one sweep and exit.
    #[serde(default)]
    pub run_once: bool,
    /// Discord webhook URL. Falls back to the DISCORD_WEBHOOK environment
    /// variable when absent; with neither set, notifications are logged
    /// and dropped.
    #[serde(default)]
    pub discord_webhook_url: Option<String>,
    /// Log file path (console output is always on).
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    /// Connect timeout for SSH sessions, distinct from per-command
    /// execution timeouts.
    #[serde(default = "default_ssh_connect_timeout")]
    pub ssh_connect_timeout_seconds: u64,
    /// Execution timeout for restart commands.
    #[serde(default = "default_restart_timeout")]
    pub restart_timeout_seconds: u64,
    /// The monitored fleet.
    pub targets: Vec<Target>,
}

/// One monitored remote host plus its check/restart configuration.
///
/// Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Unique identifier, used in logs and notifications.
    pub name: String,
    pub host: String,
    pub ssh_user: String,
    pub ssh_key_path: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub check: CheckSpec,
    /// Explicit restart command. Wins over `service` when both are set.
    #[serde(default)]
    pub restart_command: Option<String>,
    /// Service name; shorthand for `sudo systemctl restart <service>`.
    #[serde(default)]
    pub service: Option<String>,
}

/// How a target's health is probed. Exactly one variant per target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckSpec {
    Http {
        url: String,
        #[serde(default = "default_http_method")]
        method: String,
        #[serde(default = "default_expected_status")]
        expected_status: u16,
        /// Response body must contain this substring to count as healthy.
        #[serde(default)]
        contains: Option<String>,
        #[serde(default = "default_http_timeout")]
        timeout_seconds: u64,
    },
    RemoteCmd {
        command: String,
        /// Trimmed stdout must equal this literal exactly (case-sensitive).
        #[serde(default)]
        expect_stdout: Option<String>,
        /// Trimmed stdout must match this regex.
        #[serde(default)]
        expect_stdout_regex: Option<String>,
        #[serde(default = "default_cmd_timeout")]
        timeout_seconds: u64,
    },
}

impl Config {
    /// Load and validate a config file. The format is chosen by extension:
    /// `.yaml`/`.yml` or `.json`.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: Config = match ext {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            "json" => {
                serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        config.validate()?;
        Ok(config)
    }

    /// Structural validation beyond what serde enforces.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.sweep_interval_seconds == 0 && !self.run_once {
            return Err(ConfigError::ZeroInterval);
        }

        let mut names = HashSet::new();
        for target in &self.targets {
            if !names.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.name.clone()));
            }

            match &target.check {
                CheckSpec::RemoteCmd {
                    expect_stdout_regex: Some(pattern),
                    ..
                } => {
                    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
                        target: target.name.clone(),
                        source,
                    })?;
                }
                CheckSpec::Http { method, .. } => {
                    if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphabetic()) {
                        return Err(ConfigError::InvalidHttpMethod {
                            target: target.name.clone(),
                            method: method.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// The webhook URL to notify, from config or the DISCORD_WEBHOOK
    /// environment variable.
    pub fn webhook_url(&self) -> Option<String> {
        self.discord_webhook_url
            .clone()
            .filter(|u| !u.is_empty())
            .or_else(|| std::env::var("DISCORD_WEBHOOK").ok().filter(|u| !u.is_empty()))
    }
}

impl Target {
    /// The restart command to run when this target is unhealthy, if any.
    ///
    /// An explicit `restart_command` wins; otherwise `service` expands to
    /// a systemctl restart.
    pub fn restart_command(&self) -> Option<String> {
        self.restart_command.clone().or_else(|| {
            self.service
                .as_ref()
                .map(|s| format!("sudo systemctl restart {s}"))
        })
    }
}
