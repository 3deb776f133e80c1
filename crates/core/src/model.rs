use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEVICE_PATH_PREFIX: &str = "/dev/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    pub fn from_name(name: &str) -> Self {
        Self(format!("{DEVICE_PATH_PREFIX}{name}"))
    }

    pub fn from_path(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens are kept as printed: `FAILED!` stays `FAILED!`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum HealthStatus {
    Passed(String),
    Failed(String),
    Unknown,
    Error(String),
}

impl HealthStatus {
    pub fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("passed") {
            Self::Passed(token.to_string())
        } else {
            Self::Failed(token.to_string())
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Passed(token) | Self::Failed(token) => token,
            Self::Unknown => "UNKNOWN",
            Self::Error(_) => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResult {
    pub device: DeviceHandle,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LogErrorLine(String);

impl LogErrorLine {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogErrorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Start,
    Enumerated,
    Probed,
    Scanned,
    Decided,
    Notified,
    Skipped,
    End,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    AllClear,
    AlertSent,
    AlertFailed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub generated_at: String,
    pub host: Option<String>,
    pub disks_found: usize,
    pub health: Vec<HealthResult>,
    pub log_errors: Vec<LogErrorLine>,
    pub report: Option<Report>,
    pub outcome: RunOutcome,
    pub stages: Vec<RunStage>,
}

impl RunSummary {
    pub fn failed_devices(&self) -> Vec<&DeviceHandle> {
        failed_devices(&self.health)
    }
}

pub fn failed_devices(results: &[HealthResult]) -> Vec<&DeviceHandle> {
    results
        .iter()
        .filter(|result| !result.status.is_passed())
        .map(|result| &result.device)
        .collect()
}
