use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "disk-health.toml";

/// Settings for one run, loaded once by the entry point and passed to each stage.
///
/// Absent email settings do not stop a run; they surface when an alert is sent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonitorConfig {
    #[serde(default, alias = "LOG_FILE", deserialize_with = "blank_as_none")]
    pub log_file: Option<PathBuf>,
    #[serde(flatten)]
    pub email: EmailConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailConfig {
    #[serde(default, rename = "email_from", alias = "EMAIL_FROM")]
    pub from: String,
    /// One or more recipients, comma separated.
    #[serde(default, rename = "email_to", alias = "EMAIL_TO")]
    pub to: String,
    #[serde(default, alias = "SMTP_SERVER")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port", alias = "SMTP_PORT")]
    pub smtp_port: u16,
    #[serde(default, alias = "SMTP_USER")]
    pub smtp_user: String,
    #[serde(default, alias = "SMTP_PASS")]
    pub smtp_pass: String,
}

impl EmailConfig {
    pub fn recipients(&self) -> Vec<&str> {
        self.to
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .collect()
    }

    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.from.trim().is_empty() {
            missing.push("email_from");
        }
        if self.recipients().is_empty() {
            missing.push("email_to");
        }
        if self.smtp_server.trim().is_empty() {
            missing.push("smtp_server");
        }
        missing
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from))
}

pub fn load_config(path: impl AsRef<Path>) -> Result<MonitorConfig, ConfigError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ConfigError::Missing {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_config(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_config(data: &str) -> Result<MonitorConfig, toml::de::Error> {
    toml::from_str(data)
}
