use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file {} not found", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failure talking to an external tool or reading the configured log file.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {}: {}", describe_code(*code), stderr.trim())]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("failed to read log file {}: {source}", path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid email address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("no recipient address configured")]
    NoRecipients,
    #[error("{0} is not configured")]
    MissingSetting(&'static str),
    #[error("failed to build email message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no exit status (terminated by signal)".to_string(),
    }
}
