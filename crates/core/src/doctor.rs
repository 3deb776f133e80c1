use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::command::CommandRunner;
use crate::config::load_config;
use crate::device::LSBLK;
use crate::health::SMARTCTL;
use crate::logscan::{LogSource, JOURNALCTL};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorInfo {
    pub os: String,
    pub arch: String,
    pub current_dir: Option<String>,
    pub config_path: String,
    pub config_ok: bool,
    pub config_error: Option<String>,
    pub log_source: Option<String>,
    pub tools: Vec<ToolCheck>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCheck {
    pub program: String,
    pub available: bool,
    pub detail: String,
}

pub fn collect_doctor_info(runner: &dyn CommandRunner, config_path: &Path) -> DoctorInfo {
    let current_dir = env::current_dir()
        .ok()
        .map(|path| path.to_string_lossy().to_string());

    let (config_ok, config_error, log_source, missing_email) = match load_config(config_path) {
        Ok(config) => (
            true,
            None,
            Some(LogSource::from_config(&config).describe()),
            config.email.missing_settings(),
        ),
        Err(err) => (false, Some(err.to_string()), None, Vec::new()),
    };

    let tools = [LSBLK, SMARTCTL, JOURNALCTL]
        .into_iter()
        .map(|program| check_tool(runner, program))
        .collect::<Vec<_>>();

    let mut notes = Vec::new();
    if tools.iter().any(|tool| tool.program == SMARTCTL && tool.available) {
        notes.push("smartctl usually needs root to open block devices.".to_string());
    }
    if !missing_email.is_empty() {
        notes.push(format!(
            "Alerts cannot be emailed until these are set: {}.",
            missing_email.join(", ")
        ));
    }
    if !config_ok {
        notes.push(
            "Create the configuration from fixtures/disk-health.example.toml.".to_string(),
        );
    }

    DoctorInfo {
        os: env::consts::OS.to_string(),
        arch: env::consts::ARCH.to_string(),
        current_dir,
        config_path: config_path.display().to_string(),
        config_ok,
        config_error,
        log_source,
        tools,
        notes,
    }
}

fn check_tool(runner: &dyn CommandRunner, program: &str) -> ToolCheck {
    match runner.run(program, &["--version"]) {
        Ok(output) => ToolCheck {
            program: program.to_string(),
            available: true,
            detail: output
                .stdout
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("version unknown")
                .to_string(),
        },
        Err(err) => ToolCheck {
            program: program.to_string(),
            available: false,
            detail: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;

    use super::collect_doctor_info;
    use crate::command::{CommandOutput, CommandRunner};
    use crate::error::CollaboratorError;

    struct OnlyLsblk;

    impl CommandRunner for OnlyLsblk {
        fn run(&self, program: &str, _args: &[&str]) -> Result<CommandOutput, CollaboratorError> {
            if program == "lsblk" {
                Ok(CommandOutput {
                    code: Some(0),
                    stdout: "lsblk from util-linux 2.38.1\n".to_string(),
                    stderr: String::new(),
                })
            } else {
                Err(CollaboratorError::Spawn {
                    program: program.to_string(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                })
            }
        }
    }

    #[test]
    fn reports_tool_availability_and_missing_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let info = collect_doctor_info(&OnlyLsblk, &dir.path().join("disk-health.toml"));

        assert!(!info.config_ok);
        assert!(info.config_error.is_some());
        let available = info
            .tools
            .iter()
            .map(|tool| (tool.program.as_str(), tool.available))
            .collect::<Vec<_>>();
        assert_eq!(
            available,
            vec![("lsblk", true), ("smartctl", false), ("journalctl", false)]
        );
        assert_eq!(info.tools[0].detail, "lsblk from util-linux 2.38.1");
    }

    #[test]
    fn reports_log_source_from_valid_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("disk-health.toml");
        fs::write(&path, include_str!("../../../fixtures/disk-health.example.toml"))
            .expect("write config");

        let info = collect_doctor_info(&OnlyLsblk, &path);
        assert!(info.config_ok);
        assert_eq!(info.log_source.as_deref(), Some("kernel log since 1 hour ago"));
        assert!(info.notes.is_empty());
    }

    #[test]
    fn notes_missing_email_settings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("disk-health.toml");
        fs::write(&path, "log_file = \"/var/log/messages\"\n").expect("write config");

        let info = collect_doctor_info(&OnlyLsblk, &path);
        assert!(info.config_ok);
        assert_eq!(
            info.notes,
            vec!["Alerts cannot be emailed until these are set: email_from, email_to, smtp_server."
                .to_string()]
        );
    }
}
