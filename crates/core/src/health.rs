use tracing::warn;

use crate::command::{CommandOutput, CommandRunner};
use crate::model::{DeviceHandle, HealthResult, HealthStatus};

pub const SMARTCTL: &str = "smartctl";
pub const HEALTH_MARKER: &str = "SMART overall-health self-assessment test result:";

// smartctl exit bits 0 (command line did not parse) and 1 (device open failed).
const SMARTCTL_FATAL_BITS: i32 = 0b11;

pub fn probe_all(runner: &dyn CommandRunner, devices: &[DeviceHandle]) -> Vec<HealthResult> {
    devices
        .iter()
        .map(|device| HealthResult {
            device: device.clone(),
            status: probe_device(runner, device),
        })
        .collect()
}

pub fn probe_device(runner: &dyn CommandRunner, device: &DeviceHandle) -> HealthStatus {
    match runner.run(SMARTCTL, &["-H", device.as_str()]) {
        Ok(output) => classify_output(&output),
        Err(err) => {
            warn!(device = %device, error = %err, "error checking SMART status");
            HealthStatus::Error(err.to_string())
        }
    }
}

// The exit code only separates `Error` from `Unknown` when the marker is absent.
pub fn classify_output(output: &CommandOutput) -> HealthStatus {
    if let Some(token) = extract_health_token(&output.stdout) {
        return HealthStatus::from_token(token);
    }
    match output.code {
        Some(code) if code & SMARTCTL_FATAL_BITS != 0 => {
            let detail = first_meaningful_line(&output.stderr)
                .or_else(|| last_meaningful_line(&output.stdout))
                .unwrap_or("smartctl could not open the device");
            warn!(code, detail, "smartctl failed");
            HealthStatus::Error(format!("smartctl exited with status {code}: {detail}"))
        }
        _ => HealthStatus::Unknown,
    }
}

pub fn extract_health_token(stdout: &str) -> Option<&str> {
    stdout.lines().find_map(|line| {
        let (_, rest) = line.split_once(HEALTH_MARKER)?;
        rest.split_whitespace().next()
    })
}

fn first_meaningful_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

fn last_meaningful_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).rev().find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{classify_output, extract_health_token};
    use crate::command::CommandOutput;
    use crate::model::HealthStatus;

    fn output(code: i32, stdout: &str) -> CommandOutput {
        CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn passed_fixture_is_passed() {
        let stdout = include_str!("../../../fixtures/smartctl-passed.txt");
        let status = classify_output(&output(0, stdout));
        assert_eq!(status, HealthStatus::Passed("PASSED".to_string()));
    }

    #[test]
    fn failed_fixture_keeps_raw_token() {
        // smartctl sets bit 3 when the disk is failing.
        let stdout = include_str!("../../../fixtures/smartctl-failed.txt");
        let status = classify_output(&output(8, stdout));
        assert_eq!(status, HealthStatus::Failed("FAILED!".to_string()));
    }

    #[test]
    fn lower_case_passed_counts_as_passed() {
        let stdout = "SMART overall-health self-assessment test result: passed\n";
        assert!(classify_output(&output(0, stdout)).is_passed());
    }

    #[test]
    fn missing_marker_is_unknown() {
        let stdout = "SMART support is: Unavailable - device lacks SMART capability.\n";
        assert_eq!(classify_output(&output(4, stdout)), HealthStatus::Unknown);
    }

    #[test]
    fn open_failure_without_marker_is_error() {
        let failed = CommandOutput {
            code: Some(2),
            stdout: "Smartctl open device: /dev/sda failed: Permission denied\n".to_string(),
            stderr: String::new(),
        };
        match classify_output(&failed) {
            HealthStatus::Error(detail) => assert!(detail.contains("Permission denied")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn marker_without_token_is_absent() {
        assert_eq!(
            extract_health_token("SMART overall-health self-assessment test result:   \n"),
            None
        );
    }
}
