use crate::model::{DeviceHandle, LogErrorLine, Report};

const SUBJECT: &str = "Disk Health Alert";

/// Builds the alert, or `None` when there is nothing to report.
///
/// The body depends only on its inputs, so identical inputs give identical
/// reports.
pub fn build_report(
    host: Option<&str>,
    failed_devices: &[&DeviceHandle],
    log_errors: &[LogErrorLine],
) -> Option<Report> {
    if failed_devices.is_empty() && log_errors.is_empty() {
        return None;
    }

    let subject = match host.map(str::trim).filter(|host| !host.is_empty()) {
        Some(host) => format!("{SUBJECT} on {host}"),
        None => SUBJECT.to_string(),
    };

    let mut body = String::from("The following disk issues were detected:\n\n");
    if !failed_devices.is_empty() {
        body.push_str("Failed or failing disks (SMART):\n");
        for device in failed_devices {
            body.push_str(&format!(" - {device}\n"));
        }
        body.push('\n');
    }
    if !log_errors.is_empty() {
        body.push_str("Disk-related errors from system logs:\n");
        for line in log_errors {
            body.push_str(&format!(" - {line}\n"));
        }
    }

    Some(Report { subject, body })
}
