use chrono::{SecondsFormat, Utc};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::command::CommandRunner;
use crate::config::MonitorConfig;
use crate::device::enumerate_disks;
use crate::health::probe_all;
use crate::logscan::{LogScanner, LogSource};
use crate::model::{failed_devices, RunOutcome, RunStage, RunSummary};
use crate::notify::Notifier;
use crate::report::build_report;

/// Runs one full pass: enumerate, probe, scan logs, decide, notify.
///
/// Stage failures degrade that stage's output and are logged; the run always
/// reaches [`RunStage::End`].
pub fn run_check(
    config: &MonitorConfig,
    runner: &dyn CommandRunner,
    notifier: &dyn Notifier,
    host: Option<&str>,
) -> RunSummary {
    let run_id = Uuid::new_v4().to_string();
    let span = info_span!("check", run_id = %run_id);
    let _guard = span.enter();

    let mut stages = vec![RunStage::Start];

    let devices = match enumerate_disks(runner) {
        Ok(devices) => devices,
        Err(err) => {
            warn!(error = %err, "error getting disks");
            Vec::new()
        }
    };
    if devices.is_empty() {
        warn!("no disks found");
    }
    info!(disks = devices.len(), "enumerated block devices");
    stages.push(RunStage::Enumerated);

    let health = probe_all(runner, &devices);
    stages.push(RunStage::Probed);

    let scanner = LogScanner::new(LogSource::from_config(config));
    let log_errors = match scanner.scan(runner) {
        Ok(lines) => lines,
        Err(err) => {
            warn!(source = %scanner.source().describe(), error = %err, "error parsing logs");
            Vec::new()
        }
    };
    info!(
        source = %scanner.source().describe(),
        matches = log_errors.len(),
        "scanned logs"
    );
    stages.push(RunStage::Scanned);

    let failed = failed_devices(&health);
    let report = build_report(host, &failed, &log_errors);
    stages.push(RunStage::Decided);

    let outcome = match &report {
        None => {
            stages.push(RunStage::Skipped);
            RunOutcome::AllClear
        }
        Some(report) => {
            info!(
                failed_disks = failed.len(),
                log_errors = log_errors.len(),
                "disk issues detected, sending alert"
            );
            let outcome = match notifier.send(report) {
                Ok(()) => RunOutcome::AlertSent,
                Err(err) => {
                    error!(error = %err, "failed to send email");
                    RunOutcome::AlertFailed {
                        reason: err.to_string(),
                    }
                }
            };
            stages.push(RunStage::Notified);
            outcome
        }
    };
    stages.push(RunStage::End);

    RunSummary {
        run_id,
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        host: host.map(str::to_string),
        disks_found: devices.len(),
        health,
        log_errors,
        report,
        outcome,
        stages,
    }
}
