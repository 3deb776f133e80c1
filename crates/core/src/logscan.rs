use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::command::CommandRunner;
use crate::config::MonitorConfig;
use crate::error::CollaboratorError;
use crate::model::LogErrorLine;

pub const JOURNALCTL: &str = "journalctl";
pub const KERNEL_LOG_WINDOW: &str = "1 hour ago";

// Plain case-insensitive substring containment: `failover` matches `fail`.
pub const ERROR_KEYWORDS: &[&str] = &[
    "I/O error",
    "ata_error",
    "fail",
    "error",
    "unresponsive",
    "offline",
    "faulty",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    File(PathBuf),
    KernelLog,
}

impl LogSource {
    pub fn from_config(config: &MonitorConfig) -> Self {
        match &config.log_file {
            Some(path) => Self::File(path.clone()),
            None => Self::KernelLog,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::KernelLog => format!("kernel log since {KERNEL_LOG_WINDOW}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogScanner {
    source: LogSource,
    keywords: Vec<String>,
}

impl LogScanner {
    pub fn new(source: LogSource) -> Self {
        Self {
            source,
            keywords: ERROR_KEYWORDS.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    pub fn scan(&self, runner: &dyn CommandRunner) -> Result<Vec<LogErrorLine>, CollaboratorError> {
        let text = self.read_source(runner)?;
        Ok(self.filter_lines(split_log_lines(&text)))
    }

    pub fn filter_lines<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> Vec<LogErrorLine> {
        lines
            .into_iter()
            .filter(|line| self.is_error_line(line))
            .map(LogErrorLine::new)
            .collect()
    }

    pub fn is_error_line(&self, line: &str) -> bool {
        let lowered = line.to_lowercase();
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }

    fn read_source(&self, runner: &dyn CommandRunner) -> Result<String, CollaboratorError> {
        match &self.source {
            LogSource::File(path) => {
                debug!(path = %path.display(), "reading log file");
                let bytes = fs::read(path).map_err(|source| CollaboratorError::ReadLog {
                    path: path.clone(),
                    source,
                })?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            LogSource::KernelLog => {
                let output = runner.run(JOURNALCTL, &["-k", "--since", KERNEL_LOG_WINDOW])?;
                if !output.success() {
                    warn!(
                        code = ?output.code,
                        stderr = output.stderr.trim(),
                        "journalctl exited unsuccessfully, scanning its output anyway"
                    );
                }
                Ok(output.stdout)
            }
        }
    }
}

// `\r`, `\n` and `\r\n` all end a line.
pub fn split_log_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c == '\n' || c == '\r')
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{LogScanner, LogSource};
    use crate::command::{CommandOutput, CommandRunner};
    use crate::error::CollaboratorError;

    struct NoTools;

    impl CommandRunner for NoTools {
        fn run(&self, program: &str, _args: &[&str]) -> Result<CommandOutput, CollaboratorError> {
            panic!("unexpected invocation of {program}");
        }
    }

    fn scanner() -> LogScanner {
        LogScanner::new(LogSource::KernelLog)
    }

    #[test]
    fn retains_failed_command_line() {
        let kept = scanner().filter_lines(["Jan 1 ata1.00: failed command: READ DMA"]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].as_str(), "Jan 1 ata1.00: failed command: READ DMA");
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let scanner = scanner();
        assert!(scanner.is_error_line("sd 0:0:0:0: [sda] Device OFFLINE"));
        assert!(scanner.is_error_line("buffer i/o ERROR on dev sdb"));
        assert!(scanner.is_error_line("bond0: failover complete"));
        assert!(scanner.is_error_line("started error_log_rotate_daemon"));
        assert!(!scanner.is_error_line("EXT4-fs (sda1): mounted filesystem"));
    }

    #[test]
    fn keeps_input_order_and_trims() {
        let lines = ["  disk faulty  ", "all good", "\tata_error on port 2\n"];
        let kept = scanner().filter_lines(lines);
        let kept = kept.iter().map(|line| line.as_str()).collect::<Vec<_>>();
        assert_eq!(kept, vec!["disk faulty", "ata_error on port 2"]);
    }

    #[test]
    fn bare_carriage_returns_separate_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("mac.log");
        fs::write(&path, "ok line\rI/O error here\rfine\r\nata_error port 1\r\n")
            .expect("write log");

        let kept = LogScanner::new(LogSource::File(path))
            .scan(&NoTools)
            .expect("file scan succeeds");
        let kept = kept.iter().map(|line| line.as_str()).collect::<Vec<_>>();
        assert_eq!(kept, vec!["I/O error here", "ata_error port 1"]);
    }

    #[test]
    fn reads_configured_file_without_invoking_tools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kern.log");
        fs::write(&path, include_str!("../../../fixtures/kern-sample.log")).expect("write log");

        let kept = LogScanner::new(LogSource::File(path))
            .scan(&NoTools)
            .expect("file scan succeeds");
        let kept = kept.iter().map(|line| line.as_str()).collect::<Vec<_>>();
        assert_eq!(
            kept,
            vec![
                "Jan 1 ata1.00: failed command: READ DMA",
                "Jan  1 00:00:04 host kernel: blk_update_request: I/O error, dev sda, sector 2048",
                "Jan  1 00:00:06 host kernel: bonding: bond0: link status definitely up, failover complete",
                "Jan  1 00:00:07 host kernel: sd 0:0:0:0: [sda] Device OFFLINE",
            ]
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = LogScanner::new(LogSource::File(dir.path().join("absent.log")))
            .scan(&NoTools)
            .expect_err("missing file fails");
        assert!(matches!(err, CollaboratorError::ReadLog { .. }));
    }
}
