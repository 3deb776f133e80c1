pub mod check;
pub mod command;
pub mod config;
pub mod device;
pub mod doctor;
pub mod error;
pub mod health;
pub mod logscan;
pub mod model;
pub mod notify;
pub mod report;

pub use check::run_check;
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use config::{load_config, parse_config, EmailConfig, MonitorConfig, DEFAULT_CONFIG_PATH};
pub use device::{enumerate_disks, parse_device_list};
pub use doctor::{collect_doctor_info, DoctorInfo, ToolCheck};
pub use error::{CollaboratorError, ConfigError, NotifyError};
pub use health::{classify_output, extract_health_token, probe_all, probe_device};
pub use logscan::{split_log_lines, LogScanner, LogSource, ERROR_KEYWORDS};
pub use model::{
    DeviceHandle, HealthResult, HealthStatus, LogErrorLine, Report, RunOutcome, RunStage,
    RunSummary, DEVICE_PATH_PREFIX,
};
pub use notify::{ConsoleNotifier, Notifier, SmtpNotifier};
pub use report::build_report;
