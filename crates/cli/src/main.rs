use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use disk_health_core::{
    collect_doctor_info, load_config, run_check, ConfigError, ConsoleNotifier, Notifier,
    RunOutcome, RunSummary, SmtpNotifier, SystemCommandRunner, DEFAULT_CONFIG_PATH,
};
use sysinfo::System;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EXIT_CONFIG_MISSING: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "disk-health-monitor",
    version,
    about = "Check SMART health and kernel logs for disk problems and email an alert."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one health check and send an alert if problems are found.
    Check(CheckArgs),
    /// Show tool availability and configuration status.
    Doctor(DoctorArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Configuration file (TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,

    /// Print the alert instead of emailing it.
    #[arg(long)]
    dry_run: bool,

    /// Emit the run summary as JSON instead of the console report.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct DoctorArgs {
    /// Configuration file (TOML).
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => run_check_command(args),
        Commands::Doctor(args) => {
            run_doctor_command(args);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run_check_command(args: CheckArgs) -> Result<ExitCode> {
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            if matches!(err, ConfigError::Missing { .. }) {
                eprintln!(
                    "Please create {} based on fixtures/disk-health.example.toml",
                    args.config.display()
                );
            }
            return Ok(ExitCode::from(EXIT_CONFIG_MISSING));
        }
    };
    info!(config = %args.config.display(), dry_run = args.dry_run, "loaded configuration");
    let missing = config.email.missing_settings();
    if !missing.is_empty() && !args.dry_run {
        warn!(?missing, "email settings incomplete, alerts will not be delivered");
    }

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(ConsoleNotifier)
    } else {
        Box::new(SmtpNotifier::new(config.email.clone()))
    };
    let host = System::host_name();

    let summary = run_check(&config, &SystemCommandRunner, notifier.as_ref(), host.as_deref());

    if args.json {
        serde_json::to_writer_pretty(io::stdout().lock(), &summary)
            .context("failed to serialize run summary")?;
        println!();
    } else {
        print_summary(&summary, args.dry_run);
    }

    Ok(ExitCode::SUCCESS)
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    if summary.disks_found == 0 {
        println!("No disks found.");
    }
    for result in &summary.health {
        println!("{}: SMART status = {}", result.device, result.status.label());
    }

    if !summary.log_errors.is_empty() {
        println!("\nDisk-related errors found in system logs:");
        for line in &summary.log_errors {
            println!("{line}");
        }
    }

    match &summary.outcome {
        RunOutcome::AllClear => {
            println!("\nAll disks passed SMART checks and no disk errors found in logs.")
        }
        RunOutcome::AlertSent if dry_run => println!("Alert printed (dry run, no email sent)."),
        RunOutcome::AlertSent => println!("Alert email sent."),
        RunOutcome::AlertFailed { reason } => println!("Failed to send email: {reason}"),
    }
}

fn run_doctor_command(args: DoctorArgs) {
    let info = collect_doctor_info(&SystemCommandRunner, &args.config);
    println!("OS: {} ({})", info.os, info.arch);
    if let Some(current_dir) = info.current_dir {
        println!("Current directory: {}", current_dir);
    }
    if let Some(host) = System::host_name() {
        println!("Host: {}", host);
    }
    println!(
        "Config: {} ({})",
        info.config_path,
        if info.config_ok { "ok" } else { "unusable" }
    );
    if let Some(error) = info.config_error {
        println!("  {}", error);
    }
    if let Some(log_source) = info.log_source {
        println!("Log source: {}", log_source);
    }
    for tool in info.tools {
        println!(
            "- {} [{}] {}",
            tool.program,
            if tool.available { "found" } else { "missing" },
            tool.detail
        );
    }
    for note in info.notes {
        println!("Note: {}", note);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
