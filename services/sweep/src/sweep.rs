use crate::infra::LoggingChannel;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::Args;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use wadp_compliance::config::AppConfig;
use wadp_compliance::error::AppError;
use wadp_compliance::telemetry;
use wadp_compliance::workflows::compliance::{
    ComplianceSweepService, LuaFileStore, SweepConfig, SweepSummary,
};

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Portal document directory (defaults to the configured SWEEP_DATA_DIR)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Run the sweep as of this date (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Evaluate only; write and send nothing
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// Write the level transitions to this CSV file
    #[arg(long)]
    pub(crate) csv_out: Option<PathBuf>,
}

pub(crate) fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let SweepArgs {
        data_dir,
        as_of,
        dry_run,
        csv_out,
    } = args;

    let mut config = AppConfig::load()?;
    if let Some(dir) = data_dir {
        config.sweep.data_dir = dir;
    }
    telemetry::init(&config.telemetry)?;

    let store = Arc::new(LuaFileStore::new(config.sweep.data_dir.clone()));
    let channel = Arc::new(LoggingChannel);
    let service = ComplianceSweepService::new(
        store,
        channel,
        SweepConfig::default(),
        config.sweep.clone(),
    );

    let now = sweep_instant(as_of);
    let summary = if dry_run {
        service.preview(now)?
    } else {
        service.run(now)?
    };
    render_summary(&summary);

    if let Some(path) = csv_out {
        let file = fs::File::create(&path)?;
        summary
            .write_transitions_csv(file)
            .map_err(|err| AppError::Io(io::Error::new(io::ErrorKind::Other, err)))?;
        println!("Transitions written to {}", path.display());
    }

    Ok(())
}

pub(crate) fn sweep_instant(as_of: Option<NaiveDate>) -> NaiveDateTime {
    match as_of {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    }
}

pub(crate) fn render_summary(summary: &SweepSummary) {
    let mode = if summary.dry_run { "dry run" } else { "sweep" };
    println!(
        "Compliance {mode} at {}",
        summary.ran_at.format("%Y-%m-%d %H:%M")
    );
    println!("- {} organizations evaluated", summary.organizations_seen);
    if summary.transitions.is_empty() {
        println!("- no level transitions");
    } else {
        println!("- {} level transition(s):", summary.transitions.len());
        for transition in &summary.transitions {
            println!(
                "  - {}: {} -> {}",
                transition.group_name, transition.from_level, transition.to_level
            );
        }
    }
    if !summary.escalated_to_four.is_empty() {
        println!(
            "- escalated to level 4: {}",
            summary.escalated_to_four.join(", ")
        );
    }
    if !summary.escalated_to_five.is_empty() {
        println!(
            "- escalated to level 5: {}",
            summary.escalated_to_five.join(", ")
        );
    }
    println!(
        "- notices: {} delivered, {} failed",
        summary.notices_delivered, summary.notices_failed
    );
    println!(
        "- staff emails: {} sent, {} failed",
        summary.emails_sent, summary.emails_failed
    );
    if summary.log_write_failed {
        println!("- compliance log append failed; levels are persisted, the log is behind");
    } else {
        println!(
            "- {} compliance log entries appended",
            summary.log_entries_appended
        );
    }
    if summary.records_missing_due_date > 0 {
        println!(
            "- {} record(s) skipped for missing due dates",
            summary.records_missing_due_date
        );
    }
}
