//! Serializable views over a finished sweep, for the HTTP API and CLI.

use std::io;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::domain::{OocLevel, OrgType, OrganizationRecord, RecognitionStatus, ReportingStatus};
use super::evaluation::Transition;

/// One level change, flattened for JSON responses and CSV export.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionView {
    pub group_name: String,
    pub from_level: u8,
    pub to_level: u8,
}

impl TransitionView {
    pub fn from_transition(transition: &Transition) -> Self {
        Self {
            group_name: transition.group_name.clone(),
            from_level: transition.from.numeric(),
            to_level: transition.to.numeric(),
        }
    }
}

/// Outcome of one sweep run, returned by the API and printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub ran_at: NaiveDateTime,
    pub dry_run: bool,
    pub organizations_seen: usize,
    pub transitions: Vec<TransitionView>,
    pub escalated_to_four: Vec<String>,
    pub escalated_to_five: Vec<String>,
    pub notices_delivered: usize,
    pub notices_failed: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub log_entries_appended: usize,
    pub log_write_failed: bool,
    pub records_missing_due_date: usize,
}

impl SweepSummary {
    /// Writes one CSV row per transition, with a header row.
    pub fn write_transitions_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for transition in &self.transitions {
            csv_writer.serialize(transition)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Current standing of one affiliate, for the read-only listing endpoint.
/// Fields the source row left unreadable serialize as null.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationStatusView {
    pub group_name: String,
    pub org_type: Option<&'static str>,
    pub recognition_status: Option<&'static str>,
    pub out_of_compliance_level: u8,
    pub reporting_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporting_due_date: Option<NaiveDate>,
    pub autochecks_bypassed: bool,
}

impl OrganizationStatusView {
    pub fn from_record(record: &OrganizationRecord) -> Self {
        Self {
            group_name: record.group_name().to_string(),
            org_type: record.org_type().map(OrgType::label),
            recognition_status: record.recognition().map(RecognitionStatus::label),
            out_of_compliance_level: record
                .ooc_level()
                .map(OocLevel::numeric)
                .unwrap_or_default(),
            reporting_status: record.uptodate_reporting().map(ReportingStatus::label),
            reporting_due_date: record.reporting_due_date(),
            autochecks_bypassed: record.bypass_engaged(),
        }
    }
}
