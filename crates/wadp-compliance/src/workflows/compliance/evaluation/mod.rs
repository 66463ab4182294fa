mod config;
mod context;
mod rules;

pub use config::SweepConfig;

use chrono::{Datelike, NaiveDateTime};
use tracing::{error, info};

use super::dates;
use super::domain::{
    ComplianceLogEntry, OocLevel, OrgType, OrganizationRecord, RecognitionStatus, Report,
};
use super::notices::NoticeRequest;
use context::ReportContext;
use rules::{EscalationBucket, PlannedTransition, LADDER};

/// Stateless ladder evaluator; one instance can sweep any number of
/// manifests.
pub struct SweepEngine {
    config: SweepConfig,
}

impl SweepEngine {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Walks the manifest in order and applies the first matching rule
    /// to every eligible record. The returned outcome owns the entire
    /// manifest, transitioned or not, so persistence can rewrite the
    /// document wholesale.
    pub fn evaluate(
        &self,
        organizations: Vec<OrganizationRecord>,
        activity_reports: &[Report],
        financial_reports: &[Report],
        now: NaiveDateTime,
    ) -> SweepOutcome {
        let current_year = now.date().year();
        let mut outcome = SweepOutcome::sized_for(organizations.len());

        for mut record in organizations {
            if !eligible(&record) {
                outcome.organizations.push(record);
                continue;
            }

            // First-year affiliates get a full grace period.
            if record
                .agreement_date()
                .is_some_and(|date| date.year() == current_year)
            {
                outcome.organizations.push(record);
                continue;
            }

            let Some(due) = record.reporting_due_date() else {
                error!(
                    group = %record.group_name(),
                    "organization record has no usable reporting due date; skipping"
                );
                outcome.records_missing_due_date += 1;
                outcome.organizations.push(record);
                continue;
            };

            let ctx = ReportContext::assemble(
                &record,
                due,
                activity_reports,
                financial_reports,
                &self.config,
                now,
            );

            let matched = LADDER
                .iter()
                .find_map(|rule| (rule.apply)(&record, &ctx).map(|planned| (rule.name, planned)));

            if let Some((rule_name, planned)) = matched {
                apply_transition(&mut record, planned, rule_name, &ctx, now, &mut outcome);
            }
            outcome.organizations.push(record);
        }

        outcome
    }
}

fn apply_transition(
    record: &mut OrganizationRecord,
    planned: PlannedTransition,
    rule_name: &'static str,
    ctx: &ReportContext,
    now: NaiveDateTime,
    outcome: &mut SweepOutcome,
) {
    let from = record.ooc_level().unwrap_or(OocLevel::COMPLIANT);

    record.set_ooc_level(planned.to);
    if let Some(mark) = planned.mark {
        record.set_reporting_status(mark);
    }
    if planned.advance_due_date {
        if let Some(due) = record.reporting_due_date() {
            record.set_reporting_due_date(dates::advance_due_date(due, ctx.current_year));
        }
    }
    if planned.engage_bypass {
        record.engage_bypass();
    }
    if let Some(note) = planned.note {
        record.set_reporting_note(note);
    }

    info!(
        rule = rule_name,
        group = %record.group_name(),
        from = from.numeric(),
        to = planned.to.numeric(),
        "compliance level transition"
    );

    outcome.log_entries.push(ComplianceLogEntry {
        group_name: record.group_name().to_string(),
        level: planned.to,
        financial_year: ctx.current_year,
        created_at: now,
    });

    if let Some(kind) = planned.notice {
        outcome.notices.push(NoticeRequest {
            group_name: record.group_name().to_string(),
            kind,
            level: planned.to,
            due_date: record.reporting_due_date(),
            contacts: record.group_contacts(),
        });
    }

    match planned.bucket {
        Some(EscalationBucket::LevelFour) => outcome
            .escalated_to_four
            .push(record.group_name().to_string()),
        Some(EscalationBucket::LevelFive) => outcome
            .escalated_to_five
            .push(record.group_name().to_string()),
        None => {}
    }

    outcome.transitions.push(Transition {
        group_name: record.group_name().to_string(),
        from,
        to: planned.to,
    });
}

/// Only recognised User Groups, Chapters, and Thematic Organizations
/// without the bypass flag are ever evaluated.
fn eligible(record: &OrganizationRecord) -> bool {
    if record.bypass_engaged() {
        return false;
    }
    if record.recognition() != Some(RecognitionStatus::Recognised) {
        return false;
    }
    matches!(
        record.org_type(),
        Some(OrgType::UserGroup | OrgType::Chapter | OrgType::ThematicOrganization)
    )
}

/// Everything one sweep produced, before any I/O happens.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub organizations: Vec<OrganizationRecord>,
    pub log_entries: Vec<ComplianceLogEntry>,
    pub notices: Vec<NoticeRequest>,
    pub transitions: Vec<Transition>,
    pub escalated_to_four: Vec<String>,
    pub escalated_to_five: Vec<String>,
    pub records_missing_due_date: usize,
}

impl SweepOutcome {
    fn sized_for(records: usize) -> Self {
        Self {
            organizations: Vec::with_capacity(records),
            ..Self::default()
        }
    }
}

/// One applied level change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub group_name: String,
    pub from: OocLevel,
    pub to: OocLevel,
}
