//! Sweep orchestration: load the portal, evaluate the ladder, persist,
//! then notify.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info, warn};

use crate::codec::RecordFields;
use crate::config::SweepSettings;

use super::domain::{OrganizationRecord, Report};
use super::evaluation::{SweepConfig, SweepEngine, SweepOutcome};
use super::notices::NoticeDispatcher;
use super::repository::{DocumentStore, NotificationChannel, PortalDocument, StoreError};
use super::summary::{OrganizationStatusView, SweepSummary, TransitionView};

/// Service composing the document store, ladder engine, and outbound
/// notification channel.
///
/// Failure handling is deliberately uneven. A failed write of the
/// organization document aborts the run before any notice goes out, so
/// nobody is reminded about a level that was never recorded. A failed
/// log append or notification is reported in the summary but does not
/// undo the sweep.
pub struct ComplianceSweepService<S, N> {
    store: Arc<S>,
    channel: Arc<N>,
    engine: SweepEngine,
    settings: SweepSettings,
}

impl<S, N> ComplianceSweepService<S, N>
where
    S: DocumentStore + 'static,
    N: NotificationChannel + 'static,
{
    pub fn new(store: Arc<S>, channel: Arc<N>, config: SweepConfig, settings: SweepSettings) -> Self {
        Self {
            store,
            channel,
            engine: SweepEngine::new(config),
            settings,
        }
    }

    /// Runs a full sweep: evaluate every affiliate, rewrite the portal
    /// documents, then deliver talk-page notices and staff digests.
    pub fn run(&self, now: NaiveDateTime) -> Result<SweepSummary, SweepError> {
        let snapshot = self.load()?;
        let organizations_seen = snapshot.organizations.len();
        let outcome = self.engine.evaluate(
            snapshot.organizations,
            &snapshot.activity_reports,
            &snapshot.financial_reports,
            now,
        );

        let updated: Vec<RecordFields> = outcome
            .organizations
            .iter()
            .map(|record| record.fields().clone())
            .collect();
        self.store
            .overwrite(PortalDocument::Organizations, &updated)?;

        let log_entries_appended = outcome.log_entries.len();
        let mut log_write_failed = false;
        if !outcome.log_entries.is_empty() {
            let mut log_records = snapshot.log_records;
            log_records.extend(outcome.log_entries.iter().map(|entry| entry.to_fields()));
            if let Err(err) = self
                .store
                .overwrite(PortalDocument::ComplianceLog, &log_records)
            {
                error!(error = %err, "compliance log append failed; levels are already persisted");
                log_write_failed = true;
            }
        }

        let dispatcher = NoticeDispatcher::new(Arc::clone(&self.channel));
        let mut notices_delivered = 0;
        let mut notices_failed = 0;
        for notice in &outcome.notices {
            match dispatcher.deliver(notice) {
                Ok(()) => notices_delivered += 1,
                Err(err) => {
                    warn!(
                        group = %notice.group_name,
                        error = %err,
                        "talk-page notice delivery failed"
                    );
                    notices_failed += 1;
                }
            }
        }

        let (emails_sent, emails_failed) = self.send_staff_digests(&outcome, now);

        info!(
            organizations = organizations_seen,
            transitions = outcome.transitions.len(),
            notices_delivered,
            notices_failed,
            "compliance sweep finished"
        );

        Ok(summarize(
            &outcome,
            now,
            organizations_seen,
            DeliveryTally {
                dry_run: false,
                notices_delivered,
                notices_failed,
                emails_sent,
                emails_failed,
                log_entries_appended: if log_write_failed {
                    0
                } else {
                    log_entries_appended
                },
                log_write_failed,
            },
        ))
    }

    /// Evaluates the ladder without writing or notifying anything.
    pub fn preview(&self, now: NaiveDateTime) -> Result<SweepSummary, SweepError> {
        let snapshot = self.load()?;
        let organizations_seen = snapshot.organizations.len();
        let outcome = self.engine.evaluate(
            snapshot.organizations,
            &snapshot.activity_reports,
            &snapshot.financial_reports,
            now,
        );

        Ok(summarize(
            &outcome,
            now,
            organizations_seen,
            DeliveryTally {
                dry_run: true,
                ..DeliveryTally::default()
            },
        ))
    }

    /// Current affiliate standings for the read-only listing endpoint.
    pub fn organizations(&self) -> Result<Vec<OrganizationStatusView>, SweepError> {
        let records = self.store.fetch(PortalDocument::Organizations)?;
        Ok(records
            .into_iter()
            .map(OrganizationRecord::from_fields)
            .map(|record| OrganizationStatusView::from_record(&record))
            .collect())
    }

    fn load(&self) -> Result<PortalSnapshot, SweepError> {
        let organizations = self
            .store
            .fetch(PortalDocument::Organizations)?
            .into_iter()
            .map(OrganizationRecord::from_fields)
            .collect();
        let activity_reports = decode_reports(&self.store.fetch(PortalDocument::ActivityReports)?);
        let financial_reports =
            decode_reports(&self.store.fetch(PortalDocument::FinancialReports)?);
        let log_records = self.store.fetch(PortalDocument::ComplianceLog)?;

        Ok(PortalSnapshot {
            organizations,
            activity_reports,
            financial_reports,
            log_records,
        })
    }

    /// Emails the escalation lists and the transition digest to the
    /// compliance staff alias, copying the monitoring alias.
    fn send_staff_digests(&self, outcome: &SweepOutcome, now: NaiveDateTime) -> (usize, usize) {
        let mut sent = 0;
        let mut failed = 0;
        let recipients = [
            self.settings.compliance_staff.as_str(),
            self.settings.monitoring_copy.as_str(),
        ];

        let mut digests = Vec::new();
        if !outcome.escalated_to_four.is_empty() {
            digests.push(escalation_digest(4, &outcome.escalated_to_four));
        }
        if !outcome.escalated_to_five.is_empty() {
            digests.push(escalation_digest(5, &outcome.escalated_to_five));
        }
        if !outcome.transitions.is_empty() {
            digests.push(transition_digest(outcome, now));
        }

        for (subject, body) in &digests {
            for recipient in recipients {
                match self.channel.send_email(subject, body, recipient) {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        warn!(recipient, error = %err, "staff digest email failed");
                        failed += 1;
                    }
                }
            }
        }

        (sent, failed)
    }
}

struct PortalSnapshot {
    organizations: Vec<OrganizationRecord>,
    activity_reports: Vec<Report>,
    financial_reports: Vec<Report>,
    log_records: Vec<RecordFields>,
}

fn decode_reports(records: &[RecordFields]) -> Vec<Report> {
    records.iter().filter_map(Report::from_fields).collect()
}

#[derive(Default)]
struct DeliveryTally {
    dry_run: bool,
    notices_delivered: usize,
    notices_failed: usize,
    emails_sent: usize,
    emails_failed: usize,
    log_entries_appended: usize,
    log_write_failed: bool,
}

fn summarize(
    outcome: &SweepOutcome,
    now: NaiveDateTime,
    organizations_seen: usize,
    tally: DeliveryTally,
) -> SweepSummary {
    SweepSummary {
        ran_at: now,
        dry_run: tally.dry_run,
        organizations_seen,
        transitions: outcome
            .transitions
            .iter()
            .map(TransitionView::from_transition)
            .collect(),
        escalated_to_four: outcome.escalated_to_four.clone(),
        escalated_to_five: outcome.escalated_to_five.clone(),
        notices_delivered: tally.notices_delivered,
        notices_failed: tally.notices_failed,
        emails_sent: tally.emails_sent,
        emails_failed: tally.emails_failed,
        log_entries_appended: tally.log_entries_appended,
        log_write_failed: tally.log_write_failed,
        records_missing_due_date: outcome.records_missing_due_date,
    }
}

fn escalation_digest(level: u8, groups: &[String]) -> (String, String) {
    let subject = format!("Affiliates escalated to out-of-compliance level {level}");
    let mut body = String::new();
    writeln!(
        body,
        "The compliance sweep moved the following affiliates to level {level}:"
    )
    .expect("write digest intro");
    for group in groups {
        writeln!(body, "- {group}").expect("write digest row");
    }
    body.push('\n');
    writeln!(
        body,
        "Please review their reporting status on the affiliates data portal."
    )
    .expect("write digest footer");
    (subject, body)
}

fn transition_digest(outcome: &SweepOutcome, now: NaiveDateTime) -> (String, String) {
    let subject = format!(
        "Compliance sweep digest for {}",
        now.format("%Y-%m-%d")
    );
    let mut body = String::new();
    writeln!(
        body,
        "{} affiliate(s) changed out-of-compliance level during this sweep:",
        outcome.transitions.len()
    )
    .expect("write digest intro");
    for transition in &outcome.transitions {
        writeln!(
            body,
            "- {}: level {} to level {}",
            transition.group_name, transition.from, transition.to
        )
        .expect("write digest row");
    }
    (subject, body)
}

/// Error raised by the sweep service.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
