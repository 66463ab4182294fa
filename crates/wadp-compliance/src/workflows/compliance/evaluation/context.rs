use chrono::{Datelike, NaiveDate, NaiveDateTime};

use super::super::domain::{OrgType, OrganizationRecord, Report};
use super::super::recency::{self, latest_report, ReportYear};
use super::config::SweepConfig;

/// Everything the ladder needs to know about one affiliate at one
/// instant, resolved up front so the rules stay pure lookups.
#[derive(Debug, Clone)]
pub(crate) struct ReportContext {
    pub config: SweepConfig,
    pub current_year: i32,
    pub activity_year: ReportYear,
    pub financial_year: ReportYear,
    pub days_until_due: i64,
    pub days_past_due: i64,
    pub declares_fiscal_year: bool,
}

impl ReportContext {
    pub fn assemble(
        record: &OrganizationRecord,
        due: NaiveDate,
        activity_reports: &[Report],
        financial_reports: &[Report],
        config: &SweepConfig,
        now: NaiveDateTime,
    ) -> Self {
        let today = now.date();
        let days_until_due = due.signed_duration_since(today).num_days();

        let activity = latest_report(record.group_name(), activity_reports);
        let financial = latest_report(record.group_name(), financial_reports);

        Self {
            config: config.clone(),
            current_year: today.year(),
            activity_year: ReportYear::from_report(&activity),
            financial_year: ReportYear::from_report(&financial),
            days_until_due,
            days_past_due: -days_until_due,
            declares_fiscal_year: record.declares_fiscal_year(),
        }
    }

    pub fn due_window_days(&self, org_type: OrgType) -> i64 {
        if org_type == OrgType::UserGroup {
            self.config.user_group_due_window_days
        } else {
            self.config.chapter_due_window_days
        }
    }

    pub fn inside_due_window(&self, org_type: OrgType) -> bool {
        (0..=self.due_window_days(org_type)).contains(&self.days_until_due)
    }

    /// Current enough to clear a review level: this year's report, or
    /// last year's for declared-fiscal-year affiliates.
    pub fn activity_report_current(&self) -> bool {
        let slack = if self.declares_fiscal_year {
            self.config.fiscal_year_slack_years
        } else {
            0
        };
        self.activity_year.filed_within(self.current_year, slack)
    }

    pub fn reports_aligned(&self) -> bool {
        recency::year_gap(self.activity_year, self.financial_year)
            < self.config.report_alignment_gap_years
    }
}
