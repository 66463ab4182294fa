//! Latest-report selection and report-year arithmetic.

use chrono::Datelike;

use super::domain::{Report, NEVER_FILED_YEAR};

/// Picks the most recently submitted report for a group, comparing by
/// submission date only (time of day is noise in portal data). With no
/// reports on file the never-filed placeholder is returned. When two
/// reports share a date the first encountered wins; input order is not
/// part of the contract.
pub fn latest_report(group_name: &str, reports: &[Report]) -> Report {
    reports
        .iter()
        .filter(|report| report.group_name == group_name)
        .fold(None::<&Report>, |best, report| match best {
            Some(current) if report.submitted.date() > current.submitted.date() => Some(report),
            Some(current) => Some(current),
            None => Some(report),
        })
        .cloned()
        .unwrap_or_else(|| Report::placeholder(group_name))
}

/// The year an affiliate last reported for, or the fact that it never
/// has. Collapsing the placeholder into [`ReportYear::NeverFiled`] keeps
/// sentinel arithmetic out of the ladder rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportYear {
    Filed(i32),
    NeverFiled,
}

impl ReportYear {
    pub fn from_report(report: &Report) -> Self {
        let year = report.end_date.year();
        if year <= NEVER_FILED_YEAR {
            ReportYear::NeverFiled
        } else {
            ReportYear::Filed(year)
        }
    }

    pub const fn filed(self) -> Option<i32> {
        match self {
            ReportYear::Filed(year) => Some(year),
            ReportYear::NeverFiled => None,
        }
    }

    /// A report for an earlier year than `current_year`, or none at all.
    pub fn is_stale(self, current_year: i32) -> bool {
        match self {
            ReportYear::Filed(year) => year < current_year,
            ReportYear::NeverFiled => true,
        }
    }

    /// True only for an actual filing covering `year` or earlier.
    pub fn filed_by(self, year: i32) -> bool {
        matches!(self, ReportYear::Filed(filed) if filed <= year)
    }

    /// True for an actual filing at most `slack_years` behind the
    /// current year.
    pub fn filed_within(self, current_year: i32, slack_years: i32) -> bool {
        matches!(self, ReportYear::Filed(filed) if current_year - filed <= slack_years)
    }

    /// The filed year, with never-filed reading as the sentinel year.
    /// Gap arithmetic leans on this: a missing report is arbitrarily
    /// old, not unknown.
    pub const fn year_or_sentinel(self) -> i32 {
        match self {
            ReportYear::Filed(year) => year,
            ReportYear::NeverFiled => NEVER_FILED_YEAR,
        }
    }
}

/// Absolute activity/financial report-year distance. A stream that was
/// never filed counts as the sentinel year, so one live stream plus one
/// missing stream reads as a very large gap, and two missing streams as
/// a gap of zero.
pub fn year_gap(activity: ReportYear, financial: ReportYear) -> i32 {
    (activity.year_or_sentinel() - financial.year_or_sentinel()).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn report(group: &str, end: (i32, u32, u32), submitted: (i32, u32, u32)) -> Report {
        Report {
            group_name: group.to_string(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).expect("valid end date"),
            submitted: NaiveDate::from_ymd_opt(submitted.0, submitted.1, submitted.2)
                .expect("valid submission date")
                .and_time(NaiveTime::MIN),
        }
    }

    #[test]
    fn picks_most_recent_submission_for_the_group() {
        let reports = vec![
            report("Alpha", (2024, 12, 31), (2025, 1, 10)),
            report("Alpha", (2025, 12, 31), (2026, 1, 5)),
            report("Beta", (2025, 12, 31), (2026, 2, 1)),
        ];

        let latest = latest_report("Alpha", &reports);
        assert_eq!(latest.end_date.year(), 2025);
    }

    #[test]
    fn missing_reports_resolve_to_the_never_filed_placeholder() {
        let latest = latest_report("Gamma", &[]);
        assert_eq!(ReportYear::from_report(&latest), ReportYear::NeverFiled);
        assert!(ReportYear::from_report(&latest).is_stale(2026));
    }

    #[test]
    fn staleness_and_filing_checks_disagree_about_never_filed() {
        assert!(ReportYear::NeverFiled.is_stale(2026));
        assert!(!ReportYear::NeverFiled.filed_by(2026));
        assert!(!ReportYear::NeverFiled.filed_within(2026, 1));
        assert!(ReportYear::Filed(2025).is_stale(2026));
        assert!(ReportYear::Filed(2025).filed_by(2026));
        assert!(ReportYear::Filed(2025).filed_within(2026, 1));
        assert!(!ReportYear::Filed(2024).filed_within(2026, 1));
    }

    #[test]
    fn year_gap_is_symmetric_and_sentinel_backed() {
        assert_eq!(year_gap(ReportYear::Filed(2025), ReportYear::Filed(2023)), 2);
        assert_eq!(year_gap(ReportYear::Filed(2023), ReportYear::Filed(2025)), 2);
        assert_eq!(
            year_gap(ReportYear::Filed(2025), ReportYear::NeverFiled),
            2025 - NEVER_FILED_YEAR
        );
        assert_eq!(year_gap(ReportYear::NeverFiled, ReportYear::NeverFiled), 0);
    }
}
