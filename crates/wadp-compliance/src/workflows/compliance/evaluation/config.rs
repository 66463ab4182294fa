use serde::{Deserialize, Serialize};

/// Ladder thresholds. Defaults mirror the affiliate agreements: User
/// Groups report on a 30-day runway, chapters and thematic
/// organizations on 120, and reminders land 30, 60, and 90 days past
/// due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub user_group_due_window_days: i64,
    pub chapter_due_window_days: i64,
    pub first_reminder_after_days: i64,
    pub second_reminder_after_days: i64,
    pub third_reminder_after_days: i64,
    /// Activity and financial report years at least this far apart are
    /// treated as misaligned.
    pub report_alignment_gap_years: i32,
    /// Extra years of activity-report lag tolerated for affiliates on a
    /// declared fiscal year.
    pub fiscal_year_slack_years: i32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            user_group_due_window_days: 30,
            chapter_due_window_days: 120,
            first_reminder_after_days: 30,
            second_reminder_after_days: 60,
            third_reminder_after_days: 90,
            report_alignment_gap_years: 2,
            fiscal_year_slack_years: 1,
        }
    }
}
