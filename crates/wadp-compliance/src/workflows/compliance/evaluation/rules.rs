//! The transition ladder. Rules are pure: each inspects a record plus
//! its resolved context and either plans a transition or declines. The
//! engine walks [`LADDER`] in declaration order and the first match
//! wins, so a record changes level at most once per sweep.

use super::super::domain::{OocLevel, OrgType, OrganizationRecord, ReportingStatus};
use super::super::notices::{NoticeKind, ReminderStage};
use super::super::recency::ReportYear;
use super::context::ReportContext;

/// Which staff aggregate email a transition feeds, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EscalationBucket {
    LevelFour,
    LevelFive,
}

/// A transition one rule wants applied to its record.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedTransition {
    pub to: OocLevel,
    pub mark: Option<ReportingStatus>,
    pub advance_due_date: bool,
    pub engage_bypass: bool,
    pub note: Option<&'static str>,
    pub notice: Option<NoticeKind>,
    pub bucket: Option<EscalationBucket>,
}

impl PlannedTransition {
    fn to_level(to: OocLevel) -> Self {
        Self {
            to,
            mark: None,
            advance_due_date: false,
            engage_bypass: false,
            note: None,
            notice: None,
            bucket: None,
        }
    }
}

pub(crate) struct TransitionRule {
    pub name: &'static str,
    pub apply: fn(&OrganizationRecord, &ReportContext) -> Option<PlannedTransition>,
}

pub(crate) const LADDER: &[TransitionRule] = &[
    TransitionRule {
        name: "missing-financial-report-escalation",
        apply: missing_financial_report_escalation,
    },
    TransitionRule {
        name: "due-soon",
        apply: due_soon,
    },
    TransitionRule {
        name: "due-soon-cleared",
        apply: due_soon_cleared,
    },
    TransitionRule {
        name: "initial-review",
        apply: initial_review,
    },
    TransitionRule {
        name: "first-filing-missed",
        apply: first_filing_missed,
    },
    TransitionRule {
        name: "review-cleared",
        apply: review_cleared,
    },
    TransitionRule {
        name: "first-reminder",
        apply: first_reminder,
    },
    TransitionRule {
        name: "second-reminder",
        apply: second_reminder,
    },
    TransitionRule {
        name: "final-escalation",
        apply: final_escalation,
    },
];

/// Chapters and thematic organizations owe financial reports. One that
/// is past due and has activity reports on file, but never filed a
/// financial report (or let it fall years behind while the activity
/// report also went stale), leaves the ladder entirely: straight to
/// level 5 with autochecks disengaged and a staff note, no talk notice.
fn missing_financial_report_escalation(
    record: &OrganizationRecord,
    ctx: &ReportContext,
) -> Option<PlannedTransition> {
    if !record.org_type().is_some_and(OrgType::chapter_like) || ctx.days_past_due <= 0 {
        return None;
    }
    if ctx.activity_year == ReportYear::NeverFiled {
        return None;
    }

    let planned = |note| {
        Some(PlannedTransition {
            engage_bypass: true,
            note: Some(note),
            bucket: Some(EscalationBucket::LevelFive),
            ..PlannedTransition::to_level(OocLevel::ESCALATED)
        })
    };

    if ctx.financial_year == ReportYear::NeverFiled {
        return planned("No financial report");
    }

    let financial_long_stale = ctx
        .financial_year
        .filed()
        .is_some_and(|year| ctx.current_year - year > ctx.config.report_alignment_gap_years);
    if financial_long_stale && ctx.activity_year.is_stale(ctx.current_year) {
        return planned("Financial reporting stalled");
    }

    None
}

/// 0 -> 1 once the due date enters the org-type window, unless the
/// latest activity report already covers the current year.
fn due_soon(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(OocLevel::COMPLIANT) {
        return None;
    }
    let org_type = record.org_type()?;
    if !ctx.inside_due_window(org_type) {
        return None;
    }

    let applies = match record.uptodate_reporting() {
        Some(ReportingStatus::TickNew) => true,
        Some(ReportingStatus::Tick) => ctx.activity_year.is_stale(ctx.current_year),
        _ => false,
    };

    applies.then(|| PlannedTransition {
        notice: Some(NoticeKind::UpcomingDueDate),
        ..PlannedTransition::to_level(OocLevel::DUE_SOON)
    })
}

/// 1 -> 0 for an affiliate that filed while its due date was still
/// ahead. The due date rolls forward and a first-time filer graduates
/// from `Tick-N` to `Tick`.
fn due_soon_cleared(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(OocLevel::DUE_SOON) {
        return None;
    }
    if ctx.days_until_due <= 0 || !ctx.activity_year.filed_by(ctx.current_year) {
        return None;
    }

    let mark = (record.uptodate_reporting() == Some(ReportingStatus::TickNew))
        .then_some(ReportingStatus::Tick);

    Some(PlannedTransition {
        mark,
        advance_due_date: true,
        ..PlannedTransition::to_level(OocLevel::COMPLIANT)
    })
}

/// 1 -> 2 when the due date passes and the org-type staleness rule
/// holds. The marker flips to `Cross` and the affiliate receives the
/// first past-due notice.
fn initial_review(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(OocLevel::DUE_SOON)
        || record.uptodate_reporting() != Some(ReportingStatus::Tick)
    {
        return None;
    }
    if ctx.days_past_due <= 0 || !reporting_stale_for_review(record, ctx) {
        return None;
    }

    Some(PlannedTransition {
        mark: Some(ReportingStatus::Cross),
        notice: Some(NoticeKind::PastDue(ReminderStage::InitialReview)),
        ..PlannedTransition::to_level(OocLevel::INITIAL_REVIEW)
    })
}

/// 1 -> 2 for first-time filers that missed their very first deadline.
/// No notice here; the `Cross-N` marker alone drives the reminder rungs.
fn first_filing_missed(
    record: &OrganizationRecord,
    ctx: &ReportContext,
) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(OocLevel::DUE_SOON)
        || record.uptodate_reporting() != Some(ReportingStatus::TickNew)
        || ctx.days_past_due <= 0
    {
        return None;
    }

    Some(PlannedTransition {
        mark: Some(ReportingStatus::CrossNew),
        ..PlannedTransition::to_level(OocLevel::INITIAL_REVIEW)
    })
}

/// 2/3/4 -> 0 once the activity report is current again and the
/// financial picture lines up. The marker returns to `Tick` and the due
/// date rolls forward.
fn review_cleared(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    let in_review = matches!(
        record.ooc_level(),
        Some(level) if (OocLevel::INITIAL_REVIEW..=OocLevel::SECOND_REMINDER).contains(&level)
    );
    if !in_review || !ctx.activity_report_current() || !alignment_satisfied(record, ctx) {
        return None;
    }

    Some(PlannedTransition {
        mark: Some(ReportingStatus::Tick),
        advance_due_date: true,
        ..PlannedTransition::to_level(OocLevel::COMPLIANT)
    })
}

/// 2 -> 3 thirty days past due, or immediately for `Cross-N` filers.
fn first_reminder(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    reminder_rung(
        record,
        ctx,
        ReminderPlan {
            from: OocLevel::INITIAL_REVIEW,
            to: OocLevel::FIRST_REMINDER,
            threshold_days: ctx.config.first_reminder_after_days,
            stage: ReminderStage::FirstReminder,
            bucket: None,
        },
    )
}

/// 3 -> 4 sixty days past due; these transitions feed the staff
/// escalation mail.
fn second_reminder(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    reminder_rung(
        record,
        ctx,
        ReminderPlan {
            from: OocLevel::FIRST_REMINDER,
            to: OocLevel::SECOND_REMINDER,
            threshold_days: ctx.config.second_reminder_after_days,
            stage: ReminderStage::SecondReminder,
            bucket: Some(EscalationBucket::LevelFour),
        },
    )
}

/// 4 -> 5 ninety days past due once the report streams confirm the
/// escalation, or immediately for `Cross-N` filers. Autochecks are
/// disengaged; staff take over from here.
fn final_escalation(record: &OrganizationRecord, ctx: &ReportContext) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(OocLevel::SECOND_REMINDER) {
        return None;
    }

    let fires = match record.uptodate_reporting() {
        Some(ReportingStatus::CrossNew) => true,
        Some(ReportingStatus::Cross) => {
            ctx.days_past_due > ctx.config.third_reminder_after_days
                && reporting_stale_for_review(record, ctx)
                && escalation_confirmed(record, ctx)
        }
        _ => false,
    };

    fires.then(|| PlannedTransition {
        engage_bypass: true,
        notice: Some(NoticeKind::PastDue(ReminderStage::ThirdReminder)),
        bucket: Some(EscalationBucket::LevelFive),
        ..PlannedTransition::to_level(OocLevel::ESCALATED)
    })
}

struct ReminderPlan {
    from: OocLevel,
    to: OocLevel,
    threshold_days: i64,
    stage: ReminderStage,
    bucket: Option<EscalationBucket>,
}

fn reminder_rung(
    record: &OrganizationRecord,
    ctx: &ReportContext,
    plan: ReminderPlan,
) -> Option<PlannedTransition> {
    if record.ooc_level() != Some(plan.from) {
        return None;
    }

    let fires = match record.uptodate_reporting() {
        Some(ReportingStatus::CrossNew) => true,
        Some(ReportingStatus::Cross) => {
            ctx.days_past_due > plan.threshold_days && reporting_stale_for_review(record, ctx)
        }
        _ => false,
    };

    fires.then(|| PlannedTransition {
        notice: Some(NoticeKind::PastDue(plan.stage)),
        bucket: plan.bucket,
        ..PlannedTransition::to_level(plan.to)
    })
}

/// The org-type staleness test behind every past-due rung. The activity
/// report must be stale in every arm; what the financial stream must
/// look like depends on who owes one.
fn reporting_stale_for_review(record: &OrganizationRecord, ctx: &ReportContext) -> bool {
    if !ctx.activity_year.is_stale(ctx.current_year) {
        return false;
    }
    match record.org_type() {
        Some(OrgType::UserGroup) if record.is_legal_entity() => !ctx.reports_aligned(),
        Some(OrgType::UserGroup) => true,
        Some(OrgType::Chapter) | Some(OrgType::ThematicOrganization) => ctx.reports_aligned(),
        _ => false,
    }
}

/// Financial-side check for clearing a review level. User Groups
/// without a legal entity owe no financial report.
fn alignment_satisfied(record: &OrganizationRecord, ctx: &ReportContext) -> bool {
    match record.org_type() {
        Some(OrgType::UserGroup) if !record.is_legal_entity() => true,
        Some(_) => ctx.reports_aligned(),
        None => false,
    }
}

/// At the final rung the two report streams tell opposite stories: a
/// User Group escalates when they drifted apart, a chapter-like
/// affiliate when they stayed aligned. Drifted chapters were already
/// removed by the forced escalation, so the aligned-but-ancient case is
/// what remains for them.
fn escalation_confirmed(record: &OrganizationRecord, ctx: &ReportContext) -> bool {
    match record.org_type() {
        Some(OrgType::UserGroup) => !ctx.reports_aligned(),
        Some(OrgType::Chapter) | Some(OrgType::ThematicOrganization) => ctx.reports_aligned(),
        _ => false,
    }
}
