//! Talk-page notice templates and delivery.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::NaiveDate;

use super::dates;
use super::domain::OocLevel;
use super::repository::{NotificationChannel, NotifyError};

/// Which template a notice uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    UpcomingDueDate,
    PastDue(ReminderStage),
}

/// Escalation stages named in past-due headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderStage {
    InitialReview,
    FirstReminder,
    SecondReminder,
    ThirdReminder,
}

impl ReminderStage {
    pub const fn label(self) -> &'static str {
        match self {
            ReminderStage::InitialReview => "Initial Review",
            ReminderStage::FirstReminder => "First Reminder",
            ReminderStage::SecondReminder => "Second Reminder",
            ReminderStage::ThirdReminder => "Third Reminder",
        }
    }
}

/// A notice the sweep wants posted to an affiliate's talk page.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeRequest {
    pub group_name: String,
    pub kind: NoticeKind,
    pub level: OocLevel,
    pub due_date: Option<NaiveDate>,
    pub contacts: Vec<String>,
}

impl NoticeRequest {
    pub fn talk_page(&self) -> String {
        format!("Talk:{}", self.group_name)
    }

    pub fn heading(&self) -> String {
        match self.kind {
            NoticeKind::UpcomingDueDate => "== Upcoming reporting due date ==".to_string(),
            NoticeKind::PastDue(stage) => format!(
                "== Notification of affiliate expiration - renewal pending submission of reporting ({}) ==",
                stage.label()
            ),
        }
    }

    /// Full wikitext body, heading included, signed for the bot account.
    pub fn render(&self) -> String {
        let mut body = String::new();
        writeln!(body, "{}", self.heading()).expect("write heading");
        writeln!(body, "{},", greeting(&self.contacts)).expect("write greeting");
        body.push('\n');

        match self.kind {
            NoticeKind::UpcomingDueDate => {
                writeln!(
                    body,
                    "This is a friendly reminder that the reporting due date for {} is coming up{}. \
                     Please submit your activity report (and financial report, where applicable) \
                     before the deadline to stay in good standing.",
                    self.group_name,
                    self.due_date
                        .map(|due| format!(" on {}", dates::format_date(due)))
                        .unwrap_or_default()
                )
                .expect("write upcoming body");
            }
            NoticeKind::PastDue(stage) => {
                writeln!(
                    body,
                    "Our records show that {} has passed its reporting due date{} and is now at \
                     out-of-compliance level {} ({}). Please submit the outstanding report(s) as \
                     soon as possible so recognition is not put at risk.",
                    self.group_name,
                    self.due_date
                        .map(|due| format!(" of {}", dates::format_date(due)))
                        .unwrap_or_default(),
                    self.level,
                    stage.label()
                )
                .expect("write past-due body");
            }
        }

        body.push('\n');
        body.push_str("~~~~\n");
        body
    }
}

fn greeting(contacts: &[String]) -> String {
    if contacts.is_empty() {
        "Dear group contacts".to_string()
    } else {
        format!("Dear {}", contacts.join(" and "))
    }
}

/// Posts notices through the channel seam, resolving the talk target
/// first so redirected group pages still get their message.
pub struct NoticeDispatcher<N> {
    channel: Arc<N>,
}

impl<N: NotificationChannel> NoticeDispatcher<N> {
    pub fn new(channel: Arc<N>) -> Self {
        Self { channel }
    }

    pub fn deliver(&self, notice: &NoticeRequest) -> Result<(), NotifyError> {
        let target = self.channel.resolve_talk_target(&notice.talk_page())?;
        self.channel.append_to_talk(&target, &notice.render())
    }
}
