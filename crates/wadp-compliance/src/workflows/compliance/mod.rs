//! Out-of-compliance sweep for affiliate reporting.
//!
//! Each sweep decodes the four portal documents, walks every affiliate
//! through the level ladder (0 compliant through 5 escalated), rewrites
//! the organization manifest and the compliance log, and drives
//! talk-page and staff-email outreach. Records the sweep cannot reason
//! about pass through untouched; the manifest is always rewritten in
//! full and in order.

pub mod dates;
pub mod domain;
pub(crate) mod evaluation;
pub mod notices;
pub mod recency;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;
pub mod summary;

#[cfg(test)]
mod tests;

pub use domain::{
    ComplianceLogEntry, OocLevel, OrgType, OrganizationRecord, RecognitionStatus, Report,
    ReportingStatus,
};
pub use evaluation::{SweepConfig, SweepEngine, SweepOutcome, Transition};
pub use notices::{NoticeDispatcher, NoticeKind, NoticeRequest, ReminderStage};
pub use recency::{latest_report, ReportYear};
pub use repository::{DocumentStore, NotificationChannel, NotifyError, PortalDocument, StoreError};
pub use router::sweep_router;
pub use service::{ComplianceSweepService, SweepError};
pub use store::LuaFileStore;
pub use summary::{OrganizationStatusView, SweepSummary, TransitionView};
