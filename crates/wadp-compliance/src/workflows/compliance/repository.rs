use crate::codec::{CodecError, RecordFields};

/// The four portal documents the sweep touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalDocument {
    Organizations,
    ActivityReports,
    FinancialReports,
    ComplianceLog,
}

impl PortalDocument {
    /// On-wiki page title.
    pub const fn title(self) -> &'static str {
        match self {
            PortalDocument::Organizations => "Module:Organizational Informations",
            PortalDocument::ActivityReports => "Module:Activities Reports",
            PortalDocument::FinancialReports => "Module:Financial Reports",
            PortalDocument::ComplianceLog => "Module:Out Of Compliance Level",
        }
    }

    /// File name used by directory-backed stores.
    pub const fn file_name(self) -> &'static str {
        match self {
            PortalDocument::Organizations => "organizational_informations.lua",
            PortalDocument::ActivityReports => "activities_reports.lua",
            PortalDocument::FinancialReports => "financial_reports.lua",
            PortalDocument::ComplianceLog => "out_of_compliance_level.lua",
        }
    }
}

/// Storage abstraction over the portal documents so the sweep can be
/// exercised against memory, files, or a live wiki.
pub trait DocumentStore: Send + Sync {
    fn fetch(&self, document: PortalDocument) -> Result<Vec<RecordFields>, StoreError>;
    fn overwrite(
        &self,
        document: PortalDocument,
        records: &[RecordFields],
    ) -> Result<(), StoreError>;
}

/// Error enumeration for document-store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document '{0}' not found")]
    NotFound(&'static str),
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("document '{title}' is malformed: {source}")]
    Malformed {
        title: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("write to '{title}' rejected: {reason}")]
    WriteRejected { title: &'static str, reason: String },
}

/// Outbound seam for talk-page posts and staff email.
pub trait NotificationChannel: Send + Sync {
    /// Resolves a talk-page title to its canonical target, following
    /// redirects where the backend knows about them.
    fn resolve_talk_target(&self, title: &str) -> Result<String, NotifyError>;
    fn append_to_talk(&self, title: &str, text: &str) -> Result<(), NotifyError>;
    fn send_email(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError>;
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("talk target '{0}' cannot be resolved")]
    UnresolvedTarget(String),
    #[error("notification transport failed: {0}")]
    Transport(String),
}
