use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

use crate::codec::RecordFields;
use crate::config::SweepSettings;
use crate::workflows::compliance::domain::{OrganizationRecord, Report};
use crate::workflows::compliance::evaluation::{SweepConfig, SweepEngine, SweepOutcome};
use crate::workflows::compliance::repository::{
    DocumentStore, NotificationChannel, NotifyError, PortalDocument, StoreError,
};
use crate::workflows::compliance::service::ComplianceSweepService;

/// Every fixture is anchored to one sweep instant so day arithmetic in
/// the tests stays literal.
pub(super) const SWEEP_YEAR: i32 = 2026;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn sweep_now() -> NaiveDateTime {
    date(SWEEP_YEAR, 8, 15)
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

/// Builder over the raw field map. Defaults describe a recognised
/// affiliate at level 0 whose due date is far enough out that no rule
/// fires until a test moves it.
pub(super) struct OrgFixture {
    fields: RecordFields,
}

impl OrgFixture {
    pub(super) fn user_group(name: &str) -> Self {
        Self::with_type(name, "User Group")
    }

    pub(super) fn chapter(name: &str) -> Self {
        Self::with_type(name, "Chapter")
    }

    pub(super) fn thematic(name: &str) -> Self {
        Self::with_type(name, "Thematic Organization")
    }

    fn with_type(name: &str, org_type: &str) -> Self {
        let mut fields = RecordFields::new();
        fields.insert("group_name".to_string(), name.to_string());
        fields.insert("org_type".to_string(), org_type.to_string());
        fields.insert("recognition_status".to_string(), "recognised".to_string());
        fields.insert("legal_entity".to_string(), "No".to_string());
        fields.insert("me_bypass_ooc_autochecks".to_string(), "No".to_string());
        fields.insert("out_of_compliance_level".to_string(), "0".to_string());
        fields.insert("uptodate_reporting".to_string(), "Tick".to_string());
        fields.insert("agreement_date".to_string(), "2015-06-01".to_string());
        fields.insert("reporting_due_date".to_string(), "2027-03-01".to_string());
        Self { fields }
    }

    pub(super) fn set(mut self, key: &str, value: &str) -> Self {
        self.fields.insert(key.to_string(), value.to_string());
        self
    }

    pub(super) fn level(self, level: u8) -> Self {
        let value = level.to_string();
        self.set("out_of_compliance_level", &value)
    }

    pub(super) fn marker(self, marker: &str) -> Self {
        self.set("uptodate_reporting", marker)
    }

    pub(super) fn due(self, due: &str) -> Self {
        self.set("reporting_due_date", due)
    }

    pub(super) fn agreement(self, date: &str) -> Self {
        self.set("agreement_date", date)
    }

    pub(super) fn legal_entity(self) -> Self {
        self.set("legal_entity", "Yes")
    }

    pub(super) fn fiscal_year(self) -> Self {
        self.set("fiscal_year_start", "07-01")
    }

    pub(super) fn recognition(self, status: &str) -> Self {
        self.set("recognition_status", status)
    }

    pub(super) fn bypassed(self) -> Self {
        self.set("me_bypass_ooc_autochecks", "Yes")
    }

    pub(super) fn contacts(self, first: &str, second: &str) -> Self {
        self.set("group_contact1", first)
            .set("group_contact2", second)
    }

    pub(super) fn fields(self) -> RecordFields {
        self.fields
    }

    pub(super) fn record(self) -> OrganizationRecord {
        OrganizationRecord::from_fields(self.fields)
    }
}

/// A report whose end date closes `end_year` and was submitted early
/// the following January.
pub(super) fn report(group: &str, end_year: i32) -> Report {
    Report {
        group_name: group.to_string(),
        end_date: date(end_year, 12, 31),
        submitted: date(end_year + 1, 1, 15).and_time(NaiveTime::MIN),
    }
}

/// Wire form of [`report`] for store-backed tests.
pub(super) fn report_fields(group: &str, end_year: i32) -> RecordFields {
    let mut fields = RecordFields::new();
    fields.insert("group_name".to_string(), group.to_string());
    fields.insert("end_date".to_string(), format!("{end_year}-12-31"));
    fields.insert(
        "submission_date".to_string(),
        format!("{}-01-15 09:30:00", end_year + 1),
    );
    fields
}

pub(super) fn evaluate_one(
    record: OrganizationRecord,
    activity: &[Report],
    financial: &[Report],
) -> SweepOutcome {
    SweepEngine::new(SweepConfig::default()).evaluate(vec![record], activity, financial, sweep_now())
}

pub(super) fn evaluate_many(
    records: Vec<OrganizationRecord>,
    activity: &[Report],
    financial: &[Report],
) -> SweepOutcome {
    SweepEngine::new(SweepConfig::default()).evaluate(records, activity, financial, sweep_now())
}

pub(super) fn sweep_settings() -> SweepSettings {
    SweepSettings {
        data_dir: PathBuf::from("./data"),
        compliance_staff: "Compliance-Team".to_string(),
        monitoring_copy: "Compliance-Monitoring".to_string(),
    }
}

pub(super) fn build_service(
    store: Arc<MemoryStore>,
    channel: Arc<MemoryChannel>,
) -> ComplianceSweepService<MemoryStore, MemoryChannel> {
    ComplianceSweepService::new(store, channel, SweepConfig::default(), sweep_settings())
}

/// In-memory document store. Fetching an unseeded document fails the
/// same way a missing wiki page does.
#[derive(Default)]
pub(super) struct MemoryStore {
    documents: Mutex<HashMap<PortalDocument, Vec<RecordFields>>>,
    rejected: Mutex<HashSet<PortalDocument>>,
}

impl MemoryStore {
    /// A store with the given organizations and the other three
    /// documents present but empty.
    pub(super) fn seeded(organizations: Vec<RecordFields>) -> Arc<Self> {
        let store = Self::default();
        store.seed(PortalDocument::Organizations, organizations);
        store.seed(PortalDocument::ActivityReports, Vec::new());
        store.seed(PortalDocument::FinancialReports, Vec::new());
        store.seed(PortalDocument::ComplianceLog, Vec::new());
        Arc::new(store)
    }

    pub(super) fn seed(&self, document: PortalDocument, records: Vec<RecordFields>) {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .insert(document, records);
    }

    pub(super) fn remove(&self, document: PortalDocument) {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .remove(&document);
    }

    pub(super) fn reject_writes(&self, document: PortalDocument) {
        self.rejected
            .lock()
            .expect("store mutex poisoned")
            .insert(document);
    }

    pub(super) fn document(&self, document: PortalDocument) -> Vec<RecordFields> {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .get(&document)
            .cloned()
            .unwrap_or_default()
    }
}

impl DocumentStore for MemoryStore {
    fn fetch(&self, document: PortalDocument) -> Result<Vec<RecordFields>, StoreError> {
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .get(&document)
            .cloned()
            .ok_or(StoreError::NotFound(document.title()))
    }

    fn overwrite(
        &self,
        document: PortalDocument,
        records: &[RecordFields],
    ) -> Result<(), StoreError> {
        if self
            .rejected
            .lock()
            .expect("store mutex poisoned")
            .contains(&document)
        {
            return Err(StoreError::WriteRejected {
                title: document.title(),
                reason: "write rejected by test".to_string(),
            });
        }
        self.documents
            .lock()
            .expect("store mutex poisoned")
            .insert(document, records.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(super) struct SentEmail {
    pub(super) subject: String,
    pub(super) body: String,
    pub(super) recipient: String,
}

/// Recording notification channel with switchable failure modes.
#[derive(Default)]
pub(super) struct MemoryChannel {
    redirects: Mutex<HashMap<String, String>>,
    unresolved: Mutex<HashSet<String>>,
    fail_emails: Mutex<bool>,
    talk_posts: Mutex<Vec<(String, String)>>,
    emails: Mutex<Vec<SentEmail>>,
}

impl MemoryChannel {
    pub(super) fn redirect(&self, from: &str, to: &str) {
        self.redirects
            .lock()
            .expect("channel mutex poisoned")
            .insert(from.to_string(), to.to_string());
    }

    pub(super) fn mark_unresolved(&self, title: &str) {
        self.unresolved
            .lock()
            .expect("channel mutex poisoned")
            .insert(title.to_string());
    }

    pub(super) fn fail_emails(&self) {
        *self.fail_emails.lock().expect("channel mutex poisoned") = true;
    }

    pub(super) fn talk_posts(&self) -> Vec<(String, String)> {
        self.talk_posts
            .lock()
            .expect("channel mutex poisoned")
            .clone()
    }

    pub(super) fn emails(&self) -> Vec<SentEmail> {
        self.emails.lock().expect("channel mutex poisoned").clone()
    }
}

impl NotificationChannel for MemoryChannel {
    fn resolve_talk_target(&self, title: &str) -> Result<String, NotifyError> {
        if self
            .unresolved
            .lock()
            .expect("channel mutex poisoned")
            .contains(title)
        {
            return Err(NotifyError::UnresolvedTarget(title.to_string()));
        }
        Ok(self
            .redirects
            .lock()
            .expect("channel mutex poisoned")
            .get(title)
            .cloned()
            .unwrap_or_else(|| title.to_string()))
    }

    fn append_to_talk(&self, title: &str, text: &str) -> Result<(), NotifyError> {
        self.talk_posts
            .lock()
            .expect("channel mutex poisoned")
            .push((title.to_string(), text.to_string()));
        Ok(())
    }

    fn send_email(&self, subject: &str, body: &str, recipient: &str) -> Result<(), NotifyError> {
        if *self.fail_emails.lock().expect("channel mutex poisoned") {
            return Err(NotifyError::Transport("smtp offline".to_string()));
        }
        self.emails
            .lock()
            .expect("channel mutex poisoned")
            .push(SentEmail {
                subject: subject.to_string(),
                body: body.to_string(),
                recipient: recipient.to_string(),
            });
        Ok(())
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
