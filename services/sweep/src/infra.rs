use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use wadp_compliance::codec::RecordFields;
use wadp_compliance::workflows::compliance::{
    DocumentStore, NotificationChannel, NotifyError, PortalDocument, StoreError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Outbound channel for server and CLI sweeps. Talk-page posts and
/// staff emails are written to the log; wiring a live MediaWiki or
/// SMTP client in means replacing this one implementation.
#[derive(Default, Clone)]
pub(crate) struct LoggingChannel;

impl NotificationChannel for LoggingChannel {
    fn resolve_talk_target(&self, title: &str) -> Result<String, NotifyError> {
        Ok(title.to_string())
    }

    fn append_to_talk(&self, title: &str, text: &str) -> Result<(), NotifyError> {
        info!(target_page = title, chars = text.len(), "talk-page notice");
        Ok(())
    }

    fn send_email(&self, subject: &str, _body: &str, recipient: &str) -> Result<(), NotifyError> {
        info!(subject, recipient, "staff digest email");
        Ok(())
    }
}

/// Portal documents held in memory, for demos and tests.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDocumentStore {
    documents: Arc<Mutex<HashMap<PortalDocument, Vec<RecordFields>>>>,
}

impl InMemoryDocumentStore {
    pub(crate) fn seed(&self, document: PortalDocument, records: Vec<RecordFields>) {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        guard.insert(document, records);
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn fetch(&self, document: PortalDocument) -> Result<Vec<RecordFields>, StoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        guard
            .get(&document)
            .cloned()
            .ok_or(StoreError::NotFound(document.title()))
    }

    fn overwrite(
        &self,
        document: PortalDocument,
        records: &[RecordFields],
    ) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        guard.insert(document, records.to_vec());
        Ok(())
    }
}

/// Recording channel so the demo can show what a sweep would send.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationChannel {
    talk_posts: Arc<Mutex<Vec<(String, String)>>>,
    emails: Arc<Mutex<Vec<(String, String)>>>,
}

impl InMemoryNotificationChannel {
    pub(crate) fn talk_posts(&self) -> Vec<(String, String)> {
        self.talk_posts.lock().expect("talk mutex poisoned").clone()
    }

    pub(crate) fn emails(&self) -> Vec<(String, String)> {
        self.emails.lock().expect("email mutex poisoned").clone()
    }
}

impl NotificationChannel for InMemoryNotificationChannel {
    fn resolve_talk_target(&self, title: &str) -> Result<String, NotifyError> {
        Ok(title.to_string())
    }

    fn append_to_talk(&self, title: &str, text: &str) -> Result<(), NotifyError> {
        let mut guard = self.talk_posts.lock().expect("talk mutex poisoned");
        guard.push((title.to_string(), text.to_string()));
        Ok(())
    }

    fn send_email(&self, subject: &str, _body: &str, recipient: &str) -> Result<(), NotifyError> {
        let mut guard = self.emails.lock().expect("email mutex poisoned");
        guard.push((subject.to_string(), recipient.to_string()));
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
