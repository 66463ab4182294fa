//! Directory-backed document store, one file per portal document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec::{self, RecordFields};

use super::repository::{DocumentStore, PortalDocument, StoreError};

/// Reads and writes portal documents as table-literal files under a
/// single directory. The CLI and the service run against this store;
/// tests use the in-memory fake instead.
#[derive(Debug, Clone)]
pub struct LuaFileStore {
    root: PathBuf,
}

impl LuaFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, document: PortalDocument) -> PathBuf {
        self.root.join(document.file_name())
    }
}

impl DocumentStore for LuaFileStore {
    fn fetch(&self, document: PortalDocument) -> Result<Vec<RecordFields>, StoreError> {
        let path = self.path_for(document);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(document.title()));
            }
            Err(err) => return Err(StoreError::Unavailable(err.to_string())),
        };

        codec::parse_records(&raw).map_err(|source| StoreError::Malformed {
            title: document.title(),
            source,
        })
    }

    fn overwrite(
        &self,
        document: PortalDocument,
        records: &[RecordFields],
    ) -> Result<(), StoreError> {
        let rendered = codec::render_records(records);
        fs::write(self.path_for(document), rendered).map_err(|err| StoreError::WriteRejected {
            title: document.title(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("wadp-store-{}-{}", tag, std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    fn record(pairs: &[(&str, &str)]) -> RecordFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn overwrite_then_fetch_round_trips() {
        let dir = scratch_dir("roundtrip");
        let store = LuaFileStore::new(&dir);
        let records = vec![record(&[("group_name", "Disk Backed UG")])];

        store
            .overwrite(PortalDocument::Organizations, &records)
            .expect("overwrite succeeds");
        let fetched = store
            .fetch(PortalDocument::Organizations)
            .expect("fetch succeeds");
        assert_eq!(fetched, records);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn fetching_a_missing_document_is_not_found() {
        let dir = scratch_dir("missing");
        let store = LuaFileStore::new(&dir);

        let err = store
            .fetch(PortalDocument::ComplianceLog)
            .expect_err("missing file must not read as empty");
        assert!(matches!(err, StoreError::NotFound(_)));

        fs::remove_dir_all(dir).ok();
    }
}
