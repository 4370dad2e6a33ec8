//! JSON file application store: the local, durable secondary.
//!
//! One `<application-id>.json` per application under
//! `<data_dir>/applications/`. Writes go through a temp file and an atomic
//! rename so a crash mid-write never leaves a torn document. Listing scans
//! the directory; this store is the fallback, not the query engine.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use lendia_core::persistence::ApplicationStore;
use lendia_types::application::StoredApplication;
use lendia_types::error::StoreError;
use lendia_types::loan::LoanType;

/// File-per-application JSON store.
pub struct JsonFileApplicationStore {
    root: PathBuf,
}

impl JsonFileApplicationStore {
    /// Open (and create if needed) the store under `<data_dir>/applications`.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let root = data_dir.join("applications");
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| StoreError::Connection(format!("create {}: {e}", root.display())))?;
        Ok(Self { root })
    }

    fn path_for(&self, id: &Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

impl ApplicationStore for JsonFileApplicationStore {
    fn name(&self) -> &str {
        "jsonfile"
    }

    async fn write(&self, application: &StoredApplication) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(application)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        let path = self.path_for(&application.record.id);
        let tmp = path.with_extension("json.tmp");

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| StoreError::Connection(format!("write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Connection(format!("rename {}: {e}", path.display())))?;
        Ok(())
    }

    async fn read(&self, id: &Uuid) -> Result<Option<StoredApplication>, StoreError> {
        let path = self.path_for(id);
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StoreError::Connection(format!(
                    "read {}: {err}",
                    path.display()
                )));
            }
        };

        let application = serde_json::from_slice(&body)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;
        Ok(Some(application))
    }

    async fn list(
        &self,
        loan_type: Option<LoanType>,
    ) -> Result<Vec<StoredApplication>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::Connection(format!("scan {}: {e}", self.root.display())))?;

        let mut applications = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let body = tokio::fs::read(&path)
                .await
                .map_err(|e| StoreError::Connection(format!("read {}: {e}", path.display())))?;
            let application: StoredApplication = serde_json::from_slice(&body)
                .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))?;

            if loan_type.is_none_or(|lt| application.record.loan_type == lt) {
                applications.push(application);
            }
        }

        applications.sort_by(|a, b| b.record.created_at.cmp(&a.record.created_at));
        Ok(applications)
    }
}
