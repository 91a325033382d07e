//! Per-file orchestration: convert, write, upload, purge, sync.
//!
//! Every per-file failure is contained so the run always visits every
//! input file; only an unusable input directory aborts the process.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::cdn::CdnPurger;
use crate::config::{Config, Credential};
use crate::document::CalendarDocument;
use crate::error::ClassdavResult;
use crate::ics;
use crate::remote::{CaldavStore, CalendarStore};
use crate::schedule::ScheduleRow;
use crate::storage::ObjectStorage;
use crate::sync::{self, SyncOutcome};

pub struct Pipeline {
    config: Config,
    storage: ObjectStorage,
    cdn: CdnPurger,
}

impl Pipeline {
    pub fn new(config: Config) -> ClassdavResult<Self> {
        let storage = ObjectStorage::new(config.storage.clone())?;
        let cdn = CdnPurger::new(
            config.cdn.clone(),
            &config.storage.secret_id,
            &config.storage.secret_key,
        )?;

        Ok(Pipeline {
            config,
            storage,
            cdn,
        })
    }

    /// Process every CSV file in the input directory.
    pub async fn run(&self) -> ClassdavResult<()> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let files = list_csv_files(&self.config.input_dir)?;
        if files.is_empty() {
            warn!(input = %self.config.input_dir.display(), "no schedule files found");
            return Ok(());
        }

        for path in files {
            if let Err(e) = self.process_file(&path).await {
                error!(file = %path.display(), error = %e, "failed to process schedule");
            }
        }

        Ok(())
    }

    async fn process_file(&self, path: &Path) -> ClassdavResult<()> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        let rows = read_rows(path)?;
        let (doc, dropped) = CalendarDocument::from_rows(&name, &rows);
        if dropped > 0 {
            warn!(document = %name, dropped, "dropped malformed rows");
        }
        if doc.is_empty() {
            warn!(document = %name, "document has no events");
        }

        let artifact_name = format!("{}.ics", name);
        let artifact_path = self.config.output_dir.join(&artifact_name);
        std::fs::write(&artifact_path, ics::generate_document(&doc))?;
        info!(
            file = %path.display(),
            artifact = %artifact_path.display(),
            events = doc.events.len(),
            "converted schedule"
        );

        // Storage upload shares the credential-lookup skip condition with
        // the remote sync; the CDN purge runs regardless.
        if self.config.credential_for(&artifact_name).is_some() {
            self.storage.upload(&artifact_path, &artifact_name).await;
        } else {
            info!(artifact = %artifact_name, "skipping storage upload, no credential entry");
        }
        self.cdn.purge().await;

        self.sync_remote(&doc, &artifact_name).await;

        Ok(())
    }

    async fn sync_remote(&self, doc: &CalendarDocument, artifact_name: &str) {
        self.sync_remote_with(doc, artifact_name, |credential| {
            CaldavStore::new(
                &self.config.caldav.url,
                &credential.username,
                &credential.password,
            )
        })
        .await;
    }

    /// Credential-gated sync step. The store is only built, and the server
    /// only contacted, when the document has a credential entry. Returns
    /// whether a sync was attempted.
    async fn sync_remote_with<S, F>(
        &self,
        doc: &CalendarDocument,
        artifact_name: &str,
        make_store: F,
    ) -> bool
    where
        S: CalendarStore,
        F: FnOnce(&Credential) -> ClassdavResult<S>,
    {
        let Some(credential) = self.config.credential_for(artifact_name) else {
            info!(document = %doc.name, "skipping remote sync, no credential entry");
            return false;
        };

        let store = match make_store(credential) {
            Ok(store) => store,
            Err(e) => {
                error!(document = %doc.name, error = %e, "could not create CalDAV client");
                return false;
            }
        };

        match sync::sync_document(&store, doc).await {
            Ok(report) => match report.outcome {
                SyncOutcome::Completed => info!(
                    document = %doc.name,
                    written = report.written,
                    deleted = report.deleted,
                    delete_failures = report.delete_failures,
                    write_failures = report.write_failures,
                    "synced document to remote calendar"
                ),
                SyncOutcome::NoOp => warn!(
                    document = %doc.name,
                    write_failures = report.write_failures,
                    "no events were written to the remote calendar"
                ),
            },
            Err(e) => error!(document = %doc.name, error = %e, "remote sync failed"),
        }

        true
    }
}

fn list_csv_files(input_dir: &Path) -> ClassdavResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            files.push(path);
        }
    }

    // Stable order for reproducible logs; ordering carries no correctness
    // requirement across documents.
    files.sort();
    Ok(files)
}

fn read_rows(path: &Path) -> ClassdavResult<Vec<ScheduleRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(file = %path.display(), row = index, error = %e, "unreadable record, skipping");
            }
        }
    }

    Ok(rows)
}
