//! Clear-then-replace reconciliation against a remote calendar store.
//!
//! Per document: resolve the first collection for the credentialed
//! identity (fatal for the document if none exists), best-effort delete of
//! everything currently in it, then one PUT per event. Each resource-level
//! operation is attempted exactly once; there is no local cache of remote
//! state between runs.

use tracing::{info, warn};

use crate::document::CalendarDocument;
use crate::error::{ClassdavError, ClassdavResult};
use crate::ics;
use crate::remote::{CalendarStore, Collection};

/// How the clear phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearPhase {
    /// Every existing resource was deleted.
    Full,
    /// Some deletions failed; the stale resources stay behind.
    Partial,
    /// Enumeration itself failed, nothing was deleted.
    Skipped,
}

/// Document-level result of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// At least one event was written, or the document was empty.
    Completed,
    /// A non-empty document produced zero writes.
    NoOp,
}

/// Per-document accounting for one reconciliation run.
#[derive(Debug)]
pub struct SyncReport {
    pub collection: Collection,
    pub clear: ClearPhase,
    pub deleted: usize,
    pub delete_failures: usize,
    pub written: usize,
    pub write_failures: usize,
    pub skipped_events: usize,
    pub outcome: SyncOutcome,
}

/// Make the remote collection's event set match `doc` exactly.
///
/// The clear phase removes every existing resource regardless of origin:
/// full replacement is deliberately destructive toward externally added
/// events. A failed clear never blocks the write phase.
pub async fn sync_document<S: CalendarStore>(
    store: &S,
    doc: &CalendarDocument,
) -> ClassdavResult<SyncReport> {
    let collection = store
        .resolve_collection()
        .await?
        .ok_or_else(|| ClassdavError::NoCollection(doc.name.clone()))?;

    info!(
        document = %doc.name,
        collection = %collection.href,
        "resolved calendar collection"
    );

    let (clear, deleted, delete_failures) = clear_collection(store, &collection, doc).await;

    let mut written = 0usize;
    let mut write_failures = 0usize;
    let mut skipped_events = 0usize;

    for event in &doc.events {
        if event.uid.is_empty() {
            // Unreachable through the builder, but an unaddressable event
            // must never abort the phase.
            warn!(document = %doc.name, "event has no uid, skipping upload");
            skipped_events += 1;
            continue;
        }

        let body = ics::generate_event(doc, event);
        match store
            .put_resource(&collection, &event.resource_name(), &body)
            .await
        {
            Ok(()) => written += 1,
            Err(e) => {
                write_failures += 1;
                warn!(
                    document = %doc.name,
                    uid = %event.uid,
                    error = %e,
                    "failed to upload event"
                );
            }
        }
    }

    let outcome = if written == 0 && !doc.events.is_empty() {
        SyncOutcome::NoOp
    } else {
        SyncOutcome::Completed
    };

    Ok(SyncReport {
        collection,
        clear,
        deleted,
        delete_failures,
        written,
        write_failures,
        skipped_events,
        outcome,
    })
}

async fn clear_collection<S: CalendarStore>(
    store: &S,
    collection: &Collection,
    doc: &CalendarDocument,
) -> (ClearPhase, usize, usize) {
    let hrefs = match store.list_resources(collection).await {
        Ok(hrefs) => hrefs,
        Err(e) => {
            warn!(
                document = %doc.name,
                error = %e,
                "could not enumerate existing events, skipping clear phase"
            );
            return (ClearPhase::Skipped, 0, 0);
        }
    };

    let mut deleted = 0usize;
    let mut failures = 0usize;

    for href in &hrefs {
        match store.delete_resource(href).await {
            Ok(()) => deleted += 1,
            Err(e) => {
                failures += 1;
                warn!(
                    document = %doc.name,
                    resource = %href,
                    error = %e,
                    "failed to delete existing event"
                );
            }
        }
    }

    let phase = if failures == 0 {
        ClearPhase::Full
    } else {
        ClearPhase::Partial
    };

    (phase, deleted, failures)
}
