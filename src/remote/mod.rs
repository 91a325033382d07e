//! Remote calendar store abstraction.
//!
//! The sync reconciler only sees the [`CalendarStore`] trait, so tests can
//! drive it with an in-memory fake while the pipeline wires in the CalDAV
//! implementation from [`caldav`].

pub mod caldav;

use async_trait::async_trait;

use crate::error::ClassdavResult;

pub use caldav::CaldavStore;

/// A resolved server-side calendar collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Server path (href) of the collection, '/'-terminated.
    pub href: String,
    /// Display name, when the server reports one.
    pub display_name: Option<String>,
}

/// Operations the reconciler needs from a remote calendar server.
///
/// Every method is a single blocking network call from the reconciler's
/// point of view; retries and caching are deliberately absent.
#[async_trait]
pub trait CalendarStore {
    /// Resolve the first calendar collection available to the
    /// authenticated identity, or `None` when the account has none.
    async fn resolve_collection(&self) -> ClassdavResult<Option<Collection>>;

    /// Enumerate hrefs of every event resource currently in the collection.
    async fn list_resources(&self, collection: &Collection) -> ClassdavResult<Vec<String>>;

    /// Delete one event resource. Deleting an already-absent resource is
    /// not an error.
    async fn delete_resource(&self, href: &str) -> ClassdavResult<()>;

    /// Create-or-overwrite one event resource by name (last-write-wins,
    /// no concurrency token).
    async fn put_resource(
        &self,
        collection: &Collection,
        name: &str,
        ics: &str,
    ) -> ClassdavResult<()>;
}
