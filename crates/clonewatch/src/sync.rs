//! Completion synchronization.
//!
//! A completion change is only written to the local store once the document
//! service has acknowledged it. Until then the store keeps the last
//! acknowledged value, and any failure leaves it untouched.
//!
//! The store lock is never held across the remote call: while one update is
//! in flight, filters and updates to other documents keep reading and writing
//! committed state. Two in-flight updates to the same document race, and the
//! last acknowledgment to arrive wins.

use std::sync::Arc;

use clonewatch_api::CompleteRequest;
use clonewatch_core::DocumentStore;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::{DocumentService, ServiceError};

/// The document store as shared between the synchronizer and its readers
pub type SharedStore = Arc<RwLock<DocumentStore>>;

/// A completion update that did not take effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The store has no document with this id; nothing was sent
    UnknownDocument(String),
    /// The service acknowledged the request with `success: false`
    Rejected { id: String },
    /// The exchange with the service failed
    Service { id: String, source: ServiceError },
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::UnknownDocument(id) => write!(f, "unknown document '{id}'"),
            SyncError::Rejected { id } => {
                write!(f, "document service rejected the update for '{id}'")
            }
            SyncError::Service { id, source } => {
                write!(f, "failed to update '{id}': {source}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Service { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A completion update that took effect (or had nothing to do)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The service acknowledged the change and the store now holds it
    Committed { completed: bool },
    /// The store already held the requested value; no request was sent
    Unchanged { completed: bool },
}

impl SyncOutcome {
    pub fn completed(&self) -> bool {
        match self {
            SyncOutcome::Committed { completed } | SyncOutcome::Unchanged { completed } => {
                *completed
            }
        }
    }
}

/// Set the completion flag of `id`, remotely first and locally on success.
///
/// Always sends the request, even when the store already holds `completed`.
pub async fn set_completion(
    service: &dyn DocumentService,
    store: &RwLock<DocumentStore>,
    id: &str,
    completed: bool,
) -> Result<SyncOutcome, SyncError> {
    if store.read().await.find_by_id(id).is_none() {
        return Err(SyncError::UnknownDocument(id.to_string()));
    }

    let request = CompleteRequest {
        id: id.to_string(),
        completed,
    };
    debug!(id, completed, "sending completion update");

    let ack = match service.update_completion(&request).await {
        Ok(ack) => ack,
        Err(source) => {
            warn!(id, completed, error = %source, "completion update failed");
            return Err(SyncError::Service {
                id: id.to_string(),
                source,
            });
        }
    };

    if !ack.success {
        warn!(id, completed, "completion update rejected by document service");
        return Err(SyncError::Rejected { id: id.to_string() });
    }

    // Documents are never removed, so the id is still present
    store
        .write()
        .await
        .set_completed(id, completed)
        .map_err(|e| SyncError::UnknownDocument(e.id))?;
    info!(id, completed, "completion committed");

    Ok(SyncOutcome::Committed { completed })
}

/// Like [`set_completion`], but skips the request when nothing would change
pub async fn set_completion_if_changed(
    service: &dyn DocumentService,
    store: &RwLock<DocumentStore>,
    id: &str,
    completed: bool,
) -> Result<SyncOutcome, SyncError> {
    let current = store
        .read()
        .await
        .find_by_id(id)
        .map(|doc| doc.completed)
        .ok_or_else(|| SyncError::UnknownDocument(id.to_string()))?;

    if current == completed {
        debug!(id, completed, "completion already in requested state");
        return Ok(SyncOutcome::Unchanged { completed });
    }

    set_completion(service, store, id, completed).await
}

/// Flip the completion flag of `id`
pub async fn toggle(
    service: &dyn DocumentService,
    store: &RwLock<DocumentStore>,
    id: &str,
) -> Result<SyncOutcome, SyncError> {
    let current = store
        .read()
        .await
        .find_by_id(id)
        .map(|doc| doc.completed)
        .ok_or_else(|| SyncError::UnknownDocument(id.to_string()))?;

    set_completion(service, store, id, !current).await
}
