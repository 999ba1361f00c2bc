//! The board: one session over the documents of a document service.
//!
//! The board owns the document store, the current filter and a watch channel
//! that ticks whenever something visible may have changed (a committed
//! completion update or a filter change). Front ends re-derive their cards
//! from the board whenever the channel ticks.

use std::sync::Arc;

use clonewatch_core::{
    AssigneeFilter, BackportReport, CardView, Document, DocumentStore, Filter, Visibility,
};
use tokio::sync::{RwLock, watch};
use tracing::{error, info};

use crate::client::{DocumentService, ServiceError};
use crate::sync::{self, SharedStore, SyncError, SyncOutcome};

/// The initial fetch failed; the session has no documents to work with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub source: ServiceError,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load documents: {}", self.source)
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A loaded session
pub struct Board {
    service: Arc<dyn DocumentService>,
    store: SharedStore,
    filter: RwLock<Filter>,
    /// Ticks on every visible change
    changes: watch::Sender<u64>,
    browse_url: String,
}

impl Board {
    /// Fetch every document once and build the session around them.
    ///
    /// Any failure is fatal for the session: no partial document set is used
    /// and nothing is retried.
    pub async fn load(
        service: Arc<dyn DocumentService>,
        browse_url: impl Into<String>,
    ) -> Result<Self, LoadError> {
        let fetched = match service.fetch_documents().await {
            Ok(fetched) => fetched,
            Err(source) => {
                error!(error = %source, "failed to fetch documents");
                return Err(LoadError { source });
            }
        };

        let documents = clonewatch_api::into_documents(fetched);
        info!(count = documents.len(), "loaded documents");

        Ok(Self::with_documents(service, documents, browse_url))
    }

    /// Build a session around documents that were obtained elsewhere
    pub fn with_documents(
        service: Arc<dyn DocumentService>,
        documents: Vec<Document>,
        browse_url: impl Into<String>,
    ) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            service,
            store: Arc::new(RwLock::new(DocumentStore::with_documents(documents))),
            filter: RwLock::new(Filter::default()),
            changes,
            browse_url: browse_url.into(),
        }
    }

    /// Receiver that is notified whenever visibility may have changed
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// Shared handle to the store, for readers outside the board
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    fn notify(&self) {
        self.changes.send_modify(|tick| *tick += 1);
    }

    fn after_sync(&self, result: &Result<SyncOutcome, SyncError>) {
        if let Ok(SyncOutcome::Committed { .. }) = result {
            self.notify();
        }
    }

    /// Set the completion flag of `id` through the document service
    pub async fn set_completion(&self, id: &str, completed: bool) -> Result<SyncOutcome, SyncError> {
        let result = sync::set_completion(self.service.as_ref(), &self.store, id, completed).await;
        self.after_sync(&result);
        result
    }

    /// Like [`Board::set_completion`], without a request when nothing changes
    pub async fn set_completion_if_changed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<SyncOutcome, SyncError> {
        let result =
            sync::set_completion_if_changed(self.service.as_ref(), &self.store, id, completed)
                .await;
        self.after_sync(&result);
        result
    }

    /// Flip the completion flag of `id`
    pub async fn toggle(&self, id: &str) -> Result<SyncOutcome, SyncError> {
        let result = sync::toggle(self.service.as_ref(), &self.store, id).await;
        self.after_sync(&result);
        result
    }

    pub async fn filter(&self) -> Filter {
        self.filter.read().await.clone()
    }

    pub async fn set_filter(&self, filter: Filter) {
        *self.filter.write().await = filter;
        self.notify();
    }

    /// Change the assignee selector (`"all"` selects everyone)
    pub async fn select_assignee(&self, selector: &str) {
        self.filter.write().await.assignee = AssigneeFilter::parse(selector);
        self.notify();
    }

    pub async fn show_completed(&self, show: bool) {
        self.filter.write().await.show_completed = show;
        self.notify();
    }

    /// Assignee options, fixed when the documents were loaded
    pub async fn assignees(&self) -> Vec<String> {
        self.store.read().await.assignees().to_vec()
    }

    pub async fn document(&self, id: &str) -> Option<Document> {
        self.store.read().await.find_by_id(id).cloned()
    }

    /// Missing backports of one document, `None` if it is unknown
    pub async fn missing_backports(&self, id: &str) -> Option<Vec<String>> {
        self.store
            .read()
            .await
            .find_by_id(id)
            .map(Document::missing_backports)
    }

    /// One visibility decision per document, in load order
    pub async fn visibility(&self) -> Vec<Visibility> {
        let filter = self.filter().await;
        filter.visibility(self.store.read().await.documents())
    }

    /// Cards for the documents that pass the current filter
    pub async fn visible_cards(&self) -> Vec<CardView> {
        let filter = self.filter().await;
        let store = self.store.read().await;
        filter
            .apply(store.documents())
            .map(|doc| CardView::derive(doc, &self.browse_url))
            .collect()
    }

    /// Backport report over the documents that pass the current filter
    pub async fn report(&self) -> BackportReport {
        let filter = self.filter().await;
        let store = self.store.read().await;
        BackportReport::from_documents(filter.apply(store.documents()))
    }
}
