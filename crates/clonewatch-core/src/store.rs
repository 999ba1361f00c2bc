//! In-memory document store
//!
//! The store owns every document fetched for a session. It is the single
//! source of truth for completion state; the only mutation it allows after
//! loading is [`DocumentStore::set_completed`].

use crate::document::Document;
use crate::filter::assignee_options;
use std::collections::HashMap;

/// Returned when an operation names a document the store does not hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFound {
    pub id: String,
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document '{}' not found", self.id)
    }
}

impl std::error::Error for NotFound {}

/// Owned collection of documents for one session
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
    /// Position of each document in `documents`, keyed by id
    index: HashMap<String, usize>,
    /// Distinct assignees, sorted, computed at load time
    assignees: Vec<String>,
    /// Bumped on every load and every committed change
    version: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `documents`
    pub fn with_documents(documents: Vec<Document>) -> Self {
        let mut store = Self::new();
        store.load(documents);
        store
    }

    /// Replace the store contents.
    ///
    /// If two documents share an id, lookups resolve to the first one.
    pub fn load(&mut self, documents: Vec<Document>) {
        let mut index = HashMap::with_capacity(documents.len());
        for (position, doc) in documents.iter().enumerate() {
            index.entry(doc.id.clone()).or_insert(position);
        }

        self.assignees = assignee_options(&documents);
        self.documents = documents;
        self.index = index;
        self.version += 1;
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Document> {
        self.index.get(id).map(|&position| &self.documents[position])
    }

    /// Set the completion flag of one document.
    ///
    /// Returns whether the stored value changed.
    pub fn set_completed(&mut self, id: &str, completed: bool) -> Result<bool, NotFound> {
        let position = *self.index.get(id).ok_or_else(|| NotFound { id: id.to_string() })?;
        let doc = &mut self.documents[position];
        if doc.completed == completed {
            return Ok(false);
        }
        doc.completed = completed;
        self.version += 1;
        Ok(true)
    }

    /// All documents in load order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Assignee options derived when the store was loaded
    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, assignee: Option<&str>) -> Document {
        let mut doc = Document::new(id);
        doc.assignee = assignee.map(str::to_string);
        doc
    }

    #[test]
    fn find_by_id_locates_documents() {
        let store = DocumentStore::with_documents(vec![doc("A", None), doc("B", None)]);
        assert_eq!(store.find_by_id("B").map(|d| d.id.as_str()), Some("B"));
        assert!(store.find_by_id("Z").is_none());
    }

    #[test]
    fn set_completed_mutates_in_place() {
        let mut store = DocumentStore::with_documents(vec![doc("A", None)]);
        let before = store.version();

        assert_eq!(store.set_completed("A", true), Ok(true));
        assert!(store.find_by_id("A").map(|d| d.completed).unwrap_or(false));
        assert_eq!(store.version(), before + 1);

        // Same value again is a no-op
        assert_eq!(store.set_completed("A", true), Ok(false));
        assert_eq!(store.version(), before + 1);
    }

    #[test]
    fn set_completed_on_unknown_id_is_not_found() {
        let mut store = DocumentStore::with_documents(vec![doc("A", None)]);
        let err = store.set_completed("B", true).unwrap_err();
        assert_eq!(err.id, "B");
        assert_eq!(err.to_string(), "document 'B' not found");
        assert!(!store.documents()[0].completed);
    }

    #[test]
    fn load_replaces_contents_and_assignees() {
        let mut store = DocumentStore::with_documents(vec![doc("A", Some("bob"))]);
        assert_eq!(store.assignees(), ["bob"]);

        store.load(vec![doc("B", Some("carol")), doc("C", Some("alice"))]);
        assert_eq!(store.len(), 2);
        assert!(store.find_by_id("A").is_none());
        assert_eq!(store.assignees(), ["alice", "carol"]);
    }

    #[test]
    fn duplicate_ids_resolve_to_first() {
        let mut first = doc("A", Some("first"));
        first.summary = Some("first".to_string());
        let store = DocumentStore::with_documents(vec![first, doc("A", Some("second"))]);
        assert_eq!(
            store.find_by_id("A").and_then(|d| d.summary.as_deref()),
            Some("first")
        );
    }

    #[test]
    fn assignees_do_not_change_on_completion() {
        let mut store = DocumentStore::with_documents(vec![doc("A", Some("bob"))]);
        store.set_completed("A", true).expect("document exists");
        assert_eq!(store.assignees(), ["bob"]);
    }
}
