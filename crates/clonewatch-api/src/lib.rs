//! Wire types for the clonewatch document service
//!
//! This crate contains the JSON shapes exchanged with the document service
//! and the conversion from the nested wire form of a clone chain into the
//! flattened [`clonewatch_core::Document`].

use clonewatch_core::{ChainLink, ChainNode, CloneChain, Document, parse_versions};
use eyre::{Result, WrapErr};
use facet::Facet;
use tracing::warn;

/// `GET` - list every tracked document
pub const DOCUMENTS_PATH: &str = "/api/documents";

/// `POST` - set the completion flag of one document
pub const COMPLETE_PATH: &str = "/api/documents/complete";

/// A document as stored by the service.
///
/// Nested clones reuse the same shape and usually carry only `_id`,
/// `status` and `target_version`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct ApiDocument {
    #[facet(rename = "_id", default)]
    pub id: Option<String>,
    #[facet(default)]
    pub summary: Option<String>,
    #[facet(default)]
    pub status: Option<String>,
    #[facet(default)]
    pub target_version: Option<String>,
    /// Comma separated, e.g. `"4.18.z, 4.17.z"`
    #[facet(default)]
    pub target_backport_versions: Option<String>,
    #[facet(default)]
    pub assignee: Option<String>,
    #[facet(default)]
    pub completed: Option<bool>,
    /// Next backport in the chain
    #[facet(rename = "clone", default)]
    pub cloned_by: Option<Box<ApiDocument>>,
}

impl ChainLink for ApiDocument {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn target_version(&self) -> Option<&str> {
        self.target_version.as_deref()
    }

    fn next(&self) -> Option<&Self> {
        self.cloned_by.as_deref()
    }
}

impl ApiDocument {
    /// Convert into the core model, flattening the clone chain.
    ///
    /// Returns `None` for a document without an `_id`, which cannot be
    /// addressed by the completion endpoint.
    pub fn into_document(self) -> Option<Document> {
        let id = self.id.clone().filter(|id| !id.is_empty())?;
        let clones = CloneChain::flatten(self.cloned_by.as_deref());

        Some(Document {
            id,
            summary: self.summary,
            status: self.status,
            target_version: self.target_version,
            target_backport_versions: self
                .target_backport_versions
                .as_deref()
                .map(parse_versions)
                .unwrap_or_default(),
            assignee: self.assignee,
            completed: self.completed.unwrap_or(false),
            clones,
        })
    }

    /// Rebuild the nested wire form of a core document
    pub fn from_document(doc: &Document) -> Self {
        let cloned_by = doc.clones.nodes.iter().rev().fold(None, |next, node| {
            Some(Box::new(ApiDocument::from_chain_node(node, next)))
        });

        ApiDocument {
            id: Some(doc.id.clone()),
            summary: doc.summary.clone(),
            status: doc.status.clone(),
            target_version: doc.target_version.clone(),
            target_backport_versions: (!doc.target_backport_versions.is_empty())
                .then(|| clonewatch_core::join_versions(&doc.target_backport_versions)),
            assignee: doc.assignee.clone(),
            completed: Some(doc.completed),
            cloned_by,
        }
    }

    fn from_chain_node(node: &ChainNode, next: Option<Box<ApiDocument>>) -> Self {
        ApiDocument {
            id: node.id.clone(),
            status: node.status.clone(),
            target_version: node.target_version.clone(),
            cloned_by: next,
            ..Default::default()
        }
    }
}

/// Convert a fetched list into core documents, dropping entries without an id
pub fn into_documents(documents: Vec<ApiDocument>) -> Vec<Document> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(|(position, doc)| {
            let converted = doc.into_document();
            if converted.is_none() {
                warn!(position, "skipping document without _id");
            }
            converted
        })
        .collect()
}

/// Parse the body of a `GET /api/documents` response
pub fn parse_documents(json: &str) -> Result<Vec<ApiDocument>> {
    facet_json::from_str(json).wrap_err("Failed to parse document list JSON")
}

/// Body of `POST /api/documents/complete`
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CompleteRequest {
    pub id: String,
    pub completed: bool,
}

/// Acknowledgment of a completion update
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CompleteResponse {
    pub success: bool,
    /// Number of stored documents that changed
    #[facet(default)]
    pub modified: Option<u64>,
    /// Completion value the service applied
    #[facet(default)]
    pub completed: Option<bool>,
}

impl CompleteResponse {
    pub fn rejected() -> Self {
        CompleteResponse {
            success: false,
            modified: None,
            completed: None,
        }
    }
}

/// API error response (always JSON)
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_clone_chain() {
        let json = r#"[{
            "_id": "OCPBUGS-100",
            "summary": "Control plane fails to roll out",
            "status": "ON_QA",
            "assignee": "Jane Doe",
            "target_version": "4.19.0",
            "target_backport_versions": "4.18.z, 4.17.z, 4.16.z",
            "clone": {
                "_id": "OCPBUGS-101",
                "status": "Closed",
                "target_version": "4.18.z",
                "clone": {
                    "_id": "OCPBUGS-102",
                    "status": "New",
                    "target_version": "4.17.z"
                }
            }
        }]"#;

        let docs = into_documents(parse_documents(json).expect("valid JSON"));
        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.id, "OCPBUGS-100");
        assert!(!doc.completed);
        assert_eq!(doc.clones.len(), 2);
        assert_eq!(doc.clones.nodes[1].status.as_deref(), Some("New"));
        assert_eq!(doc.missing_backports(), vec!["4.16.z"]);
    }

    #[test]
    fn tolerates_missing_and_null_fields() {
        let json = r#"[
            {"_id": "A", "completed": null, "assignee": null},
            {"_id": "B", "extra": {"ignored": true}, "completed": true},
            {"summary": "no id"}
        ]"#;

        let docs = into_documents(parse_documents(json).expect("valid JSON"));
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert!(!docs[0].completed);
        assert!(docs[0].target_backport_versions.is_empty());
        assert!(docs[1].completed);
    }

    #[test]
    fn rejects_non_array_body() {
        assert!(parse_documents(r#"{"error": "boom"}"#).is_err());
    }

    #[test]
    fn from_document_rebuilds_nesting() {
        let json = r#"[{"_id":"A","target_backport_versions":"v1, v2","clone":{"target_version":"v1","clone":{"_id":"C","target_version":"v2"}}}]"#;
        let original = parse_documents(json).expect("valid JSON").remove(0);
        let doc = original.clone().into_document().expect("has id");

        let rebuilt = ApiDocument::from_document(&doc);
        assert_eq!(rebuilt.id.as_deref(), Some("A"));
        assert_eq!(rebuilt.completed, Some(false));
        assert_eq!(rebuilt.cloned_by, original.cloned_by);
    }

    #[test]
    fn complete_response_accepts_extra_fields() {
        let ack: CompleteResponse =
            facet_json::from_str(r#"{"success":true,"modified":1,"completed":true}"#)
                .expect("valid ack");
        assert!(ack.success);
        assert_eq!(ack.modified, Some(1));

        let bare: CompleteResponse =
            facet_json::from_str(r#"{"success":false}"#).expect("valid ack");
        assert_eq!(bare, CompleteResponse::rejected());
    }
}
