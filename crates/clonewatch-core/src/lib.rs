//! clonewatch-core - Core library for backport chain coverage analysis
//!
//! This crate provides the building blocks for:
//! - Flattening a document's clone chain (each backport is a clone of the
//!   previous one) into an ordered list
//! - Finding required backport versions that no clone targets yet
//! - Holding the documents of a session and their completion state
//! - Deciding which cards are visible under the current filters
//!
//! Nothing here does I/O. Fetching documents and synchronizing completion
//! state with the document service lives in the `clonewatch` crate.
//!
//! # Finding missing backports
//!
//! ```
//! use clonewatch_core::{ChainNode, CloneChain, Document, parse_versions};
//!
//! let mut doc = Document::new("OCPBUGS-1");
//! doc.target_backport_versions = parse_versions("4.18.z, 4.17.z, 4.16.z");
//! doc.clones = CloneChain::from_nodes(vec![
//!     ChainNode { target_version: Some("4.18.z".into()), ..Default::default() },
//!     ChainNode { target_version: Some("4.16.z".into()), ..Default::default() },
//! ]);
//!
//! assert_eq!(doc.missing_backports(), vec!["4.17.z"]);
//! ```
//!
//! # Filtering
//!
//! ```
//! use clonewatch_core::{AssigneeFilter, Document, DocumentStore, Filter};
//!
//! let mut doc = Document::new("OCPBUGS-1");
//! doc.assignee = Some("bob".into());
//!
//! let mut store = DocumentStore::with_documents(vec![doc]);
//! let filter = Filter::new(AssigneeFilter::parse("bob"), false);
//! assert_eq!(filter.apply(store.documents()).count(), 1);
//!
//! store.set_completed("OCPBUGS-1", true).unwrap();
//! assert_eq!(filter.apply(store.documents()).count(), 0);
//! ```

mod card;
mod chain;
mod document;
mod filter;
mod gaps;
mod store;
mod versions;

pub use card::{
    CardView, CloneRow, NO_SUMMARY, NO_VERSION, ToggleButton, UNASSIGNED, issue_link,
    status_class,
};
pub use chain::{ChainCut, ChainLink, ChainNode, CloneChain, MAX_CHAIN_DEPTH};
pub use document::Document;
pub use filter::{ALL_ASSIGNEES, AssigneeFilter, Filter, Visibility, assignee_options};
pub use gaps::{BackportReport, DocumentGaps, missing_backports};
pub use store::{DocumentStore, NotFound};
pub use versions::{join_versions, parse_versions};
