//! The tracked document model

use crate::chain::CloneChain;
use crate::gaps;
use facet::Facet;

/// A tracked issue with its backport requirements and clone chain
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Document {
    /// Issue key, unique and stable
    pub id: String,
    #[facet(default)]
    pub summary: Option<String>,
    /// Lifecycle label, used for display classification only
    #[facet(default)]
    pub status: Option<String>,
    /// Release this document itself targets
    #[facet(default)]
    pub target_version: Option<String>,
    /// Releases that still need a backport, in declaration order
    #[facet(default)]
    pub target_backport_versions: Vec<String>,
    #[facet(default)]
    pub assignee: Option<String>,
    /// Last completion state acknowledged by the document service
    #[facet(default)]
    pub completed: bool,
    /// Backports of this document, head first
    #[facet(default)]
    pub clones: CloneChain,
}

impl Document {
    /// A bare document with no metadata and no clones
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            summary: None,
            status: None,
            target_version: None,
            target_backport_versions: Vec::new(),
            assignee: None,
            completed: false,
            clones: CloneChain::empty(),
        }
    }

    /// Required backport versions with no clone targeting them
    pub fn missing_backports(&self) -> Vec<String> {
        gaps::missing_backports(&self.target_backport_versions, &self.clones)
    }

    /// Whether every required backport has a clone
    pub fn is_fully_backported(&self) -> bool {
        self.missing_backports().is_empty()
    }

    /// The assignee, treating an empty string like no assignee at all
    pub fn assignee(&self) -> Option<&str> {
        self.assignee.as_deref().filter(|a| !a.is_empty())
    }
}
