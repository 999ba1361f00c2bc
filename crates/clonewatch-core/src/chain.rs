//! Clone chain flattening and traversal
//!
//! A document's backports form a singly-linked chain: each clone may itself
//! have been cloned once more. The wire format nests them, but the core keeps
//! them as a flat, ordered list so that nothing downstream has to recurse.

use facet::Facet;
use std::collections::HashSet;
use tracing::warn;

/// Upper bound on the number of clones followed from a single document
pub const MAX_CHAIN_DEPTH: usize = 64;

/// One backport in a clone chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct ChainNode {
    /// Issue key of the clone, when the backend reported one
    #[facet(default)]
    pub id: Option<String>,
    /// Lifecycle label of the clone (e.g. "New", "Closed")
    #[facet(default)]
    pub status: Option<String>,
    /// Release this clone targets
    #[facet(default)]
    pub target_version: Option<String>,
}

/// Why a chain walk stopped before running out of links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum ChainCut {
    /// A node id was seen twice
    Cycle,
    /// More than [`MAX_CHAIN_DEPTH`] links
    TooDeep,
}

impl std::fmt::Display for ChainCut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainCut::Cycle => write!(f, "clone chain loops back on itself"),
            ChainCut::TooDeep => write!(f, "clone chain exceeds {MAX_CHAIN_DEPTH} clones"),
        }
    }
}

/// A linked representation of a clone chain that can be flattened.
///
/// Implemented by the nested wire type; tests implement it for their own
/// fixtures.
pub trait ChainLink {
    fn id(&self) -> Option<&str>;
    fn status(&self) -> Option<&str>;
    fn target_version(&self) -> Option<&str>;
    /// The next clone in the chain
    fn next(&self) -> Option<&Self>;
}

/// A flattened clone chain, head first
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct CloneChain {
    pub nodes: Vec<ChainNode>,
    /// Set when the walk was cut short on malformed input
    #[facet(default)]
    pub cut: Option<ChainCut>,
}

impl CloneChain {
    /// An empty chain (the document has no clones)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a chain directly from already flat nodes
    pub fn from_nodes(nodes: Vec<ChainNode>) -> Self {
        Self { nodes, cut: None }
    }

    /// Walk a linked chain starting at `head` and flatten it.
    ///
    /// The walk ends at the first node whose id was already visited or after
    /// [`MAX_CHAIN_DEPTH`] nodes. Either case is treated as the end of the
    /// chain and recorded in [`CloneChain::cut`].
    pub fn flatten<L: ChainLink>(head: Option<&L>) -> Self {
        let mut nodes = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut cut = None;
        let mut cursor = head;

        while let Some(link) = cursor {
            if nodes.len() == MAX_CHAIN_DEPTH {
                warn!(depth = MAX_CHAIN_DEPTH, "clone chain exceeds maximum depth, truncating");
                cut = Some(ChainCut::TooDeep);
                break;
            }
            if let Some(id) = link.id() {
                if !visited.insert(id) {
                    warn!(id, "clone chain revisits a node, stopping walk");
                    cut = Some(ChainCut::Cycle);
                    break;
                }
            }
            nodes.push(ChainNode {
                id: link.id().map(str::to_string),
                status: link.status().map(str::to_string),
                target_version: link.target_version().map(str::to_string),
            });
            cursor = link.next();
        }

        Self { nodes, cut }
    }

    /// Every target version present anywhere in the chain, head included.
    ///
    /// Nodes without a target version contribute nothing.
    pub fn covered_versions(&self) -> HashSet<&str> {
        self.nodes
            .iter()
            .filter_map(|node| node.target_version.as_deref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainNode> {
        self.nodes.iter()
    }
}
