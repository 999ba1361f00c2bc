//! Card view model
//!
//! Everything a front end shows for a document is derived here from the
//! document itself. Nothing is stored separately, so the toggle label can
//! never drift from the completion state.

use crate::chain::ChainCut;
use crate::document::Document;
use crate::versions::join_versions;
use facet::Facet;

pub const NO_SUMMARY: &str = "No summary available";
pub const UNASSIGNED: &str = "Unassigned";
pub const NO_VERSION: &str = "N/A";

/// The completion toggle shown on a card
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct ToggleButton {
    pub label: String,
    pub title: String,
    pub class: String,
    /// Value the toggle would request when pressed
    pub requests_completed: bool,
}

impl ToggleButton {
    pub fn for_state(completed: bool) -> Self {
        let (label, title, class) = if completed {
            (
                "Mark as Incomplete",
                "Mark this card as incomplete",
                "incomplete-button",
            )
        } else {
            (
                "Mark as Complete",
                "Mark this card as complete",
                "complete-button",
            )
        };
        ToggleButton {
            label: label.to_string(),
            title: title.to_string(),
            class: class.to_string(),
            requests_completed: !completed,
        }
    }
}

/// One clone row in the backports section
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct CloneRow {
    #[facet(default)]
    pub id: Option<String>,
    #[facet(default)]
    pub link: Option<String>,
    #[facet(default)]
    pub status: Option<String>,
    #[facet(default)]
    pub status_class: Option<String>,
    #[facet(default)]
    pub target_version: Option<String>,
}

/// Display-ready projection of a document
#[derive(Debug, Clone, PartialEq, Facet)]
pub struct CardView {
    pub id: String,
    pub link: String,
    pub summary: String,
    pub status: String,
    pub status_class: String,
    pub target_version: String,
    pub backport_versions: String,
    pub assignee: String,
    pub completed: bool,
    pub toggle: ToggleButton,
    /// Missing backports, in declaration order
    pub missing_backports: Vec<String>,
    pub clones: Vec<CloneRow>,
    /// Set when the clone chain was cut short while loading
    #[facet(default)]
    pub chain_cut: Option<ChainCut>,
}

impl CardView {
    /// Derive the card for `doc`, linking issue keys under `browse_url`
    pub fn derive(doc: &Document, browse_url: &str) -> Self {
        CardView {
            id: doc.id.clone(),
            link: issue_link(browse_url, &doc.id),
            summary: doc
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NO_SUMMARY.to_string()),
            status: doc.status.clone().unwrap_or_default(),
            status_class: status_class(doc.status.as_deref()),
            target_version: doc
                .target_version
                .clone()
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NO_VERSION.to_string()),
            backport_versions: join_versions(&doc.target_backport_versions),
            assignee: doc.assignee().unwrap_or(UNASSIGNED).to_string(),
            completed: doc.completed,
            toggle: ToggleButton::for_state(doc.completed),
            missing_backports: doc.missing_backports(),
            clones: doc
                .clones
                .iter()
                .map(|node| CloneRow {
                    id: node.id.clone(),
                    link: node.id.as_deref().map(|id| issue_link(browse_url, id)),
                    status: node.status.clone(),
                    status_class: node.status.as_deref().map(|s| status_class(Some(s))),
                    target_version: node.target_version.clone(),
                })
                .collect(),
            chain_cut: doc.clones.cut,
        }
    }

    /// Warning lines for the missing backports section.
    ///
    /// A truncated chain is reported after the missing versions, since clones
    /// past the cut were never checked.
    pub fn warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.missing_backports
            .iter()
            .map(|version| format!("Missing backport for version {version}"))
            .chain(
                self.chain_cut
                    .map(|cut| format!("Backports not fully checked: {cut}")),
            )
    }
}

/// Badge class for a status label, e.g. `status-closed`
pub fn status_class(status: Option<&str>) -> String {
    match status.filter(|s| !s.is_empty()) {
        Some(status) => format!("status-{}", status.to_lowercase().replace(' ', "-")),
        None => "status-unknown".to_string(),
    }
}

/// Link to an issue in the tracker's web UI
pub fn issue_link(browse_url: &str, id: &str) -> String {
    format!("{}/{}", browse_url.trim_end_matches('/'), id)
}
