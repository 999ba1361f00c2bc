//! Card visibility rules

use crate::document::Document;
use facet::Facet;
use std::collections::BTreeSet;

/// Selector value that matches every assignee
pub const ALL_ASSIGNEES: &str = "all";

/// Assignee part of the filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
#[repr(u8)]
pub enum AssigneeFilter {
    /// Every document, assigned or not
    #[default]
    All,
    /// Only documents owned by this assignee
    Only(String),
}

impl AssigneeFilter {
    /// Parse a selector value; [`ALL_ASSIGNEES`] selects everything
    pub fn parse(selector: &str) -> Self {
        if selector == ALL_ASSIGNEES {
            AssigneeFilter::All
        } else {
            AssigneeFilter::Only(selector.to_string())
        }
    }

    /// Unassigned documents match only [`AssigneeFilter::All`]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            AssigneeFilter::All => true,
            AssigneeFilter::Only(name) => doc.assignee() == Some(name.as_str()),
        }
    }

    /// The selector value this filter was parsed from
    pub fn as_selector(&self) -> &str {
        match self {
            AssigneeFilter::All => ALL_ASSIGNEES,
            AssigneeFilter::Only(name) => name,
        }
    }
}

/// Current filter controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Facet)]
pub struct Filter {
    pub assignee: AssigneeFilter,
    /// Whether completed documents are shown
    pub show_completed: bool,
}

/// Visibility decision for one document
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct Visibility {
    pub id: String,
    pub visible: bool,
}

impl Filter {
    pub fn new(assignee: AssigneeFilter, show_completed: bool) -> Self {
        Self {
            assignee,
            show_completed,
        }
    }

    /// Visible iff the assignee matches and the document is either not
    /// completed or completed documents are shown.
    pub fn is_visible(&self, doc: &Document) -> bool {
        self.assignee.matches(doc) && (!doc.completed || self.show_completed)
    }

    /// One decision per document, in input order
    pub fn visibility(&self, documents: &[Document]) -> Vec<Visibility> {
        documents
            .iter()
            .map(|doc| Visibility {
                id: doc.id.clone(),
                visible: self.is_visible(doc),
            })
            .collect()
    }

    /// The documents that pass the filter, in input order
    pub fn apply<'a>(&'a self, documents: &'a [Document]) -> impl Iterator<Item = &'a Document> {
        documents.iter().filter(|doc| self.is_visible(doc))
    }
}

/// Distinct non-empty assignees, sorted ascending
pub fn assignee_options(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter_map(Document::assignee)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, assignee: Option<&str>, completed: bool) -> Document {
        let mut doc = Document::new(id);
        doc.assignee = assignee.map(str::to_string);
        doc.completed = completed;
        doc
    }

    fn fixture() -> Vec<Document> {
        vec![
            doc("A", Some("bob"), false),
            doc("B", Some("bob"), true),
            doc("C", Some("alice"), false),
            doc("D", None, false),
            doc("E", None, true),
        ]
    }

    fn visible_ids(filter: &Filter, documents: &[Document]) -> Vec<String> {
        filter.apply(documents).map(|d| d.id.clone()).collect()
    }

    #[test]
    fn all_without_completed_hides_only_completed() {
        let docs = fixture();
        let filter = Filter::new(AssigneeFilter::All, false);
        for decision in filter.visibility(&docs) {
            let doc = docs.iter().find(|d| d.id == decision.id).expect("same ids");
            assert_eq!(decision.visible, !doc.completed, "document {}", doc.id);
        }
    }

    #[test]
    fn all_with_completed_shows_everything() {
        let docs = fixture();
        let filter = Filter::new(AssigneeFilter::All, true);
        assert_eq!(visible_ids(&filter, &docs), vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn specific_assignee_never_matches_unassigned() {
        let docs = fixture();
        let filter = Filter::new(AssigneeFilter::parse("bob"), true);
        assert_eq!(visible_ids(&filter, &docs), vec!["A", "B"]);

        let filter = Filter::new(AssigneeFilter::parse("bob"), false);
        assert_eq!(visible_ids(&filter, &docs), vec!["A"]);
    }

    #[test]
    fn empty_assignee_counts_as_unassigned() {
        let docs = vec![doc("A", Some(""), false)];
        assert!(!Filter::new(AssigneeFilter::parse(""), false).is_visible(&docs[0]));
        assert!(Filter::default().is_visible(&docs[0]));
    }

    #[test]
    fn selector_round_trips() {
        assert_eq!(AssigneeFilter::parse("all"), AssigneeFilter::All);
        assert_eq!(AssigneeFilter::parse("bob").as_selector(), "bob");
        assert_eq!(AssigneeFilter::All.as_selector(), ALL_ASSIGNEES);
    }

    #[test]
    fn visibility_is_deterministic() {
        let docs = fixture();
        let filter = Filter::new(AssigneeFilter::parse("alice"), false);
        assert_eq!(filter.visibility(&docs), filter.visibility(&docs));
    }

    #[test]
    fn assignee_options_are_sorted_unique_and_non_empty() {
        let mut docs = fixture();
        docs.push(doc("F", Some(""), false));
        docs.push(doc("G", Some("Zed"), false));
        assert_eq!(assignee_options(&docs), vec!["Zed", "alice", "bob"]);
    }
}
