//! Backport gap analysis and reporting

use crate::chain::CloneChain;
use crate::document::Document;
use crate::store::DocumentStore;
use facet::Facet;

/// Required versions that have no clone in `chain`, in declaration order.
///
/// An empty requirement list always yields no gaps, whatever the chain holds.
pub fn missing_backports(required: &[String], chain: &CloneChain) -> Vec<String> {
    if required.is_empty() {
        return Vec::new();
    }

    let covered = chain.covered_versions();
    required
        .iter()
        .filter(|version| !covered.contains(version.as_str()))
        .cloned()
        .collect()
}

/// Gaps found for a single document
#[derive(Debug, Clone, PartialEq, Eq, Facet)]
pub struct DocumentGaps {
    pub id: String,
    /// Missing versions in declaration order
    pub missing: Vec<String>,
}

/// Backport coverage across every document in a store
#[derive(Debug, Clone, Facet)]
pub struct BackportReport {
    /// Number of documents examined
    pub total_documents: usize,

    /// Documents that declare at least one required backport
    pub tracked_documents: usize,

    /// Documents with at least one missing backport, in store order
    pub incomplete: Vec<DocumentGaps>,
}

impl BackportReport {
    /// Analyze every document in the store
    pub fn compute(store: &DocumentStore) -> Self {
        Self::from_documents(store.documents())
    }

    /// Analyze an arbitrary set of documents, e.g. only the visible ones
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut total_documents = 0;
        let mut tracked_documents = 0;
        let mut incomplete = Vec::new();

        for doc in documents {
            total_documents += 1;
            if doc.target_backport_versions.is_empty() {
                continue;
            }
            tracked_documents += 1;

            let missing = doc.missing_backports();
            if !missing.is_empty() {
                incomplete.push(DocumentGaps {
                    id: doc.id.clone(),
                    missing,
                });
            }
        }

        BackportReport {
            total_documents,
            tracked_documents,
            incomplete,
        }
    }

    /// Total number of missing backports across all documents
    pub fn missing_count(&self) -> usize {
        self.incomplete.iter().map(|g| g.missing.len()).sum()
    }

    /// Share of tracked documents with full coverage (0.0 - 100.0)
    pub fn coverage_percent(&self) -> f64 {
        if self.tracked_documents == 0 {
            return 100.0;
        }
        let complete = self.tracked_documents - self.incomplete.len();
        (complete as f64 / self.tracked_documents as f64) * 100.0
    }

    /// Whether no tracked document is missing a backport
    pub fn is_passing(&self) -> bool {
        self.incomplete.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::tests::linked;
    use crate::versions::parse_versions;

    fn chain_of(versions: &[Option<&str>]) -> CloneChain {
        let pairs: Vec<_> = versions.iter().map(|v| (None, *v)).collect();
        CloneChain::flatten(linked(&pairs).as_ref())
    }

    #[test]
    fn reports_only_uncovered_versions_in_order() {
        let required = parse_versions("v1, v2, v3");
        let chain = chain_of(&[Some("v3"), Some("v1")]);
        assert_eq!(missing_backports(&required, &chain), vec!["v2"]);
    }

    #[test]
    fn declaration_order_is_preserved() {
        let required = parse_versions("4.16.z, 4.18.z, 4.17.z");
        let chain = chain_of(&[Some("4.18.z")]);
        assert_eq!(missing_backports(&required, &chain), vec![
            "4.16.z", "4.17.z"
        ]);
    }

    #[test]
    fn no_requirements_means_no_gaps() {
        let chain = chain_of(&[Some("v1"), None]);
        assert!(missing_backports(&[], &chain).is_empty());
        assert!(missing_backports(&[], &CloneChain::empty()).is_empty());
    }

    #[test]
    fn full_coverage_means_no_gaps() {
        let required = parse_versions("v1, v2");
        let chain = chain_of(&[Some("v2"), None, Some("v1"), Some("v9")]);
        assert!(missing_backports(&required, &chain).is_empty());
    }

    #[test]
    fn everything_missing_without_clones() {
        let required = parse_versions("v1, v2");
        assert_eq!(
            missing_backports(&required, &CloneChain::empty()),
            vec!["v1", "v2"]
        );
    }

    #[test]
    fn document_target_version_does_not_count_as_coverage() {
        let mut doc = Document::new("OCPBUGS-1");
        doc.target_version = Some("v1".to_string());
        doc.target_backport_versions = parse_versions("v1");
        assert_eq!(doc.missing_backports(), vec!["v1"]);
        assert!(!doc.is_fully_backported());
    }

    #[test]
    fn report_aggregates_store() {
        let mut complete = Document::new("A");
        complete.target_backport_versions = parse_versions("v1");
        complete.clones = chain_of(&[Some("v1")]);

        let mut partial = Document::new("B");
        partial.target_backport_versions = parse_versions("v1, v2");
        partial.clones = chain_of(&[Some("v1")]);

        let untracked = Document::new("C");

        let report = BackportReport::from_documents([&complete, &partial, &untracked]);
        assert_eq!(report.total_documents, 3);
        assert_eq!(report.tracked_documents, 2);
        assert_eq!(report.missing_count(), 1);
        assert_eq!(report.incomplete, vec![DocumentGaps {
            id: "B".to_string(),
            missing: vec!["v2".to_string()],
        }]);
        assert!(!report.is_passing());
        assert!((report.coverage_percent() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_report_passes() {
        let report = BackportReport::from_documents(std::iter::empty());
        assert!(report.is_passing());
        assert_eq!(report.coverage_percent(), 100.0);
    }
}
