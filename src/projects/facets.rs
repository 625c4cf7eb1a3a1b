use std::collections::HashSet;

use super::types::Project;

/// Issue labels that mark newcomer-friendly work, most important first.
const PRIORITY_ISSUE_LABELS: &[&str] = &[
    "good first issue",
    "up-for-grabs",
    "help wanted",
    "easy to fix",
    "beginner experience",
    "easy",
];

/// Distinct topic and issue values across a project list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub topics: Vec<String>,
    pub issues: Vec<String>,
}

impl Facets {
    /// Topics keep first-seen order; issues put the newcomer labels first.
    pub fn build(projects: &[Project]) -> Self {
        let topics = distinct(projects.iter().flat_map(|p| p.topics.iter()));
        let mut issues = distinct(projects.iter().flat_map(|p| p.issues.iter()));
        prioritize_issues(&mut issues);
        Self { topics, issues }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty() && self.issues.is_empty()
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn has_issue(&self, issue: &str) -> bool {
        self.issues.iter().any(|i| i == issue)
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        if !value.is_empty() && seen.insert(value.as_str()) {
            out.push(value.clone());
        }
    }
    out
}

fn prioritize_issues(issues: &mut [String]) {
    // Stable sort: non-priority labels stay in first-seen order.
    issues.sort_by_key(|label| {
        PRIORITY_ISSUE_LABELS
            .iter()
            .position(|p| *p == label.as_str())
            .unwrap_or(PRIORITY_ISSUE_LABELS.len())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Project> {
        vec![
            Project::new("alpha")
                .with_topics(["rust", "cli"])
                .with_issues(["bug", "good first issue"]),
            Project::new("beta")
                .with_topics(["web", "rust", ""])
                .with_issues(["help wanted", "bug"]),
            Project::new("gamma").with_topics(["cli"]),
        ]
    }

    #[test]
    fn test_build_is_distinct_and_non_empty() {
        let facets = Facets::build(&sample());
        assert_eq!(facets.topics, vec!["rust", "cli", "web"]);
        assert!(!facets.topics.iter().any(|t| t.is_empty()));

        let unique: HashSet<_> = facets.issues.iter().collect();
        assert_eq!(unique.len(), facets.issues.len());
    }

    #[test]
    fn test_priority_labels_lead() {
        let facets = Facets::build(&sample());
        assert_eq!(facets.issues, vec!["good first issue", "help wanted", "bug"]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let projects = sample();
        assert_eq!(Facets::build(&projects), Facets::build(&projects));
    }

    #[test]
    fn test_empty_list() {
        let facets = Facets::build(&[]);
        assert!(facets.is_empty());
    }
}
