use super::types::Project;

/// Case-insensitive substring match over the repo name, topics and issue labels.
/// `lowered_query` must already be lower-cased; an empty query matches everything.
pub fn matches_query(project: &Project, lowered_query: &str) -> bool {
    if lowered_query.is_empty() {
        return true;
    }

    let contains = |value: &String| value.to_lowercase().contains(lowered_query);

    contains(&project.repo_name)
        || project.topics.iter().any(contains)
        || project.issues.iter().any(contains)
}

/// Conjunctive facet match: the project must carry every selected topic and
/// every selected issue label. An empty selection passes.
pub fn matches_facets(project: &Project, topics: &[String], issues: &[String]) -> bool {
    topics.iter().all(|t| project.has_topic(t)) && issues.iter().all(|i| project.has_issue(i))
}

/// Per-user search state: free-text query plus selected topics and issue labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    query: String,
    topics: Vec<String>,
    issues: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_lowercase();
    }

    /// Appends even when already selected; duplicates don't change the result.
    pub fn select_topic(&mut self, topic: impl Into<String>) {
        self.topics.push(topic.into());
    }

    pub fn select_issue(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    /// Removes every occurrence. Returns whether anything was selected.
    pub fn deselect_topic(&mut self, topic: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t != topic);
        self.topics.len() != before
    }

    pub fn deselect_issue(&mut self, issue: &str) -> bool {
        let before = self.issues.len();
        self.issues.retain(|i| i != issue);
        self.issues.len() != before
    }

    pub fn clear_topics(&mut self) {
        self.topics.clear();
    }

    pub fn clear_issues(&mut self) {
        self.issues.clear();
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.clear_topics();
        self.clear_issues();
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.topics.is_empty() && self.issues.is_empty()
    }

    /// Selected values for display, topics first, each shown once.
    pub fn active_filters(&self) -> Vec<&str> {
        let mut active: Vec<&str> = Vec::new();
        for value in self.topics.iter().chain(self.issues.iter()) {
            if !active.contains(&value.as_str()) {
                active.push(value);
            }
        }
        active
    }

    pub fn matches(&self, project: &Project) -> bool {
        matches_query(project, &self.query) && matches_facets(project, &self.topics, &self.issues)
    }

    /// Projects passing both the query and the facet selection, in list order.
    pub fn apply<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        projects.iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Project> {
        vec![
            Project::new("alpha").with_topics(["rust"]).with_issues(["bug"]),
            Project::new("beta")
                .with_topics(["rust", "cli"])
                .with_issues(["bug", "good first issue"]),
            Project::new("gamma").with_topics(["go", "cli"]).with_issues(["docs"]),
        ]
    }

    fn names(projects: Vec<&Project>) -> Vec<&str> {
        projects.into_iter().map(|p| p.repo_name.as_str()).collect()
    }

    #[test]
    fn test_empty_query_matches_everything() {
        for project in &catalog() {
            assert!(matches_query(project, ""));
        }
        assert!(matches_query(&Project::new(""), ""));
    }

    #[test]
    fn test_query_equal_to_name_matches() {
        let projects = catalog();
        for project in &projects {
            let mut state = FilterState::new();
            state.set_query(&project.repo_name.to_uppercase());
            assert!(state.matches(project));
        }
    }

    #[test]
    fn test_query_is_case_insensitive_substring() {
        let project = Project::new("alpha").with_topics(["rust"]).with_issues(["bug"]);
        let mut state = FilterState::new();
        state.set_query("AL");
        assert_eq!(state.query(), "al");
        assert!(state.matches(&project));

        state.set_query("Rus");
        assert!(state.matches(&project));

        state.set_query("bu");
        assert!(state.matches(&project));

        state.set_query("python");
        assert!(!state.matches(&project));
    }

    #[test]
    fn test_whitespace_query_is_not_empty() {
        let projects = vec![
            Project::new("good first").with_topics(["rust"]),
            Project::new("alpha").with_topics(["cli"]),
        ];
        let mut state = FilterState::new();
        state.set_query(" ");
        assert_eq!(state.query(), " ");
        assert!(!state.is_empty());
        assert_eq!(names(state.apply(&projects)), vec!["good first"]);
    }

    #[test]
    fn test_single_topic_filter() {
        let project = Project::new("alpha").with_topics(["rust"]).with_issues(["bug"]);
        assert!(matches_facets(&project, &["rust".into()], &[]));
        assert!(!matches_facets(&project, &["go".into()], &[]));
    }

    #[test]
    fn test_topic_filters_are_conjunctive() {
        let projects = catalog();
        let mut state = FilterState::new();
        state.select_topic("rust");
        state.select_topic("cli");
        assert_eq!(names(state.apply(&projects)), vec!["beta"]);
    }

    #[test]
    fn test_topic_and_issue_filters_combine() {
        let projects = catalog();
        let mut state = FilterState::new();
        state.select_topic("cli");
        assert_eq!(names(state.apply(&projects)), vec!["beta", "gamma"]);

        state.select_issue("docs");
        assert_eq!(names(state.apply(&projects)), vec!["gamma"]);

        state.select_issue("bug");
        assert!(state.apply(&projects).is_empty());
    }

    #[test]
    fn test_issue_value_does_not_satisfy_topic_filter() {
        let project = Project::new("delta").with_issues(["rust"]);
        assert!(!matches_facets(&project, &["rust".into()], &[]));
    }

    #[test]
    fn test_query_and_facets_intersect() {
        let projects = catalog();
        let mut state = FilterState::new();
        state.set_query("a");
        state.select_issue("bug");
        assert_eq!(names(state.apply(&projects)), vec!["alpha", "beta"]);

        state.select_topic("cli");
        assert_eq!(names(state.apply(&projects)), vec!["beta"]);
    }

    #[test]
    fn test_duplicate_selection_has_no_effect() {
        let projects = catalog();
        let mut once = FilterState::new();
        once.select_topic("rust");

        let mut twice = once.clone();
        twice.select_topic("rust");

        assert_eq!(twice.topics().len(), 2);
        assert_eq!(twice.active_filters(), vec!["rust"]);
        assert_eq!(names(once.apply(&projects)), names(twice.apply(&projects)));
    }

    #[test]
    fn test_deselect_removes_every_occurrence() {
        let mut state = FilterState::new();
        state.select_issue("bug");
        state.select_issue("bug");
        assert!(state.deselect_issue("bug"));
        assert!(state.issues().is_empty());
        assert!(!state.deselect_issue("bug"));
    }

    #[test]
    fn test_clear_restores_full_list() {
        let projects = catalog();
        let mut state = FilterState::new();
        state.set_query("gam");
        state.select_topic("go");
        state.select_issue("docs");
        state.clear();

        assert!(state.is_empty());
        assert_eq!(state.query(), "");
        assert_eq!(state.apply(&projects), projects.iter().collect::<Vec<_>>());
    }
}
