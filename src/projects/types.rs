use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Key prefixes of the flat per-slot record shape (`gh_topics_1`, `issue_label_3`, ...).
const TOPIC_SLOT_PREFIXES: &[&str] = &["gh_topics_", "topic_"];
const ISSUE_SLOT_PREFIXES: &[&str] = &["issue_label_", "issue_"];

/// A project listed in the finder.
///
/// Topics and issue labels are plain ordered tag lists. Records coming from the
/// backend in the flat slot shape are folded into these lists on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawProject")]
pub struct Project {
    #[serde(rename = "gh_repo_name")]
    pub repo_name: String,
    #[serde(rename = "gh_description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "gh_repo_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub topics: Vec<String>,
    pub issues: Vec<String>,
}

impl Project {
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn has_issue(&self, issue: &str) -> bool {
        self.issues.iter().any(|i| i == issue)
    }
}

#[cfg(test)]
impl Project {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            description: None,
            url: None,
            topics: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(topics.into_iter().map(Into::into));
        self
    }

    pub fn with_issues<I, S>(mut self, issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issues.extend(issues.into_iter().map(Into::into));
        self
    }
}

/// Wire shape accepted from files and the backend.
#[derive(Deserialize)]
struct RawProject {
    #[serde(default, alias = "repo_name")]
    gh_repo_name: Option<String>,
    #[serde(default, alias = "description")]
    gh_description: Option<String>,
    #[serde(default, alias = "url")]
    gh_repo_url: Option<String>,
    #[serde(default)]
    topics: Vec<Option<String>>,
    #[serde(default)]
    issues: Vec<Option<String>>,
    #[serde(flatten)]
    slots: BTreeMap<String, Value>,
}

impl From<RawProject> for Project {
    fn from(raw: RawProject) -> Self {
        let mut topics = non_empty(raw.topics);
        topics.extend(slot_values(&raw.slots, TOPIC_SLOT_PREFIXES));

        let mut issues = non_empty(raw.issues);
        issues.extend(slot_values(&raw.slots, ISSUE_SLOT_PREFIXES));

        Self {
            repo_name: raw.gh_repo_name.unwrap_or_default(),
            description: raw.gh_description.filter(|d| !d.trim().is_empty()),
            url: raw.gh_repo_url.filter(|u| !u.trim().is_empty()),
            topics,
            issues,
        }
    }
}

fn non_empty(values: Vec<Option<String>>) -> Vec<String> {
    values
        .into_iter()
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect()
}

/// Collect populated `<prefix><n>` slots, ordered by `n`.
fn slot_values(slots: &BTreeMap<String, Value>, prefixes: &[&str]) -> Vec<String> {
    let mut indexed: Vec<(u32, String)> = slots
        .iter()
        .filter_map(|(key, value)| {
            let index = prefixes
                .iter()
                .find_map(|p| key.strip_prefix(p))?
                .parse::<u32>()
                .ok()?;
            let tag = value.as_str()?;
            (!tag.trim().is_empty()).then(|| (index, tag.to_string()))
        })
        .collect();

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, tag)| tag).collect()
}

/// Parse a project list: either a JSON array of records, or an object whose
/// values are records (keyed by id). Keyed lists keep numeric ids in numeric order.
/// Records that don't fit the project shape are skipped.
pub fn parse_project_list(bytes: &[u8]) -> Result<Vec<Project>> {
    let value: Value = serde_json::from_slice(bytes).context("Project list is not valid JSON")?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => keyed_values(map),
        other => anyhow::bail!("Expected a list or map of projects, got {}", kind(&other)),
    };

    let total = items.len();
    let projects: Vec<Project> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(project) => Some(project),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed project record");
                None
            }
        })
        .collect();

    if projects.len() != total {
        warn!(kept = projects.len(), total, "project list had malformed records");
    }
    Ok(projects)
}

fn keyed_values(map: Map<String, Value>) -> Vec<Value> {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        (Ok(_), Err(_)) => std::cmp::Ordering::Less,
        (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    });
    entries.into_iter().map(|(_, v)| v).collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
