pub mod facets;
pub mod filter;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::api::ApiClient;
use facets::Facets;
use filter::FilterState;
use types::Project;

/// Where the project list comes from.
#[derive(Debug, Clone)]
pub enum ProjectSource {
    File(PathBuf),
    /// `GET /all-projects` on the backend.
    Api,
}

impl std::fmt::Display for ProjectSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectSource::File(path) => write!(f, "file:{}", path.display()),
            ProjectSource::Api => write!(f, "api:/all-projects"),
        }
    }
}

/// The full project list together with its facet universe.
pub struct ProjectCatalog {
    projects: Vec<Project>,
    facets: Facets,
    loaded_at: DateTime<Utc>,
}

impl ProjectCatalog {
    pub fn new(projects: Vec<Project>) -> Self {
        let facets = Facets::build(&projects);
        Self {
            projects,
            facets,
            loaded_at: Utc::now(),
        }
    }

    pub async fn load(source: &ProjectSource, api: &ApiClient) -> Result<Self> {
        let catalog = Self::new(fetch_projects(source, api).await?);
        info!(
            %source,
            projects = catalog.len(),
            topics = catalog.facets.topics.len(),
            issues = catalog.facets.issues.len(),
            "project catalog loaded"
        );
        Ok(catalog)
    }

    /// Swap in a new list. The facet universe is rebuilt from it.
    pub fn replace(&mut self, projects: Vec<Project>) {
        self.facets = Facets::build(&projects);
        self.projects = projects;
        self.loaded_at = Utc::now();
        debug!(projects = self.projects.len(), "project catalog replaced");
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn search(&self, filter: &FilterState) -> Vec<&Project> {
        filter.apply(&self.projects)
    }
}

pub async fn fetch_projects(source: &ProjectSource, api: &ApiClient) -> Result<Vec<Project>> {
    match source {
        ProjectSource::File(path) => read_projects_file(path).await,
        ProjectSource::Api => api.fetch_projects().await,
    }
}

async fn read_projects_file(path: &Path) -> Result<Vec<Project>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read projects file {}", path.display()))?;
    types::parse_project_list(&bytes)
        .with_context(|| format!("Failed to parse projects file {}", path.display()))
}
