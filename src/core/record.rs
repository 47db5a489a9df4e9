//! Project record data model.
//!
//! A project record is the JSON document persisted once per project under
//! `projects/<name>.json`.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::{ProjectError, ProjectResult};
use super::validator;

/// Version assigned to freshly created records.
pub const INITIAL_VERSION: &str = "1.0.0";

/// Lifecycle status of a project record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    /// Created, no workflow attached through sync yet
    #[default]
    Draft,
    /// A workflow payload has been attached
    Synced,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Synced => write!(f, "synced"),
        }
    }
}

/// Git remote bookkeeping for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubInfo {
    /// Remote repository URL, once published
    pub repository: Option<String>,
    /// Branch the project is published on
    pub branch: String,
    /// Whether the last publish succeeded
    pub synced: bool,
    /// Time of the last successful publish
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl GithubInfo {
    /// Unpublished state on the given branch.
    pub fn unpublished(branch: impl Into<String>) -> Self {
        Self { repository: None, branch: branch.into(), synced: false, last_sync: None }
    }
}

/// Record metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub version: String,
    pub author: String,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Derived from `workflow`, never set directly
    #[serde(default)]
    pub node_count: usize,
    /// Derived from `workflow`, never set directly
    #[serde(default)]
    pub connection_count: usize,
    pub github: GithubInfo,
}

/// A persisted workflow project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ProjectStatus,
    #[serde(default)]
    pub workflow: Option<Value>,
    pub metadata: ProjectMetadata,
}

impl ProjectRecord {
    /// Build a fresh draft record.
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        branch: impl Into<String>,
        workflow: Option<Value>,
    ) -> Self {
        let name = name.into();
        let now = Utc::now();
        let mut record = Self {
            id: generate_project_id(),
            name: name.clone(),
            created_at: now,
            updated_at: now,
            status: ProjectStatus::Draft,
            workflow: workflow.filter(|w| !w.is_null()),
            metadata: ProjectMetadata {
                version: INITIAL_VERSION.to_string(),
                author: author.into(),
                description: default_description(&name),
                tags: BTreeSet::new(),
                node_count: 0,
                connection_count: 0,
                github: GithubInfo::unpublished(branch),
            },
        };
        record.refresh_counts();
        record
    }

    /// Recompute `nodeCount` and `connectionCount` from the embedded workflow.
    pub fn refresh_counts(&mut self) {
        let (nodes, connections) = self
            .workflow
            .as_ref()
            .map_or((0, 0), |w| (validator::node_count(w), validator::connection_count(w)));
        self.metadata.node_count = nodes;
        self.metadata.connection_count = connections;
    }

    /// Refresh `updatedAt` and the derived counts. Called on every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.refresh_counts();
    }

    /// Attach a workflow payload and mark the record synced.
    pub fn attach_workflow(&mut self, workflow: Value) -> ProjectResult<()> {
        self.workflow = Some(workflow).filter(|w| !w.is_null());
        self.status = ProjectStatus::Synced;
        self.metadata.version = bump_version(&self.metadata.version)?;
        self.touch();
        Ok(())
    }

    /// Record a successful publish.
    pub fn mark_published(&mut self, repository: impl Into<String>, branch: impl Into<String>) {
        let github = &mut self.metadata.github;
        github.repository = Some(repository.into());
        github.branch = branch.into();
        github.synced = true;
        github.last_sync = Some(Utc::now());
        self.touch();
    }

    /// Whether a workflow is embedded.
    pub fn has_workflow(&self) -> bool {
        self.workflow.is_some()
    }

    /// The embedded workflow's `active` flag (false when absent).
    pub fn workflow_active(&self) -> bool {
        self.workflow.as_ref().and_then(|w| w.get("active")).and_then(Value::as_bool).unwrap_or(false)
    }
}

/// Default description for a project.
pub fn default_description(name: &str) -> String {
    format!("workflow project: {name}")
}

/// Generate a unique project identifier.
pub fn generate_project_id() -> String {
    format!("proj_{}", Uuid::new_v4().simple())
}

/// Increment the patch component of a `major.minor.patch` version.
///
/// Components after the third are carried over unchanged.
pub fn bump_version(current: &str) -> ProjectResult<String> {
    let mut parts: Vec<String> = current.trim().split('.').map(String::from).collect();
    if parts.len() < 3 || parts[..2].iter().any(String::is_empty) {
        return Err(ProjectError::InvalidVersion(current.to_string()));
    }

    let patch: u64 =
        parts[2].parse().map_err(|_| ProjectError::InvalidVersion(current.to_string()))?;
    let next =
        patch.checked_add(1).ok_or_else(|| ProjectError::InvalidVersion(current.to_string()))?;
    parts[2] = next.to_string();
    Ok(parts.join("."))
}
