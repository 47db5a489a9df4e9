//! Project record store.
//!
//! One JSON document per project under `projects/`, a workflow export under
//! `workflows/` and a README next to the record. The three artifacts are written
//! as independent steps; an interruption between them leaves them out of step.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::config::{Config, StoreLayout};
use super::docs;
use super::error::{ProjectError, ProjectResult};
use super::listing::{ListMode, Listing, ProjectSummary, SkippedDocument};
use super::record::{default_description, ProjectRecord};

/// Store-wide behavior.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Write via temp file + rename instead of writing in place
    pub atomic_writes: bool,
    /// Author stamped on new records
    pub author: String,
    /// Branch recorded on new records
    pub branch: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            atomic_writes: true,
            author: super::config::UNKNOWN_AUTHOR.to_string(),
            branch: "main".to_string(),
        }
    }
}

impl StoreOptions {
    /// Options resolved from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            atomic_writes: config.storage.atomic_writes,
            author: config.author_name(),
            branch: config.git.branch.clone(),
        }
    }
}

/// Options for [`ProjectStore::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Replace an existing record instead of failing
    pub overwrite: bool,
    /// Description (defaults to `workflow project: <name>`)
    pub description: Option<String>,
    /// Initial tags
    pub tags: Vec<String>,
}

/// Workflow export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Pretty-printed JSON, as stored
    Json,
    /// YAML, for hand editing
    Yaml,
}

impl ExportFormat {
    /// File extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    fn render(self, workflow: &Value) -> ProjectResult<String> {
        match self {
            Self::Json => to_pretty_json(workflow),
            Self::Yaml => Ok(serde_yaml::to_string(workflow)?),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ProjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(ProjectError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// File-backed project record store.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    layout: StoreLayout,
    options: StoreOptions,
}

impl ProjectStore {
    /// Open a store, creating the `projects/` and `workflows/` directories.
    pub fn new(layout: StoreLayout, options: StoreOptions) -> ProjectResult<Self> {
        fs::create_dir_all(&layout.projects_dir)?;
        fs::create_dir_all(&layout.workflows_dir)?;
        Ok(Self { layout, options })
    }

    /// Open the store described by a configuration.
    pub fn from_config(config: &Config) -> ProjectResult<Self> {
        Self::new(config.layout(), StoreOptions::from_config(config))
    }

    /// Directory layout.
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Store options.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Whether a record exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.layout.record_path(name).is_file()
    }

    /// Create a fresh draft record, its workflow export (if any) and its README.
    pub fn create(
        &self,
        name: &str,
        workflow: Option<Value>,
        options: CreateOptions,
    ) -> ProjectResult<ProjectRecord> {
        validate_name(name)?;

        if self.exists(name) {
            if !options.overwrite {
                return Err(ProjectError::AlreadyExists(name.to_string()));
            }
            tracing::warn!(project = name, "overwriting existing project record");
        }

        let mut record =
            ProjectRecord::new(name, &self.options.author, &self.options.branch, workflow);
        record.metadata.description =
            options.description.unwrap_or_else(|| default_description(name));
        record.metadata.tags.extend(options.tags);

        self.save(&record)?;
        self.write_export(&record)?;
        self.write_file(&self.layout.readme_path(name), &docs::render_readme(&record))?;

        tracing::info!(project = name, id = %record.id, "created project");
        Ok(record)
    }

    /// Attach a workflow payload to an existing record.
    ///
    /// Marks the record synced, bumps the patch version, rewrites the workflow
    /// export and prepends a version-history line to the README when one exists.
    pub fn update(&self, name: &str, workflow: Value) -> ProjectResult<ProjectRecord> {
        let mut record = self.load(name)?;
        record.attach_workflow(workflow)?;

        self.save(&record)?;
        self.write_export(&record)?;
        self.append_history(&record, "Workflow updated")?;

        tracing::info!(project = name, version = %record.metadata.version, "updated project");
        Ok(record)
    }

    /// Load a record.
    pub fn load(&self, name: &str) -> ProjectResult<ProjectRecord> {
        validate_name(name)?;
        let path = self.layout.record_path(name);
        if !path.is_file() {
            return Err(ProjectError::NotFound(format!("project '{name}'")));
        }
        read_record(&path)
    }

    /// Persist a record in full.
    pub fn save(&self, record: &ProjectRecord) -> ProjectResult<()> {
        let content = to_pretty_json(record)?;
        self.write_file(&self.layout.record_path(&record.name), &content)
    }

    /// Read every record and project it to a summary row.
    ///
    /// Rows follow directory enumeration order.
    pub fn list(&self, mode: ListMode) -> ProjectResult<Listing> {
        let mut listing = Listing::default();

        for entry in fs::read_dir(&self.layout.projects_dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match read_record(&path) {
                Ok(record) => listing.rows.push(ProjectSummary::from(&record)),
                Err(ProjectError::Malformed { path, source }) if mode == ListMode::Lenient => {
                    tracing::warn!(path = %path.display(), error = %source, "skipping malformed project");
                    listing.skipped.push(SkippedDocument { path, error: source.to_string() });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(listing)
    }

    /// Export the embedded workflow to `workflows/<name>.<ext>`.
    pub fn export_workflow(&self, name: &str, format: ExportFormat) -> ProjectResult<PathBuf> {
        let record = self.load(name)?;
        let workflow = record
            .workflow
            .as_ref()
            .ok_or_else(|| ProjectError::NotFound(format!("workflow data for '{name}'")))?;

        let path = self.layout.export_path(name, format.extension());
        self.write_file(&path, &format.render(workflow)?)?;

        tracing::info!(project = name, path = %path.display(), "exported workflow");
        Ok(path)
    }

    /// Rewrite the JSON export and create the README if it is missing.
    pub fn refresh_artifacts(&self, record: &ProjectRecord) -> ProjectResult<()> {
        self.write_export(record)?;
        let readme = self.layout.readme_path(&record.name);
        if !readme.exists() {
            self.write_file(&readme, &docs::render_readme(record))?;
        }
        Ok(())
    }

    /// Record a successful publish in the project's git bookkeeping.
    pub fn record_publish(
        &self,
        name: &str,
        repository: &str,
        branch: &str,
    ) -> ProjectResult<ProjectRecord> {
        let mut record = self.load(name)?;
        record.mark_published(repository, branch);
        self.save(&record)?;
        self.append_history(&record, &format!("Published to {repository}"))?;
        Ok(record)
    }

    /// Write the JSON export, or remove stale exports when the record has no workflow.
    fn write_export(&self, record: &ProjectRecord) -> ProjectResult<()> {
        if let Some(workflow) = &record.workflow {
            let path = self.layout.export_path(&record.name, ExportFormat::Json.extension());
            return self.write_file(&path, &to_pretty_json(workflow)?);
        }

        for format in [ExportFormat::Json, ExportFormat::Yaml] {
            let path = self.layout.export_path(&record.name, format.extension());
            if path.is_file() {
                fs::remove_file(&path)?;
                tracing::info!(path = %path.display(), "removed stale workflow export");
            }
        }
        Ok(())
    }

    fn append_history(&self, record: &ProjectRecord, note: &str) -> ProjectResult<()> {
        let path = self.layout.readme_path(&record.name);
        if !path.exists() {
            return Ok(());
        }

        let readme = fs::read_to_string(&path)?;
        let entry = docs::version_entry(&record.metadata.version, note);
        if let Some(updated) = docs::add_version_entry(&readme, &entry) {
            self.write_file(&path, &updated)?;
        }
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> ProjectResult<()> {
        if self.options.atomic_writes {
            write_atomic(path, content)?;
        } else {
            fs::write(path, content)?;
        }
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
        Ok(())
    }
}

/// Check that a project name is usable as a file stem.
pub fn validate_name(name: &str) -> ProjectResult<()> {
    let mut errors = Vec::new();
    if name.trim().is_empty() {
        errors.push("name is empty".to_string());
    }
    if name.contains(['/', '\\', '\0']) {
        errors.push("name contains a path separator".to_string());
    }
    if name.starts_with('.') {
        errors.push("name starts with '.'".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProjectError::validation(format!("Invalid project name '{name}'"), errors))
    }
}

fn read_record(path: &Path) -> ProjectResult<ProjectRecord> {
    let content = fs::read_to_string(path)?;
    let mut record: ProjectRecord = serde_json::from_str(&content)
        .map_err(|source| ProjectError::Malformed { path: path.to_path_buf(), source })?;
    record.refresh_counts();
    Ok(record)
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> ProjectResult<String> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    Ok(content)
}

/// Write to a temp file in the target directory, then rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
