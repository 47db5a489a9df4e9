//! Generated markdown: project READMEs and the editor rules file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::StoreLayout;
use super::record::ProjectRecord;

/// Heading under which version entries are prepended.
pub const VERSION_HISTORY_HEADING: &str = "## Version History";

/// File name of the editor rules document.
pub const EDITOR_RULES_FILE: &str = "flowdeck-projects.md";

static VERSION_HISTORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^## Version History[ \t]*\r?\n").expect("static regex"));

/// Render the README for a project.
pub fn render_readme(record: &ProjectRecord) -> String {
    let meta = &record.metadata;
    let github = &meta.github;

    let workflow_info = if record.has_workflow() {
        format!(
            "- **Nodes**: {}\n- **Connections**: {}\n- **Active**: {}\n",
            meta.node_count,
            meta.connection_count,
            if record.workflow_active() { "Yes" } else { "No" }
        )
    } else {
        "No workflow data available\n".to_string()
    };

    let tags = if meta.tags.is_empty() {
        String::new()
    } else {
        format!("- **Tags**: {}\n", meta.tags.iter().cloned().collect::<Vec<_>>().join(", "))
    };

    let name = &record.name;
    format!(
        "# {name}

## Overview
{description}

## Project Details
- **ID**: {id}
- **Created**: {created}
- **Updated**: {updated}
- **Status**: {status}
- **Author**: {author}
{tags}
## Workflow Information
{workflow_info}
## GitHub Integration
- **Repository**: {repository}
- **Synced**: {synced}
- **Last Sync**: {last_sync}

## Usage
```bash
# Export workflow
flowdeck export {name}

# Publish to the remote
flowdeck sync {name} <repo-url>
```

## Files
- `{name}.json` - Project metadata and workflow
- `../workflows/{name}.json` - Workflow export
- `{name}.md` - This README

{heading}
{entry}
",
        description = meta.description,
        id = record.id,
        created = record.created_at.to_rfc3339(),
        updated = record.updated_at.to_rfc3339(),
        status = record.status,
        author = meta.author,
        repository = github.repository.as_deref().unwrap_or("Not configured"),
        synced = if github.synced { "Yes" } else { "No" },
        last_sync = github.last_sync.map_or_else(|| "Never".to_string(), |t| t.to_rfc3339()),
        heading = VERSION_HISTORY_HEADING,
        entry = version_entry(&meta.version, "Created"),
    )
}

/// One line of version history, dated today.
pub fn version_entry(version: &str, note: &str) -> String {
    format!("- **v{version}**: {note} ({})", Utc::now().format("%Y-%m-%d"))
}

/// Prepend an entry under the version history heading.
///
/// Returns `None` when the document has no version history section.
pub fn add_version_entry(readme: &str, entry: &str) -> Option<String> {
    let found = VERSION_HISTORY.find(readme)?;
    let mut updated = String::with_capacity(readme.len() + entry.len() + 1);
    updated.push_str(&readme[..found.end()]);
    updated.push_str(entry);
    updated.push('\n');
    updated.push_str(&readme[found.end()..]);
    Some(updated)
}

/// Contents of the `.gitignore` written by `setup-remote`.
pub fn default_gitignore() -> &'static str {
    "# Workflow project files
node_modules/
.env
.env.local
*.log
.DS_Store
.cursor/
"
}

/// Render the editor rules document for a layout.
pub fn render_editor_rules(layout: &StoreLayout) -> String {
    format!(
        "# Workflow Project Rules

## Auto-create project files
When creating new workflows:
1. Always create a corresponding .json file in {projects}/
2. Use the workflow name as the filename
3. Include workflow metadata and version info

## Project Structure
- {projects}/ - All project files
- {workflows}/ - Exported workflows

## Git Integration
- Commit changes when workflows are updated
- Use conventional commit messages
- Tag releases with semantic versioning

## File Naming Convention
- Project files: {{workflow-name}}.json
- Exports: {{workflow-name}}.{{format}}
",
        projects = layout.projects_dir.display(),
        workflows = layout.workflows_dir.display(),
    )
}

/// Write the editor rules file into `dir` unless it already exists.
///
/// Returns the path and whether the file was written.
pub fn write_editor_rules(dir: &Path, layout: &StoreLayout) -> std::io::Result<(PathBuf, bool)> {
    let path = dir.join(EDITOR_RULES_FILE);
    if path.exists() {
        return Ok((path, false));
    }

    fs::create_dir_all(dir)?;
    fs::write(&path, render_editor_rules(layout))?;
    tracing::info!(path = %path.display(), "wrote editor rules");
    Ok((path, true))
}
