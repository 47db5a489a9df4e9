//! Summary rows for listing stored projects.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::record::{ProjectRecord, ProjectStatus};

/// How [`ProjectStore::list`](super::ProjectStore::list) treats unreadable documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Abort on the first malformed document
    #[default]
    Strict,
    /// Skip malformed documents and report them
    Lenient,
}

/// One row of the project listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub name: String,
    pub id: String,
    pub status: ProjectStatus,
    pub version: String,
    pub updated_at: DateTime<Utc>,
    pub has_workflow: bool,
    pub node_count: usize,
    pub connection_count: usize,
    pub github_synced: bool,
}

impl From<&ProjectRecord> for ProjectSummary {
    fn from(record: &ProjectRecord) -> Self {
        Self {
            name: record.name.clone(),
            id: record.id.clone(),
            status: record.status,
            version: record.metadata.version.clone(),
            updated_at: record.updated_at,
            has_workflow: record.has_workflow(),
            node_count: record.metadata.node_count,
            connection_count: record.metadata.connection_count,
            github_synced: record.metadata.github.synced,
        }
    }
}

/// A document skipped by a lenient listing.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub error: String,
}

/// Result of listing the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Listing {
    pub rows: Vec<ProjectSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDocument>,
}

impl Listing {
    /// Render rows as an aligned text table.
    pub fn to_table(&self) -> String {
        const HEADERS: [&str; 8] =
            ["NAME", "STATUS", "VERSION", "UPDATED", "WORKFLOW", "NODES", "CONNECTIONS", "SYNCED"];

        let cells: Vec<[String; 8]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.name.clone(),
                    row.status.to_string(),
                    row.version.clone(),
                    row.updated_at.format("%Y-%m-%d %H:%M").to_string(),
                    yes_no(row.has_workflow).to_string(),
                    row.node_count.to_string(),
                    row.connection_count.to_string(),
                    yes_no(row.github_synced).to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, &HEADERS.map(String::from), &widths);
        for row in &cells {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

fn push_line(out: &mut String, cells: &[String; 8], widths: &[usize; 8]) {
    let line: Vec<String> =
        cells.iter().zip(widths).map(|(cell, &width)| format!("{cell:<width$}")).collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

const fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
