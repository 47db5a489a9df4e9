//! Shallow structural validation of workflow documents.
//!
//! Only the shape is checked: a `nodes` array whose entries carry `id`, `name`,
//! `type` and `position`, and a `connections` object. Connections that point at
//! node ids which do not exist are not detected.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::error::{ProjectError, ProjectResult};

/// Outcome of validating a workflow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True when no violations were found
    pub valid: bool,
    /// Every violation, in discovery order
    pub errors: Vec<String>,
    /// Number of entries in `nodes`
    pub node_count: usize,
    /// Number of keys in `connections`
    pub connection_count: usize,
}

/// Count the nodes of a workflow document (0 if `nodes` is not an array).
pub fn node_count(workflow: &Value) -> usize {
    workflow.get("nodes").and_then(Value::as_array).map_or(0, Vec::len)
}

/// Count the connection sources of a workflow document (0 if not an object).
pub fn connection_count(workflow: &Value) -> usize {
    workflow.get("connections").and_then(Value::as_object).map_or(0, serde_json::Map::len)
}

/// Validate a workflow document. All violations are collected.
pub fn validate(workflow: Option<&Value>) -> ValidationReport {
    let workflow = match workflow {
        Some(w) if !w.is_null() => w,
        _ => {
            return ValidationReport {
                valid: false,
                errors: vec!["Workflow data is null or undefined".to_string()],
                node_count: 0,
                connection_count: 0,
            };
        }
    };

    let mut errors = Vec::new();

    let nodes = workflow.get("nodes").and_then(Value::as_array);
    if nodes.is_none() {
        errors.push("Missing or invalid nodes array".to_string());
    }

    if workflow.get("connections").and_then(Value::as_object).is_none() {
        errors.push("Missing or invalid connections object".to_string());
    }

    for (index, node) in nodes.into_iter().flatten().enumerate() {
        if !has_value(node, "id") {
            errors.push(format!("Node {index} missing ID"));
        }
        if !has_value(node, "name") {
            errors.push(format!("Node {index} missing name"));
        }
        if !has_value(node, "type") {
            errors.push(format!("Node {index} missing type"));
        }
        if !node.get("position").is_some_and(Value::is_array) {
            errors.push(format!("Node {index} missing or invalid position"));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        node_count: node_count(workflow),
        connection_count: connection_count(workflow),
    }
}

/// A field counts as present unless it is absent, null, false, zero or empty.
fn has_value(node: &Value, field: &str) -> bool {
    match node.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

/// Load a workflow document from a JSON file.
///
/// Rejects documents without a `nodes` array or a `connections` object. Node-level
/// problems are left to [`validate`].
pub fn load_workflow_file(path: impl AsRef<Path>) -> ProjectResult<Value> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProjectError::NotFound(format!("workflow file {}", path.display()))
        } else {
            ProjectError::Io(e)
        }
    })?;
    let workflow: Value = serde_json::from_str(&content)?;

    let report = validate(Some(&workflow));
    let shape_errors: Vec<String> =
        report.errors.into_iter().filter(|e| e.starts_with("Missing or invalid")).collect();
    if !shape_errors.is_empty() {
        return Err(ProjectError::validation(
            format!("Invalid workflow in {}", path.display()),
            shape_errors,
        ));
    }

    tracing::debug!(
        path = %path.display(),
        nodes = report.node_count,
        connections = report.connection_count,
        "loaded workflow"
    );
    Ok(workflow)
}
