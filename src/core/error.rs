//! Project store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for project store operations.
pub type ProjectResult<T> = Result<T, ProjectError>;

/// Errors that can occur while managing project records.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Referenced project or workflow is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with this name already exists and overwrite was not requested.
    #[error("Project '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(String),

    /// Shape-check failures. Carries every violation found.
    #[error("{message}: {}", errors.join("; "))]
    Validation { message: String, errors: Vec<String> },

    /// Export format not recognized.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A git or remote-call action failed.
    #[error("External action failed: {0}")]
    ExternalActionFailed(String),

    /// Version string is not `major.minor.patch`.
    #[error("Invalid version '{0}': expected major.minor.patch")]
    InvalidVersion(String),

    /// A stored document could not be parsed.
    #[error("Malformed project document {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProjectError {
    /// Create a validation error from a list of violations.
    pub fn validation(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation { message: message.into(), errors }
    }

    /// Create an external action error.
    pub fn external(msg: impl std::fmt::Display) -> Self {
        Self::ExternalActionFailed(msg.to_string())
    }

    /// Whether this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_all_errors() {
        let err = ProjectError::validation(
            "Invalid workflow",
            vec!["Node 0 missing ID".to_string(), "Node 1 missing name".to_string()],
        );
        assert_eq!(err.to_string(), "Invalid workflow: Node 0 missing ID; Node 1 missing name");
    }

    #[test]
    fn test_is_not_found() {
        assert!(ProjectError::NotFound("demo".to_string()).is_not_found());
        assert!(!ProjectError::UnsupportedFormat("xml".to_string()).is_not_found());
    }
}
