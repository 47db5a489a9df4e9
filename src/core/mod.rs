//! Core types and functionality for Flowdeck.
//!
//! This module contains the project record model, the file-backed store,
//! workflow validation, listing and configuration.

mod config;
pub mod docs;
mod error;
mod listing;
mod record;
mod store;
pub mod validator;

pub use config::{Config, StoreLayout, AUTHOR_ENV, ROOT_ENV};
pub use error::{ProjectError, ProjectResult};
pub use listing::{ListMode, Listing, ProjectSummary, SkippedDocument};
pub use record::{
    bump_version, generate_project_id, GithubInfo, ProjectMetadata, ProjectRecord, ProjectStatus,
    INITIAL_VERSION,
};
pub use store::{validate_name, CreateOptions, ExportFormat, ProjectStore, StoreOptions};
pub use validator::{load_workflow_file, validate, ValidationReport};
