//! # Flowdeck
//!
//! Workflow project records for your terminal.
//!
//! Flowdeck keeps one JSON record per workflow project under a root directory,
//! alongside a workflow export and a generated README, validates workflow
//! documents, and publishes the whole root to a git remote.
//!
//! ## Layout
//!
//! ```text
//! <root>/projects/<name>.json   project record
//! <root>/projects/<name>.md     README with version history
//! <root>/workflows/<name>.json  workflow export
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! flowdeck create demo workflow.json
//! flowdeck list
//! flowdeck sync demo git@github.com:me/workflows.git
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::format_push_string)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod core;

#[cfg(feature = "git")]
pub mod git;

#[cfg(feature = "git")]
pub use git::{GitPublisher, PublishOptions, PublishOutcome};

pub mod templates;
pub use templates::{MemoryTemplateStore, Query, TemplateError, TemplateStats, TemplateStore};

#[cfg(feature = "templates")]
pub use templates::SupabaseClient;

pub use crate::core::{
    Config, ExportFormat, ListMode, ProjectError, ProjectRecord, ProjectResult, ProjectStore,
    StoreLayout, ValidationReport,
};

/// Application version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const APP_NAME: &str = "flowdeck";
