//! Template discovery data store.
//!
//! Workflow templates and analyzed workflows live in a hosted PostgREST data
//! store. The store is reached through [`TemplateStore`], a small filtered-CRUD
//! interface; ranking and indexing stay on the server.

mod memory;
mod samples;
mod stats;
#[cfg(feature = "templates")]
mod supabase;

use serde_json::Value;

pub use memory::MemoryTemplateStore;
pub use samples::{sample_analyses, sample_templates, ANALYSES_TABLE, TEMPLATES_TABLE};
pub use stats::TemplateStats;
#[cfg(feature = "templates")]
pub use supabase::SupabaseClient;

/// Result type for template store operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Error type for template store operations.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// HTTP request failed
    #[cfg(feature = "templates")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Data store returned an error
    #[error("Data store error: {message} (status: {status})")]
    Api { status: u16, message: String },

    /// URL or key missing
    #[error("Template store not configured: set SUPABASE_URL and SUPABASE_ANON_KEY")]
    NotConfigured,

    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A single row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column equals value
    Eq(String, Value),
    /// Array column contains every listed value
    Contains(String, Vec<String>),
    /// Full-text match: every term must occur in the column
    TextSearch(String, String),
    /// Column value is one of the listed values
    In(String, Vec<String>),
}

/// A select query: a projection plus filters applied in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Columns to return (all when empty)
    pub columns: Vec<String>,
    /// Filters, all of which must match
    pub filters: Vec<Filter>,
}

impl Query {
    /// Select all columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns.
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Add an equality filter.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column.into(), value.into()));
        self
    }

    /// Add an array-containment filter.
    #[must_use]
    pub fn contains(mut self, column: impl Into<String>, values: &[&str]) -> Self {
        self.filters
            .push(Filter::Contains(column.into(), values.iter().map(|v| (*v).to_string()).collect()));
        self
    }

    /// Add a membership filter.
    #[must_use]
    pub fn one_of(mut self, column: impl Into<String>, values: &[&str]) -> Self {
        self.filters.push(Filter::In(column.into(), values.iter().map(|v| (*v).to_string()).collect()));
        self
    }

    /// Add a full-text filter.
    #[must_use]
    pub fn text_search(mut self, column: impl Into<String>, terms: impl Into<String>) -> Self {
        self.filters.push(Filter::TextSearch(column.into(), terms.into()));
        self
    }
}

/// Filtered CRUD over named tables.
pub trait TemplateStore {
    /// Select rows matching a query.
    fn select(&self, table: &str, query: &Query) -> TemplateResult<Vec<Value>>;

    /// Insert rows.
    fn insert(&self, table: &str, rows: &[Value]) -> TemplateResult<()>;

    /// Delete rows whose `column` is one of `values`.
    fn delete_in(&self, table: &str, column: &str, values: &[String]) -> TemplateResult<()>;
}

/// Discovery criteria. Every criterion that is set must match.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Search analyzed workflows instead of curated templates
    pub analyses: bool,
    /// Complexity level (`simple`, `intermediate`, `advanced`)
    pub complexity: Option<String>,
    /// Target audience the row must list
    pub audience: Option<String>,
    /// Feature the row must list (`analyzed_features` or `tags`)
    pub feature: Option<String>,
    /// Full-text terms, all of which must match
    pub search: Option<String>,
}

impl Discovery {
    /// Table the criteria apply to.
    pub fn table(&self) -> &'static str {
        if self.analyses {
            ANALYSES_TABLE
        } else {
            TEMPLATES_TABLE
        }
    }

    /// Build the select query.
    pub fn query(&self) -> Query {
        let (complexity, feature, text, link) = if self.analyses {
            ("complexity_analysis", "analyzed_features", "description", "url")
        } else {
            ("complexity", "tags", "search_keywords", "template_url")
        };

        let mut query = Query::new().columns(&["name", "description", complexity, link]);
        if let Some(level) = &self.complexity {
            query = query.eq(complexity, level.as_str());
        }
        if let Some(audience) = &self.audience {
            query = query.contains("target_audience", &[audience.as_str()]);
        }
        if let Some(value) = &self.feature {
            query = query.contains(feature, &[value.as_str()]);
        }
        if let Some(terms) = &self.search {
            query = query.text_search(text, terms.as_str());
        }
        query
    }
}

/// Run a discovery query.
pub fn discover(store: &dyn TemplateStore, discovery: &Discovery) -> TemplateResult<Vec<Value>> {
    let rows = store.select(discovery.table(), &discovery.query())?;
    tracing::debug!(table = discovery.table(), rows = rows.len(), "discovered templates");
    Ok(rows)
}

/// Seed both tables with the sample rows.
pub fn populate(store: &dyn TemplateStore) -> TemplateResult<usize> {
    let templates = sample_templates();
    let analyses = sample_analyses();
    store.insert(TEMPLATES_TABLE, &templates)?;
    store.insert(ANALYSES_TABLE, &analyses)?;
    tracing::info!(templates = templates.len(), analyses = analyses.len(), "populated template store");
    Ok(templates.len() + analyses.len())
}

/// Remove the sample rows from both tables.
pub fn clear_samples(store: &dyn TemplateStore) -> TemplateResult<()> {
    let template_ids = string_column(&sample_templates(), "template_id");
    let analysis_names = string_column(&sample_analyses(), "name");
    store.delete_in(TEMPLATES_TABLE, "template_id", &template_ids)?;
    store.delete_in(ANALYSES_TABLE, "name", &analysis_names)?;
    Ok(())
}

/// Gather statistics across both tables.
pub fn collect_stats(store: &dyn TemplateStore) -> TemplateResult<TemplateStats> {
    let templates = store.select(
        TEMPLATES_TABLE,
        &Query::new().columns(&["complexity", "target_audience", "required_services"]),
    )?;
    let analyses = store.select(
        ANALYSES_TABLE,
        &Query::new().columns(&["complexity_analysis", "target_audience", "required_services"]),
    )?;
    Ok(TemplateStats::from_rows(templates.iter().chain(&analyses)))
}

fn string_column(rows: &[Value], column: &str) -> Vec<String> {
    rows.iter().filter_map(|row| row.get(column).and_then(Value::as_str)).map(String::from).collect()
}
