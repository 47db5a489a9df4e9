//! Hosted template store reached over its PostgREST interface.

use std::time::Duration;

use serde_json::Value;

use super::{Filter, Query, TemplateError, TemplateResult, TemplateStore};
use crate::core::Config;

/// Client for a Supabase project's REST endpoint.
pub struct SupabaseClient {
    /// Project URL, without trailing slash
    base_url: String,

    /// Anonymous API key
    key: String,

    /// HTTP client
    client: reqwest::blocking::Client,
}

impl SupabaseClient {
    /// Create a client for the given project URL and key.
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> TemplateResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("flowdeck/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { base_url: url.into().trim_end_matches('/').to_string(), key: key.into(), client })
    }

    /// Create a client from configuration, `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_config(config: &Config) -> TemplateResult<Self> {
        match (config.templates_url(), config.templates_key()) {
            (Some(url), Some(key)) => Self::new(url, key),
            _ => Err(TemplateError::NotConfigured),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
    }

    /// Map a non-success status to an API error.
    fn check(response: reqwest::blocking::Response) -> TemplateResult<reqwest::blocking::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().unwrap_or_else(|_| "Unknown error".to_string());
        Err(TemplateError::Api { status: status.as_u16(), message })
    }
}

impl TemplateStore for SupabaseClient {
    fn select(&self, table: &str, query: &Query) -> TemplateResult<Vec<Value>> {
        let url = format!("{}?{}", self.table_url(table), query_string(query));
        tracing::debug!(%url, "selecting templates");

        let response = Self::check(self.request(reqwest::Method::GET, &url).send()?)?;
        let body: Value =
            response.json().map_err(|e| TemplateError::InvalidResponse(e.to_string()))?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(TemplateError::InvalidResponse(format!("expected an array, got {other}"))),
        }
    }

    fn insert(&self, table: &str, rows: &[Value]) -> TemplateResult<()> {
        let response = self
            .request(reqwest::Method::POST, &self.table_url(table))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()?;
        Self::check(response)?;
        Ok(())
    }

    fn delete_in(&self, table: &str, column: &str, values: &[String]) -> TemplateResult<()> {
        let url = format!(
            "{}?{}",
            self.table_url(table),
            filter_param(&Filter::In(column.to_string(), values.to_vec()))
        );
        Self::check(self.request(reqwest::Method::DELETE, &url).send()?)?;
        Ok(())
    }
}

/// Build the query string for a select.
fn query_string(query: &Query) -> String {
    let select = if query.columns.is_empty() { "*".to_string() } else { query.columns.join(",") };
    let mut params = vec![format!("select={}", urlencoding::encode(&select))];
    params.extend(query.filters.iter().map(filter_param));
    params.join("&")
}

fn filter_param(filter: &Filter) -> String {
    match filter {
        Filter::Eq(column, value) => {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{column}=eq.{}", urlencoding::encode(&value))
        }
        Filter::Contains(column, values) => {
            format!("{column}=cs.{}", urlencoding::encode(&format!("{{{}}}", values.join(","))))
        }
        Filter::TextSearch(column, terms) => {
            format!("{column}=plfts.{}", urlencoding::encode(terms))
        }
        Filter::In(column, values) => {
            format!("{column}=in.{}", urlencoding::encode(&format!("({})", values.join(","))))
        }
    }
}
