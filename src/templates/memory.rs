//! In-memory template store.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Map, Value};

use super::{
    sample_analyses, sample_templates, Filter, Query, TemplateResult, TemplateStore,
    ANALYSES_TABLE, TEMPLATES_TABLE,
};

/// Template store held in memory. Filters are evaluated locally with the same
/// semantics the hosted store applies.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    tables: RefCell<HashMap<String, Vec<Value>>>,
}

impl MemoryTemplateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the sample templates and analyses.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.borrow_mut();
            tables.insert(TEMPLATES_TABLE.to_string(), sample_templates());
            tables.insert(ANALYSES_TABLE.to_string(), sample_analyses());
        }
        store
    }

    /// Number of rows in a table.
    pub fn len(&self, table: &str) -> usize {
        self.tables.borrow().get(table).map_or(0, Vec::len)
    }

    /// Whether a table has no rows.
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn select(&self, table: &str, query: &Query) -> TemplateResult<Vec<Value>> {
        let tables = self.tables.borrow();
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or_default();
        Ok(rows
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .map(|row| project(row, &query.columns))
            .collect())
    }

    fn insert(&self, table: &str, rows: &[Value]) -> TemplateResult<()> {
        self.tables.borrow_mut().entry(table.to_string()).or_default().extend_from_slice(rows);
        Ok(())
    }

    fn delete_in(&self, table: &str, column: &str, values: &[String]) -> TemplateResult<()> {
        if let Some(rows) = self.tables.borrow_mut().get_mut(table) {
            rows.retain(|row| !is_one_of(row.get(column), values));
        }
        Ok(())
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(column, value) => row.get(column) == Some(value),
        Filter::Contains(column, values) => {
            let Some(items) = row.get(column).and_then(Value::as_array) else {
                return false;
            };
            values.iter().all(|v| items.iter().any(|item| item.as_str() == Some(v.as_str())))
        }
        Filter::TextSearch(column, terms) => {
            let Some(text) = row.get(column).and_then(Value::as_str) else {
                return false;
            };
            let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
            terms.split_whitespace().all(|term| words.contains(&term.to_lowercase()))
        }
        Filter::In(column, values) => is_one_of(row.get(column), values),
    }
}

fn is_one_of(value: Option<&Value>, values: &[String]) -> bool {
    match value {
        Some(Value::String(s)) => values.contains(s),
        Some(Value::Number(n)) => values.contains(&n.to_string()),
        _ => false,
    }
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let projected: Map<String, Value> = columns
        .iter()
        .filter_map(|column| row.get(column).map(|v| (column.clone(), v.clone())))
        .collect();
    Value::Object(projected)
}
