//! Distribution statistics over template rows.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Counts per complexity, audience and required service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    pub complexity: BTreeMap<String, usize>,
    pub audience: BTreeMap<String, usize>,
    pub services: BTreeMap<String, usize>,
}

impl TemplateStats {
    /// Tally rows from either table.
    ///
    /// Complexity is read from `complexity`, falling back to `complexity_analysis`.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut stats = Self::default();
        for row in rows {
            let complexity = row
                .get("complexity")
                .and_then(Value::as_str)
                .or_else(|| row.get("complexity_analysis").and_then(Value::as_str));
            if let Some(complexity) = complexity {
                *stats.complexity.entry(complexity.to_string()).or_default() += 1;
            }
            tally(&mut stats.audience, row.get("target_audience"));
            tally(&mut stats.services, row.get("required_services"));
        }
        stats
    }

    /// Render as indented text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (title, counts) in [
            ("Complexity", &self.complexity),
            ("Target audience", &self.audience),
            ("Required services", &self.services),
        ] {
            out.push_str(title);
            out.push_str(":\n");
            for (key, count) in counts {
                out.push_str(&format!("  {key}: {count}\n"));
            }
        }
        out
    }
}

fn tally(counts: &mut BTreeMap<String, usize>, values: Option<&Value>) {
    for value in values.and_then(Value::as_array).into_iter().flatten().filter_map(Value::as_str) {
        *counts.entry(value.to_string()).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stats_from_mixed_rows() {
        let rows = [
            json!({"complexity": "simple", "target_audience": ["marketers"], "required_services": ["slack"]}),
            json!({"complexity_analysis": "simple", "target_audience": ["marketers", "developers"]}),
            json!({"required_services": "not-an-array"}),
        ];

        let stats = TemplateStats::from_rows(&rows);
        assert_eq!(stats.complexity.get("simple"), Some(&2));
        assert_eq!(stats.audience.get("marketers"), Some(&2));
        assert_eq!(stats.audience.get("developers"), Some(&1));
        assert_eq!(stats.services.len(), 1);
    }

    #[test]
    fn test_to_text() {
        let rows = [json!({"complexity": "advanced", "required_services": ["openai"]})];
        let text = TemplateStats::from_rows(&rows).to_text();
        assert!(text.contains("Complexity:\n  advanced: 1\n"));
        assert!(text.contains("Required services:\n  openai: 1\n"));
    }
}
