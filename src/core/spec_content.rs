//! The document under review.
//!
//! `SpecContent` is an open bag: the well-known fields are typed, anything
//! else lands in `extra` and is still searched by detectors.

use crate::core::markdown;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpecContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objectives: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptance_criteria: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraint_references: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_markdown: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

impl SpecContent {
    pub fn with_raw_markdown(text: impl Into<String>) -> Self {
        Self {
            raw_markdown: Some(text.into()),
            ..Self::default()
        }
    }

    /// Build a spec from a markdown document: title from the first `#`
    /// heading, overview and list fields from sections of the same name.
    pub fn from_markdown(text: &str) -> Self {
        let doc = markdown::scan(text);
        let list = |names: &[&str]| -> Vec<Value> {
            names
                .iter()
                .find_map(|n| doc.section(n))
                .map(|block| {
                    markdown::bullet_items(&block)
                        .into_iter()
                        .map(Value::String)
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            title: doc.first_title().map(str::to_string).filter(|t| !t.is_empty()),
            overview: doc
                .section("Overview")
                .or_else(|| doc.section("Summary"))
                .filter(|s| !s.trim().is_empty()),
            objectives: list(&["Objectives", "Goals"]),
            requirements: list(&["Requirements"]),
            acceptance_criteria: list(&["Acceptance Criteria"]),
            constraint_references: list(&["Constraint References", "Constraints"]),
            raw_markdown: Some(text.to_string()),
            extra: Map::new(),
        }
    }

    /// Text that detectors scan: `rawMarkdown` when present, otherwise every
    /// string value in the spec, known fields first.
    pub fn searchable_text(&self) -> String {
        if let Some(raw) = non_blank(&self.raw_markdown) {
            return raw.to_string();
        }

        let mut parts = Vec::new();
        parts.extend(self.title.iter().cloned());
        parts.extend(self.overview.iter().cloned());
        for list in [
            &self.objectives,
            &self.requirements,
            &self.acceptance_criteria,
            &self.constraint_references,
        ] {
            list.iter().for_each(|v| collect_strings(v, &mut parts));
        }
        self.extra.values().for_each(|v| collect_strings(v, &mut parts));
        parts.join("\n")
    }

    pub fn effective_title(&self) -> Option<String> {
        if let Some(t) = non_blank(&self.title) {
            return Some(t.to_string());
        }
        let raw = non_blank(&self.raw_markdown)?;
        markdown::scan(raw)
            .first_title()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    pub fn effective_overview(&self) -> Option<String> {
        if let Some(o) = non_blank(&self.overview) {
            return Some(o.to_string());
        }
        let raw = non_blank(&self.raw_markdown)?;
        let doc = markdown::scan(raw);
        doc.section("Overview")
            .or_else(|| doc.section("Summary"))
            .filter(|s| !s.trim().is_empty())
    }

    /// Number of distinct goals the spec claims: objectives, requirements and
    /// an open-ended `responsibilities` list if one was supplied.
    pub fn responsibility_count(&self) -> usize {
        let extra = match self.extra.get("responsibilities") {
            Some(Value::Array(items)) => items.len(),
            _ => 0,
        };
        let from_fields = self.objectives.len() + self.requirements.len() + extra;
        if from_fields > 0 {
            return from_fields;
        }
        self.raw_markdown
            .as_deref()
            .map(|raw| {
                let doc = markdown::scan(raw);
                ["Objectives", "Goals", "Requirements", "Responsibilities"]
                    .iter()
                    .filter_map(|n| doc.section(n))
                    .map(|block| markdown::bullet_items(&block).len())
                    .sum()
            })
            .unwrap_or(0)
    }
}
