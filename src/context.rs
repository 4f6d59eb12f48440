//! Context entries: freeform notes, emails and messages fed to the suggestion
//! service, plus the history search over them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::SourceType;

/// A context record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub id: u64,
    #[serde(default)]
    pub source_type: SourceType,
    /// Plain text in practice, but older records may hold structured JSON.
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub processed_insights: Option<Value>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContextEntry {
    /// Content as text: strings verbatim, anything else as compact JSON.
    pub fn content_text(&self) -> String {
        stringify(&self.content)
    }

    /// Insights worth showing: present, not null, not an empty object or string.
    pub fn insights(&self) -> Option<&Value> {
        self.processed_insights.as_ref().filter(|v| match v {
            Value::Null => false,
            Value::Object(m) => !m.is_empty(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }

    pub fn insights_text(&self) -> Option<String> {
        self.insights().map(stringify)
    }

    /// Case-insensitive containment test on the stringified content.
    pub fn matches(&self, query: &str) -> bool {
        self.content_text()
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

fn stringify(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Body of `POST /api/context/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContextEntry {
    pub source_type: SourceType,
    pub content: String,
}

/// Filter already-fetched entries by a search query. An empty query keeps
/// everything.
pub fn search_entries<'a>(entries: &'a [ContextEntry], query: &str) -> Vec<&'a ContextEntry> {
    entries.iter().filter(|e| e.matches(query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(id: u64, content: Value) -> ContextEntry {
        ContextEntry {
            id,
            source_type: SourceType::Note,
            content,
            processed_insights: None,
            created_at: None,
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let entries = vec![
            entry(1, json!("Dentist appointment on Friday")),
            entry(2, json!("Call mum")),
        ];
        let hits = search_entries(&entries, "FRIDAY");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_search_empty_query_keeps_all() {
        let entries = vec![entry(1, json!("a")), entry(2, json!(null))];
        assert_eq!(search_entries(&entries, "").len(), 2);
    }

    #[test]
    fn test_search_structured_content() {
        let entries = vec![entry(1, json!({"subject": "Invoice", "from": "billing@example.com"}))];
        assert_eq!(search_entries(&entries, "invoice").len(), 1);
        assert_eq!(search_entries(&entries, "subject").len(), 1);
        assert!(search_entries(&entries, "receipt").is_empty());
    }

    #[test]
    fn test_insights_skip_empty_values() {
        let mut e = entry(1, json!("x"));
        e.processed_insights = Some(json!({}));
        assert!(e.insights().is_none());
        e.processed_insights = Some(json!({"urgency": "high"}));
        assert_eq!(e.insights_text().as_deref(), Some(r#"{"urgency":"high"}"#));
    }

    #[test]
    fn test_decodes_backend_record() {
        let e: ContextEntry = serde_json::from_value(json!({
            "id": 9,
            "source_type": "whatsapp",
            "content": "meet at 6",
            "attachment": null,
            "processed_insights": {},
            "created_at": "2025-03-01T18:00:00Z"
        }))
        .unwrap();
        assert_eq!(e.source_type, SourceType::Whatsapp);
        assert_eq!(e.content_text(), "meet at 6");
    }
}
