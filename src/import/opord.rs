//! Free-text operation order import
//!
//! The document text goes to the model with a fixed extraction template and
//! must come back as a JSON object. Bad JSON or missing required fields are
//! typed errors, never panics.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::error::ImportError;
use crate::import::ImportOutcome;
use crate::llm::client::{ChatMessage, ModelBackend};

/// Longest document text sent to the model, in characters
pub const MAX_DOCUMENT_CHARS: usize = 60_000;

const EXTRACTION_SYSTEM: &str =
    "You extract structured data from military operation orders. Respond with JSON only.";

/// Extraction template; the document text is appended after it
pub const OPORD_INSTRUCTIONS: &str = r#"Extract the fires-relevant content of the operation order below.

OUTPUT FORMAT (a single JSON object, no explanation):
{
  "document_info": {
    "title": "string or null",
    "operation_name": "string or null",
    "unit": "string or null",
    "date_time_group": "string or null",
    "classification": "string or null"
  },
  "commanders_intent": {
    "purpose": "string or null",
    "key_tasks": ["string"],
    "end_state": "string or null"
  },
  "tasks": [
    {
      "task": "string (required)",
      "purpose": "string or null",
      "target": "string or null",
      "trigger": "string or null",
      "delivery": "string or null",
      "effects": "string or null"
    }
  ],
  "coordination_measures": [
    {"kind": "FSCL/NFA/RFA/ACA/...", "name": "string or null", "location": "string or null", "description": "string or null"}
  ],
  "ammunition_allocation": [
    {"item": "string", "quantity": "number or string", "unit": "string or null", "notes": "string or null"}
  ]
}

Use null for anything the document does not state. Do not invent tasks."#;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub operation_name: Option<String>,
    pub unit: Option<String>,
    pub date_time_group: Option<String>,
    pub classification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandersIntent {
    Text(String),
    Structured {
        #[serde(default)]
        purpose: Option<String>,
        #[serde(default, deserialize_with = "null_as_empty")]
        key_tasks: Vec<String>,
        #[serde(default)]
        end_state: Option<String>,
    },
}

impl fmt::Display for CommandersIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Structured {
                purpose,
                key_tasks,
                end_state,
            } => {
                let mut parts = Vec::new();
                if let Some(p) = purpose {
                    parts.push(format!("Purpose: {}", p));
                }
                if !key_tasks.is_empty() {
                    parts.push(format!("Key tasks: {}", key_tasks.join("; ")));
                }
                if let Some(e) = end_state {
                    parts.push(format!("End state: {}", e));
                }
                f.write_str(&parts.join(" | "))
            }
        }
    }
}

/// Essential fire support task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireTask {
    pub task: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub trigger: Option<String>,
    #[serde(default)]
    pub delivery: Option<String>,
    #[serde(default)]
    pub effects: Option<String>,
}

impl FireTask {
    pub fn summary_line(&self) -> String {
        let mut line = self.task.clone();
        let extras = [
            ("purpose", &self.purpose),
            ("target", &self.target),
            ("trigger", &self.trigger),
            ("delivery", &self.delivery),
            ("effects", &self.effects),
        ];
        for (label, value) in extras {
            if let Some(v) = value {
                line.push_str(&format!("; {}: {}", label, v));
            }
        }
        line
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinationMeasure {
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Count(u64),
    Amount(f64),
    Text(String),
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Amount(x) => write!(f, "{}", x),
            Self::Text(t) => f.write_str(t),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmmoAllocation {
    #[serde(default, alias = "ammunition", alias = "type")]
    pub item: Option<String>,
    #[serde(default)]
    pub quantity: Option<Quantity>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpordDocument {
    pub document_info: DocumentInfo,
    #[serde(default)]
    pub commanders_intent: Option<CommandersIntent>,
    pub tasks: Vec<FireTask>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub coordination_measures: Vec<CoordinationMeasure>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ammunition_allocation: Vec<AmmoAllocation>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Extract the JSON object from a model response (handles surrounding text)
pub fn extract_json(response: &str) -> Result<&str, ImportError> {
    let start = response
        .find('{')
        .ok_or_else(|| ImportError::InvalidJson("no JSON object in response".into()))?;
    let end = response
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| ImportError::InvalidJson("no closing brace in response".into()))?;
    Ok(&response[start..=end])
}

/// Validate and decode a model response into an operation order
pub fn parse_opord_response(response: &str) -> Result<OpordDocument, ImportError> {
    let json = extract_json(response)?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| ImportError::InvalidJson(e.to_string()))?;

    if !value.get("document_info").map(Value::is_object).unwrap_or(false) {
        return Err(ImportError::MissingField("document_info".into()));
    }
    let Some(tasks) = value.get("tasks").and_then(Value::as_array) else {
        return Err(ImportError::MissingField("tasks".into()));
    };
    for (i, task) in tasks.iter().enumerate() {
        let named = task
            .get("task")
            .and_then(Value::as_str)
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        if !named {
            return Err(ImportError::MissingField(format!("tasks[{}].task", i)));
        }
    }

    serde_json::from_value(value).map_err(|e| ImportError::InvalidJson(e.to_string()))
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Send document text through the model and decode the result
pub async fn import_opord<M: ModelBackend>(
    model: &M,
    text: &str,
) -> ImportOutcome<Option<OpordDocument>> {
    if text.trim().is_empty() {
        return ImportOutcome::failed(None, ImportError::EmptyContent);
    }

    let document = truncate_chars(text.trim(), MAX_DOCUMENT_CHARS);
    let prompt = format!("{}\n\nDOCUMENT:\n{}", OPORD_INSTRUCTIONS, document);
    let completion = match model
        .complete(EXTRACTION_SYSTEM, &[ChatMessage::user(prompt)])
        .await
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("operation order extraction call failed: {}", e);
            return ImportOutcome::failed(None, e.into());
        }
    };

    match parse_opord_response(&completion.text) {
        Ok(doc) => {
            tracing::info!("imported operation order with {} task(s)", doc.tasks.len());
            ImportOutcome::ok(Some(doc))
        }
        Err(e) => {
            tracing::warn!("operation order response rejected: {}", e);
            ImportOutcome::failed(None, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"Here is the extraction:
{
  "document_info": {"title": "OPORD 24-03", "unit": "11th Marines"},
  "commanders_intent": {"purpose": "Neutralize IADS", "key_tasks": ["SEAD"], "end_state": null},
  "tasks": [
    {"task": "Suppress SA-20 battery", "purpose": "Enable CAS", "trigger": "H-10", "delivery": "GMLRS"},
    {"task": "Screen north flank", "effects": "Obscure"}
  ],
  "coordination_measures": null,
  "ammunition_allocation": [{"item": "GMLRS", "quantity": 48}, {"item": "155mm HE", "quantity": "2 UBL"}]
}
Let me know if you need more."#;

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let json = extract_json(RESPONSE).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(matches!(
            extract_json("I cannot parse that document"),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_parse_full_response() {
        let doc = parse_opord_response(RESPONSE).unwrap();
        assert_eq!(doc.document_info.title.as_deref(), Some("OPORD 24-03"));
        assert_eq!(doc.tasks.len(), 2);
        assert_eq!(doc.tasks[0].delivery.as_deref(), Some("GMLRS"));
        assert!(doc.coordination_measures.is_empty());
        assert_eq!(doc.ammunition_allocation[0].quantity, Some(Quantity::Count(48)));
        assert_eq!(
            doc.ammunition_allocation[1].quantity.as_ref().map(|q| q.to_string()),
            Some("2 UBL".to_string())
        );
        assert_eq!(
            doc.commanders_intent.unwrap().to_string(),
            "Purpose: Neutralize IADS | Key tasks: SEAD"
        );
    }

    #[test]
    fn test_intent_as_plain_text() {
        let doc = parse_opord_response(
            r#"{"document_info": {}, "commanders_intent": "Destroy enemy fires", "tasks": []}"#,
        )
        .unwrap();
        assert_eq!(
            doc.commanders_intent,
            Some(CommandersIntent::Text("Destroy enemy fires".into()))
        );
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            parse_opord_response(r#"{"tasks": []}"#),
            Err(ImportError::MissingField("document_info".into()))
        );
        assert_eq!(
            parse_opord_response(r#"{"document_info": {}}"#),
            Err(ImportError::MissingField("tasks".into()))
        );
        assert_eq!(
            parse_opord_response(r#"{"document_info": {}, "tasks": [{"task": "A"}, {"purpose": "x"}]}"#),
            Err(ImportError::MissingField("tasks[1].task".into()))
        );
    }

    #[test]
    fn test_malformed_json_is_typed_error() {
        assert!(matches!(
            parse_opord_response(r#"{"document_info": {, "tasks": []}"#),
            Err(ImportError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_task_summary_line() {
        let doc = parse_opord_response(RESPONSE).unwrap();
        assert_eq!(
            doc.tasks[1].summary_line(),
            "Screen north flank; effects: Obscure"
        );
    }

    #[test]
    fn test_truncate_chars_on_boundary() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
