//! Typed configuration blob stored on each agent.
//!
//! The dashboard edits voice, LLM, tool, variable, evaluation and
//! data-collection settings as one document. It is persisted as a single JSON
//! column but modelled as optional sub-structures with serde defaults, so a
//! partially filled document still loads and unknown tool kinds are rejected.

use std::collections::{BTreeMap, HashSet};

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Complete agent configuration document
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(default)]
pub struct AgentSettings {
    pub voice: VoiceSettings,
    pub llm: LlmSettings,
    pub tools: Vec<ToolDefinition>,
    /// Values substituted into prompts at call time (e.g. `customer_name`)
    pub dynamic_variables: BTreeMap<String, String>,
    pub evaluation_criteria: Vec<EvaluationCriterion>,
    pub data_collection: Vec<DataCollectionField>,
}

/// Text-to-speech voice parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct VoiceSettings {
    /// Provider voice identifier; `None` uses the provider default voice
    pub voice_id: Option<String>,
    pub stability: f32,
    pub similarity_boost: f32,
    pub speed: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            voice_id: None,
            stability: 0.5,
            similarity_boost: 0.75,
            speed: 1.0,
        }
    }
}

/// Language model parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Tool the agent may invoke during a call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    Webhook {
        name: String,
        url: String,
        #[serde(default)]
        method: WebhookMethod,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    EndCall,
    TransferCall {
        phone_number: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum WebhookMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

/// Post-call success criterion evaluated by the provider
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EvaluationCriterion {
    pub id: String,
    pub name: String,
    pub prompt: String,
}

/// Structured value extracted from the call transcript
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DataCollectionField {
    pub identifier: String,
    #[serde(rename = "type")]
    pub kind: DataKind,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    String,
    Number,
    Integer,
    Boolean,
}

impl AgentSettings {
    /// Checks value ranges and identifier uniqueness.
    ///
    /// Returns a map of JSON-pointer-like field paths to messages; an empty map
    /// means the document is valid.
    pub fn validate(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        if !(0.0..=1.0).contains(&self.voice.stability) {
            errors.insert(
                "voice.stability".to_string(),
                "must be between 0.0 and 1.0".to_string(),
            );
        }
        if !(0.0..=1.0).contains(&self.voice.similarity_boost) {
            errors.insert(
                "voice.similarity_boost".to_string(),
                "must be between 0.0 and 1.0".to_string(),
            );
        }
        if !(0.7..=1.2).contains(&self.voice.speed) {
            errors.insert(
                "voice.speed".to_string(),
                "must be between 0.7 and 1.2".to_string(),
            );
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            errors.insert(
                "llm.temperature".to_string(),
                "must be between 0.0 and 2.0".to_string(),
            );
        }
        if self.llm.model.trim().is_empty() {
            errors.insert("llm.model".to_string(), "is required".to_string());
        }

        for (index, tool) in self.tools.iter().enumerate() {
            match tool {
                ToolDefinition::Webhook { name, url, .. } => {
                    if name.trim().is_empty() {
                        errors.insert(format!("tools[{}].name", index), "is required".to_string());
                    }
                    if !(url.starts_with("https://") || url.starts_with("http://")) {
                        errors.insert(
                            format!("tools[{}].url", index),
                            "must be an http(s) URL".to_string(),
                        );
                    }
                }
                ToolDefinition::TransferCall { phone_number } => {
                    if !phone_number.starts_with('+') {
                        errors.insert(
                            format!("tools[{}].phone_number", index),
                            "must be in E.164 format".to_string(),
                        );
                    }
                }
                ToolDefinition::EndCall => {}
            }
        }

        let mut seen = HashSet::new();
        for (index, criterion) in self.evaluation_criteria.iter().enumerate() {
            if !seen.insert(criterion.id.as_str()) {
                errors.insert(
                    format!("evaluation_criteria[{}].id", index),
                    "duplicate id".to_string(),
                );
            }
        }

        let mut seen = HashSet::new();
        for (index, field) in self.data_collection.iter().enumerate() {
            if field.identifier.trim().is_empty() {
                errors.insert(
                    format!("data_collection[{}].identifier", index),
                    "is required".to_string(),
                );
            } else if !seen.insert(field.identifier.as_str()) {
                errors.insert(
                    format!("data_collection[{}].identifier", index),
                    "duplicate identifier".to_string(),
                );
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_uses_defaults() {
        let settings: AgentSettings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings, AgentSettings::default());
        assert_eq!(settings.voice.stability, 0.5);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn partial_sub_structures_fill_missing_keys() {
        let settings: AgentSettings = serde_json::from_value(json!({
            "voice": { "voice_id": "rachel" },
            "llm": { "temperature": 0.2 }
        }))
        .unwrap();

        assert_eq!(settings.voice.voice_id.as_deref(), Some("rachel"));
        assert_eq!(settings.voice.similarity_boost, 0.75);
        assert_eq!(settings.llm.temperature, 0.2);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn tools_are_tagged_by_type() {
        let settings: AgentSettings = serde_json::from_value(json!({
            "tools": [
                { "type": "webhook", "name": "lookup", "url": "https://example.com/hook" },
                { "type": "end_call" },
                { "type": "transfer_call", "phone_number": "+15550100" }
            ]
        }))
        .unwrap();

        assert_eq!(settings.tools.len(), 3);
        assert_eq!(
            settings.tools[0],
            ToolDefinition::Webhook {
                name: "lookup".to_string(),
                url: "https://example.com/hook".to_string(),
                method: WebhookMethod::Post,
                description: None,
            }
        );
        assert_eq!(settings.tools[1], ToolDefinition::EndCall);
    }

    #[test]
    fn unknown_tool_type_is_rejected() {
        let result: Result<AgentSettings, _> = serde_json::from_value(json!({
            "tools": [{ "type": "shell", "command": "rm -rf /" }]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn validate_reports_each_bad_field() {
        let mut settings = AgentSettings::default();
        settings.voice.stability = 1.5;
        settings.llm.temperature = -1.0;
        settings.tools.push(ToolDefinition::Webhook {
            name: "hook".to_string(),
            url: "ftp://example.com".to_string(),
            method: WebhookMethod::Get,
            description: None,
        });
        settings.data_collection = vec![
            DataCollectionField {
                identifier: "email".to_string(),
                kind: DataKind::String,
                description: String::new(),
            },
            DataCollectionField {
                identifier: "email".to_string(),
                kind: DataKind::String,
                description: String::new(),
            },
        ];

        let errors = settings.validate();
        assert!(errors.contains_key("voice.stability"));
        assert!(errors.contains_key("llm.temperature"));
        assert!(errors.contains_key("tools[0].url"));
        assert_eq!(
            errors.get("data_collection[1].identifier").map(String::as_str),
            Some("duplicate identifier")
        );
    }
}
