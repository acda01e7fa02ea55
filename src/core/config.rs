//! Session configuration with documented constants
//!
//! Every tunable the session engine uses is collected here. Values can be
//! overridden from a TOML file; missing keys keep their defaults.

use crate::core::error::{FiresError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the model boundary and the context serializer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    // === MODEL CALL ===
    /// Model identifier sent with every completion request
    pub model: String,

    /// Completion endpoint
    ///
    /// URLs containing `anthropic.com` use the Anthropic message format,
    /// anything else is treated as OpenAI-compatible.
    pub api_url: String,

    /// Maximum output tokens requested per call
    pub max_tokens: u32,

    /// Rough USD cost per 1000 tokens, used only for the usage readout
    pub cost_per_1k_tokens: f64,

    // === CONTEXT SERIALIZER ===
    /// Target-list lines rendered before the "...and N more" suffix
    ///
    /// Target lists from real planning spreadsheets run to hundreds of rows;
    /// the prompt only needs enough to let the model reference them.
    pub max_target_lines: usize,

    /// Equipment-density lines rendered before truncation
    pub max_equipment_lines: usize,

    /// Plotted units rendered before truncation
    pub max_map_units: usize,

    /// OPORD task entries rendered before truncation
    pub max_opord_tasks: usize,

    /// OPORD coordination-measure and ammunition-allocation lines, each
    pub max_opord_lines: usize,

    /// Characters of commander's intent kept in the context
    pub max_intent_chars: usize,

    // === SESSION ===
    /// Preset loaded when a session starts
    pub default_preset: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".into(),
            api_url: "https://api.anthropic.com/v1/messages".into(),
            max_tokens: 4096,
            cost_per_1k_tokens: 0.003,

            max_target_lines: 25,
            max_equipment_lines: 40,
            max_map_units: 50,
            max_opord_tasks: 15,
            max_opord_lines: 20,
            max_intent_chars: 1200,

            default_preset: "MAGTF Fires".into(),
        }
    }
}

impl SessionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; keys that are absent keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SessionConfig = toml::from_str(content)
            .map_err(|e| FiresError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate().map_err(FiresError::Config)?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".into());
        }

        if self.max_tokens == 0 {
            return Err("max_tokens must be positive".into());
        }

        if self.cost_per_1k_tokens < 0.0 {
            return Err(format!(
                "cost_per_1k_tokens ({}) must not be negative",
                self.cost_per_1k_tokens
            ));
        }

        // A zero cap would hide every record while still claiming "N more"
        let caps = [
            self.max_target_lines,
            self.max_equipment_lines,
            self.max_map_units,
            self.max_opord_tasks,
            self.max_opord_lines,
            self.max_intent_chars,
        ];
        if caps.contains(&0) {
            return Err("serializer caps must be at least 1".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<SessionConfig> = OnceLock::new();

/// Get the global session config (initializes with defaults if not set)
pub fn config() -> &'static SessionConfig {
    CONFIG.get_or_init(SessionConfig::default)
}

/// Set the global session config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: SessionConfig) -> std::result::Result<(), SessionConfig> {
    CONFIG.set(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            model = "test-model"
            max_target_lines = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "test-model");
        assert_eq!(config.max_target_lines, 10);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.default_preset, "MAGTF Fires");
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(SessionConfig::from_toml_str("model = [").is_err());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let result = SessionConfig::from_toml_str("max_map_units = 0");
        assert!(matches!(result, Err(FiresError::Config(_))));
        let result = SessionConfig::from_toml_str("max_opord_lines = 0");
        assert!(matches!(result, Err(FiresError::Config(_))));
    }
}
