//! Provider Configuration Types
//!
//! Data types describing which LLM backend an agent talks to. The UI layer
//! works with camelCase fields; the agent backend additionally reads the
//! legacy snake_case aliases (`provider`, `api_key`, `base_url`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};

/// Legacy alias pairs: (camelCase source field, snake_case alias).
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("protocol", "provider"),
    ("apiKey", "api_key"),
    ("baseUrl", "base_url"),
];

/// LLM provider configuration as selected in the UI.
///
/// Unknown fields are captured in `extra` and survive every conversion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Provider identifier (e.g. "openai", "deepseek-local")
    pub id: String,
    /// Wire protocol spoken by the backend (e.g. "openai", "anthropic")
    pub protocol: String,
    /// Credential used to authenticate against the backend
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    /// Any other provider-specific fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProviderConfig {
    /// Create a provider config with the required fields only.
    pub fn new(
        id: impl Into<String>,
        protocol: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            protocol: protocol.into(),
            api_key: api_key.into(),
            base_url: None,
            models: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style base URL setter.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builder-style model list setter.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    /// Check that `id`, `protocol` and `apiKey` are non-blank, in that order.
    pub fn validate(&self) -> CoreResult<()> {
        let required = [
            ("id", &self.id),
            ("protocol", &self.protocol),
            ("apiKey", &self.api_key),
        ];
        match required.into_iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CoreError::MissingField(field)),
            None => Ok(()),
        }
    }

    /// Camel-case JSON object view of this config, including `extra`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        map.insert("protocol".to_string(), Value::String(self.protocol.clone()));
        map.insert("apiKey".to_string(), Value::String(self.api_key.clone()));
        if let Some(base_url) = &self.base_url {
            map.insert("baseUrl".to_string(), Value::String(base_url.clone()));
        }
        if !self.models.is_empty() {
            let models = self.models.iter().cloned().map(Value::String).collect();
            map.insert("models".to_string(), Value::Array(models));
        }
        map
    }

    /// Convert to the configuration shape the agent backend expects.
    pub fn to_backend(&self) -> BackendConfig {
        BackendConfig(convert_provider_config_to_backend(&self.to_map()))
    }
}

/// Add the legacy snake_case aliases to a camelCase provider config object.
///
/// Every input key is preserved. The three aliases are always present in
/// the output; an alias whose source field is missing is `null`.
pub fn convert_provider_config_to_backend(config: &Map<String, Value>) -> Map<String, Value> {
    let mut backend = config.clone();
    for (source, alias) in LEGACY_ALIASES {
        let value = config.get(*source).cloned().unwrap_or(Value::Null);
        backend.insert((*alias).to_string(), value);
    }
    backend
}

/// Provider configuration in backend form (camelCase fields plus aliases).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendConfig(Map<String, Value>);

impl BackendConfig {
    /// Look up a raw field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Legacy `provider` alias.
    pub fn provider(&self) -> Option<&str> {
        self.0.get("provider").and_then(Value::as_str)
    }

    /// Legacy `api_key` alias.
    pub fn api_key(&self) -> Option<&str> {
        self.0.get("api_key").and_then(Value::as_str)
    }

    /// Legacy `base_url` alias.
    pub fn base_url(&self) -> Option<&str> {
        self.0.get("base_url").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for BackendConfig {
    fn from(config: Map<String, Value>) -> Self {
        Self(convert_provider_config_to_backend(&config))
    }
}
