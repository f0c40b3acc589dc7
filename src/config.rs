use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NodeError;

fn default_property() -> String {
    "payload".to_string()
}

fn default_query_field() -> String {
    "jsonata".to_string()
}

fn default_result_field() -> String {
    "jsonataResult".to_string()
}

/// Per-instance node configuration, captured once at construction.
///
/// Wire names match the host's editor fields; absent or empty values fall
/// back to the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonataNodeConfig {
    /// Input field holding the JSON text.
    #[serde(default = "default_property")]
    pub property: String,
    /// Input field that may carry a per-message query string.
    #[serde(rename = "jsonata", default = "default_query_field")]
    pub query_field: String,
    /// Statically configured query, used when the message carries none.
    #[serde(rename = "jsonatauser", alias = "jsonataOpts", default)]
    pub user_query: Option<String>,
    /// Output field receiving the evaluation result.
    #[serde(rename = "jsonataResult", default = "default_result_field")]
    pub result_field: String,
}

impl Default for JsonataNodeConfig {
    fn default() -> Self {
        JsonataNodeConfig {
            property: default_property(),
            query_field: default_query_field(),
            user_query: None,
            result_field: default_result_field(),
        }
    }
}

impl JsonataNodeConfig {
    /// Deserialize from a raw config block, then normalize: empty strings
    /// behave exactly like absent fields.
    pub fn from_value(config: &Value) -> Result<Self, NodeError> {
        let parsed: JsonataNodeConfig = serde_json::from_value(config.clone())
            .map_err(|e| NodeError::Config(format!("Invalid jsonata node config: {}", e)))?;
        Ok(parsed.normalized())
    }

    pub fn normalized(mut self) -> Self {
        if self.property.is_empty() {
            self.property = default_property();
        }
        if self.query_field.is_empty() {
            self.query_field = default_query_field();
        }
        if self.result_field.is_empty() {
            self.result_field = default_result_field();
        }
        if matches!(self.user_query.as_deref(), Some("")) {
            self.user_query = None;
        }
        self
    }
}
