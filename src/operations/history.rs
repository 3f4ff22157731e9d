//! Enhancement history types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One past AI operation as stored by the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Newest-first list of past operations, plus whatever paging fields the
/// service adds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnhancementHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<EnhancementRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnhancementHistory {
    /// The listed records; empty when the service sent none or `null`.
    pub fn records(&self) -> &[EnhancementRecord] {
        self.history.as_deref().unwrap_or_default()
    }
}
