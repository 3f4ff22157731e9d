//! Bio enhancement request and result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Creative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLength {
    Concise,
    #[default]
    Detailed,
    Comprehensive,
}

/// A prior position listed alongside the bio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub company: String,
    pub position: String,
    pub years_experience: u32,
}

/// What the service should know about the person whose bio is rewritten.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BioContext {
    pub title: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    pub tone: Tone,
    pub target_length: TargetLength,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnhanceBioRequest<'a> {
    pub bio: &'a str,
    pub context: &'a BioContext,
}

/// Rewritten bio. Fields the service leaves out stay out when re-serialised.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BioEnhancement {
    pub content: String,
    /// 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
