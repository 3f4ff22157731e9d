//! Typed operations offered by the AI backend.
//!
//! [`AiClient`] is constructed explicitly from a [`ClientConfig`] and handed to
//! whoever needs it. Each method builds a request body, runs it through the
//! [`RequestExecutor`] and returns the envelope's `data` as the operation's
//! result type.

mod bio;
mod history;
mod project;
mod template;

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorCode};
use crate::http::{Method, RequestExecutor, ReqwestTransport, Transport};

pub use bio::{BioContext, BioEnhancement, Experience, TargetLength, Tone};
pub use history::{EnhancementHistory, EnhancementRecord};
pub use project::{ProjectInput, ProjectOptimization, StarNarrative};
pub use template::{
    ExperienceLevel, TemplateAlternative, TemplateCatalog, TemplateDescriptor,
    TemplateRecommendation, UserProfile,
};

use bio::EnhanceBioRequest;
use template::RecommendTemplateRequest;

pub const ENHANCE_BIO_ENDPOINT: &str = "/api/ai/enhance-bio";
pub const OPTIMIZE_PROJECT_ENDPOINT: &str = "/api/ai/optimize-project";
pub const RECOMMEND_TEMPLATE_ENDPOINT: &str = "/api/ai/recommend-template";
pub const TEMPLATES_ENDPOINT: &str = "/api/ai/templates";
pub const HISTORY_ENDPOINT: &str = "/api/ai/history";

/// Client for the portfolio AI service.
pub struct AiClient<T = ReqwestTransport> {
    executor: RequestExecutor<T>,
}

impl AiClient<ReqwestTransport> {
    /// Creates a client talking HTTP to `config.base_url()`.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let transport = ReqwestTransport::from_config(&config)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> AiClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            executor: RequestExecutor::new(transport, config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.executor.config()
    }

    /// Rewrites a bio in the requested tone and length.
    #[tracing::instrument(skip(self, bio, context))]
    pub async fn enhance_bio(
        &self,
        bio: &str,
        context: &BioContext,
    ) -> Result<BioEnhancement, ClientError> {
        let payload = to_payload(&EnhanceBioRequest { bio, context })?;
        self.executor
            .execute(Method::Post, ENHANCE_BIO_ENDPOINT, Some(payload))
            .await
    }

    /// Rewrites a project description and extracts highlights and a STAR narrative.
    #[tracing::instrument(skip(self, project), fields(title = %project.title))]
    pub async fn optimize_project(
        &self,
        project: &ProjectInput,
    ) -> Result<ProjectOptimization, ClientError> {
        let payload = to_payload(project)?;
        self.executor
            .execute(Method::Post, OPTIMIZE_PROJECT_ENDPOINT, Some(payload))
            .await
    }

    #[tracing::instrument(skip(self, profile))]
    pub async fn recommend_template(
        &self,
        profile: &UserProfile,
    ) -> Result<TemplateRecommendation, ClientError> {
        let payload = to_payload(&RecommendTemplateRequest { profile })?;
        self.executor
            .execute(Method::Post, RECOMMEND_TEMPLATE_ENDPOINT, Some(payload))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_templates(&self) -> Result<TemplateCatalog, ClientError> {
        self.executor
            .execute(Method::Get, TEMPLATES_ENDPOINT, None)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_enhancement_history(&self) -> Result<EnhancementHistory, ClientError> {
        self.executor.execute(Method::Get, HISTORY_ENDPOINT, None).await
    }
}

fn to_payload<S: Serialize>(body: &S) -> Result<Value, ClientError> {
    serde_json::to_value(body).map_err(|e| {
        ClientError::new(
            ErrorCode::Operation,
            format!("Failed to encode request: {}", e),
        )
    })
}
