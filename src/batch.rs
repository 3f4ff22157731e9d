//! Batch execution with per-item failure isolation.
//!
//! Items run concurrently; results come back in submission order and a failing
//! item only marks its own slot as failed.

use futures_util::future::join_all;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::error::ClientError;
use crate::http::Transport;
use crate::operations::{
    AiClient, BioContext, BioEnhancement, ProjectInput, ProjectOptimization,
    TemplateRecommendation, UserProfile,
};

/// Largest batch the command-line front end accepts.
pub const MAX_BATCH_SIZE: usize = 10;

/// One unit of work in a heterogeneous batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BatchOperation {
    EnhanceBio { bio: String, context: BioContext },
    OptimizeProject(ProjectInput),
    RecommendTemplate(UserProfile),
}

/// Result payload of a [`BatchOperation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchOutput {
    Bio(BioEnhancement),
    Project(ProjectOptimization),
    Template(TemplateRecommendation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItemResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> From<Result<T, ClientError>> for BatchItemResult<T> {
    fn from(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: None,
                error: Some(e.message().to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport<T> {
    pub results: Vec<BatchItemResult<T>>,
    pub summary: BatchSummary,
}

impl<T> BatchReport<T> {
    fn from_results(results: Vec<BatchItemResult<T>>) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        let summary = BatchSummary {
            total: results.len(),
            successful,
            failed: results.len() - successful,
        };
        Self { results, summary }
    }
}

/// Rejects batches larger than [`MAX_BATCH_SIZE`].
pub fn validate_batch_size(len: usize) -> anyhow::Result<()> {
    if len == 0 {
        anyhow::bail!("Batch must contain at least one item");
    }
    if len > MAX_BATCH_SIZE {
        anyhow::bail!(
            "Batch contains {} items; at most {} are allowed",
            len,
            MAX_BATCH_SIZE
        );
    }
    Ok(())
}

/// Runs `run` for every item concurrently and collects one result per item.
async fn run_all<I, T, F, Fut>(items: I, run: F) -> BatchReport<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let outcomes = join_all(items.into_iter().map(run)).await;
    let results: Vec<BatchItemResult<T>> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| {
            if let Err(e) = &outcome {
                warn!("Batch item {} failed: {} ({})", index, e, e.code());
            }
            BatchItemResult::from(outcome)
        })
        .collect();

    let report = BatchReport::from_results(results);
    info!(
        "Batch finished: {}/{} succeeded",
        report.summary.successful, report.summary.total
    );
    report
}

/// Runs a mixed list of operations.
#[tracing::instrument(skip(client, items), fields(count = items.len()))]
pub async fn run_batch<T: Transport>(
    client: &AiClient<T>,
    items: Vec<BatchOperation>,
) -> BatchReport<BatchOutput> {
    run_all(items, |item| async move {
        match item {
            BatchOperation::EnhanceBio { bio, context } => client
                .enhance_bio(&bio, &context)
                .await
                .map(BatchOutput::Bio),
            BatchOperation::OptimizeProject(project) => client
                .optimize_project(&project)
                .await
                .map(BatchOutput::Project),
            BatchOperation::RecommendTemplate(profile) => client
                .recommend_template(&profile)
                .await
                .map(BatchOutput::Template),
        }
    })
    .await
}

#[tracing::instrument(skip(client, projects), fields(count = projects.len()))]
pub async fn optimize_projects_batch<T: Transport>(
    client: &AiClient<T>,
    projects: &[ProjectInput],
) -> BatchReport<ProjectOptimization> {
    run_all(projects, |project| client.optimize_project(project)).await
}

#[tracing::instrument(skip(client, bios), fields(count = bios.len()))]
pub async fn enhance_bios_batch<T: Transport>(
    client: &AiClient<T>,
    bios: &[(String, BioContext)],
) -> BatchReport<BioEnhancement> {
    run_all(bios, |(bio, context)| client.enhance_bio(bio, context)).await
}
