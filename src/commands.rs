//! Command implementations behind the `folioai` binary.
//!
//! Every command returns the pretty-printed JSON it wants written to stdout.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::path::Path;

use crate::batch::{self, BatchOperation};
use crate::config::Settings;
use crate::http::Transport;
use crate::operations::{AiClient, BioContext, ProjectInput, UserProfile};

/// Builds a client from the settings file layered under `overrides`.
pub fn build_client(overrides: Settings, config_path: Option<&Path>) -> Result<AiClient> {
    let settings = Settings::load(config_path)?.merge(overrides);
    let config = settings.into_client_config();
    info!(
        "Using AI service at {} (timeout {}ms, {} attempts)",
        config.base_url(),
        config.timeout_ms(),
        config.max_retries()
    );
    AiClient::new(config).context("Failed to create HTTP client")
}

fn render<S: Serialize>(value: &S) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize result")
}

pub async fn enhance_bio<T: Transport>(
    client: &AiClient<T>,
    bio: &str,
    context: &BioContext,
) -> Result<String> {
    let result = client.enhance_bio(bio, context).await?;
    render(&result)
}

pub async fn optimize_project<T: Transport>(
    client: &AiClient<T>,
    project: &ProjectInput,
) -> Result<String> {
    let result = client.optimize_project(project).await?;
    render(&result)
}

pub async fn recommend_template<T: Transport>(
    client: &AiClient<T>,
    profile: &UserProfile,
) -> Result<String> {
    let result = client.recommend_template(profile).await?;
    render(&result)
}

pub async fn templates<T: Transport>(client: &AiClient<T>) -> Result<String> {
    let catalog = client.list_templates().await?;
    render(&catalog)
}

pub async fn history<T: Transport>(client: &AiClient<T>) -> Result<String> {
    let history = client.get_enhancement_history().await?;
    render(&history)
}

/// Runs the operations listed in a JSON file (an array of tagged operations).
pub async fn batch<T: Transport>(client: &AiClient<T>, path: &Path) -> Result<String> {
    debug!("Reading batch from {:?}...", path);
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {:?}", path))?;
    let items: Vec<BatchOperation> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse batch file {:?}", path))?;
    batch::validate_batch_size(items.len())?;

    let report = batch::run_batch(client, items).await;
    render(&report)
}
