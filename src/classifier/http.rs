//! Zero-shot classifier backed by a hosted inference endpoint

use super::{LabelScore, ZeroShotClassifier};
use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Response body of a zero-shot inference call
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// HTTP client for a Hugging Face style zero-shot endpoint
pub struct HttpZeroShotClassifier {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl HttpZeroShotClassifier {
    pub fn new(
        endpoint: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build classifier client: {}", e)))?;

        Ok(Self {
            client,
            url: format!("{}/models/{}", endpoint.trim_end_matches('/'), model),
            model: model.to_string(),
            api_key,
        })
    }

    /// Build from configuration, reading the token from the configured env var
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty());
        if api_key.is_none() {
            tracing::warn!(model = %config.model, "No classifier API key configured");
        }
        Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Validate a raw response against the requested labels and rank it
fn rank_response(response: InferenceResponse, candidate_labels: &[&str]) -> Result<Vec<LabelScore>> {
    if response.labels.len() != response.scores.len() {
        return Err(Error::Classifier(format!(
            "Mismatched response: {} labels, {} scores",
            response.labels.len(),
            response.scores.len()
        )));
    }
    if response.labels.len() != candidate_labels.len() {
        return Err(Error::Classifier(format!(
            "Expected {} labels, got {}",
            candidate_labels.len(),
            response.labels.len()
        )));
    }

    let mut ranked = Vec::with_capacity(response.labels.len());
    for (label, score) in response.labels.into_iter().zip(response.scores) {
        if !candidate_labels.contains(&label.as_str()) {
            return Err(Error::Classifier(format!("Unknown label in response: {}", label)));
        }
        if !score.is_finite() {
            return Err(Error::Classifier(format!("Non-finite score for label {}", label)));
        }
        if !(0.0..=1.0).contains(&score) {
            return Err(Error::Classifier(format!(
                "Score {} for label {} is outside [0, 1]",
                score, label
            )));
        }
        ranked.push(LabelScore::new(label, score));
    }
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

#[async_trait]
impl ZeroShotClassifier for HttpZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: Option<&str>,
        multi_label: bool,
    ) -> Result<Vec<LabelScore>> {
        let mut parameters = serde_json::json!({
            "candidate_labels": candidate_labels,
            "multi_label": multi_label,
        });
        if let Some(template) = hypothesis_template {
            parameters["hypothesis_template"] = serde_json::Value::from(template);
        }
        let payload = serde_json::json!({
            "inputs": text,
            "parameters": parameters,
        });

        tracing::debug!(model = %self.model, labels = candidate_labels.len(), multi_label, "Calling classifier");

        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Classifier(format!(
                "Classifier returned {}: {}",
                status, body
            )));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| Error::Classifier(format!("Malformed classifier response: {}", e)))?;

        rank_response(body, candidate_labels)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
