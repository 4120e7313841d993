//! Coarse corporate-vs-personal domain check

use super::{ClassificationResult, ZeroShotClassifier};
use crate::error::{Error, Result};
use std::sync::Arc;

pub const CORPORATE_QUERY: &str = "corporate business query";
pub const PERSONAL_QUERY: &str = "non-corporate personal query";
const TEMPLATE: &str = "This is a {}";

/// Top label of the domain call
#[derive(Debug, Clone, PartialEq)]
pub struct DomainResult {
    pub label: String,
    pub score: f64,
}

impl DomainResult {
    pub fn is_corporate(&self) -> bool {
        self.label == CORPORATE_QUERY
    }
}

/// Outcome of the domain stage
#[derive(Debug, Clone, PartialEq)]
pub enum DomainOutcome {
    /// Confidently personal; the pipeline stops here
    Rejected(ClassificationResult),
    /// Continue to topic classification, carrying the raw domain result
    Continue(DomainResult),
}

/// Wraps the single-label domain call
pub struct DomainClassifier {
    classifier: Arc<dyn ZeroShotClassifier>,
    reject_threshold: f64,
}

impl DomainClassifier {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>, reject_threshold: f64) -> Self {
        Self {
            classifier,
            reject_threshold,
        }
    }

    /// Classify the query's domain
    pub async fn classify_domain(&self, query: &str) -> Result<DomainResult> {
        let ranked = self
            .classifier
            .classify(query, &[CORPORATE_QUERY, PERSONAL_QUERY], Some(TEMPLATE), false)
            .await?;

        let top = ranked
            .into_iter()
            .next()
            .ok_or_else(|| Error::Classifier("Domain classification returned no labels".to_string()))?;

        Ok(DomainResult {
            label: top.label,
            score: top.score,
        })
    }

    /// Run the domain stage and apply the personal-query rejection
    pub async fn evaluate(&self, query: &str) -> Result<DomainOutcome> {
        let domain = self.classify_domain(query).await?;

        if domain.label == PERSONAL_QUERY && domain.score >= self.reject_threshold {
            tracing::info!(score = domain.score, "Rejected query as non-corporate");
            return Ok(DomainOutcome::Rejected(ClassificationResult::rejected(
                "non-corporate query",
                domain.score,
            )));
        }

        Ok(DomainOutcome::Continue(domain))
    }
}
