//! Query classification
//!
//! The external zero-shot model is consumed through [`ZeroShotClassifier`].
//! Two adapters sit on top of it:
//!
//! ```text
//! query → DomainClassifier (corporate vs personal, single-label)
//!       → TopicClassifier  (multi-label topics + ordered override rules)
//!       → ClassificationResult
//! ```

pub mod domain;
pub mod http;
pub mod rules;
pub mod topic;

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;

pub use domain::{DomainClassifier, DomainOutcome, DomainResult};
pub use http::HttpZeroShotClassifier;
pub use rules::{OverrideRule, RuleContext, RuleOutcome};
pub use topic::TopicClassifier;

/// One ranked label returned by the classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Zero-shot text classifier contract.
///
/// Given text and an ordered candidate label set, returns every candidate
/// ranked by descending score. In multi-label mode scores are independent and
/// need not sum to one.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[&str],
        hypothesis_template: Option<&str>,
        multi_label: bool,
    ) -> Result<Vec<LabelScore>>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// Final topic classification for a query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_corporate: bool,
    pub label: String,
    pub confidence: f64,
    pub scores: HashMap<String, f64>,
}

impl ClassificationResult {
    /// A rejection carrying a single-entry score map for its own label
    pub fn rejected(label: impl Into<String>, confidence: f64) -> Self {
        let label = label.into();
        let mut scores = HashMap::new();
        scores.insert(label.clone(), confidence);
        Self {
            is_corporate: false,
            label,
            confidence,
            scores,
        }
    }
}

/// Label used for every security-related rejection
pub const SECURITY_VIOLATION: &str = "security violation";
