//! Multi-label topic classification and override cascade

use super::domain::DomainResult;
use super::rules::{self, OverrideRule, RuleContext};
use super::{ClassificationResult, ZeroShotClassifier, SECURITY_VIOLATION};
use crate::error::{Error, Result};
use crate::screening::count_present;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

const TEMPLATE: &str = "This query is about {}";

/// Corporate topics, in tie-break order
pub const CORPORATE_LABELS: &[&str] = &[
    "employee data request",
    "hr question",
    "corporate policy",
    "business operations",
    "performance metrics",
    "company data",
    "technical work request",
    "development inquiry",
    "engineering question",
    "project management",
    "system administration",
    "software development",
    "technical documentation",
    "code repository access",
    "development standards",
    SECURITY_VIOLATION,
    "data breach attempt",
    "unauthorized access request",
    "sensitive information query",
    "confidential data access",
    "financial data request",
    "salary information query",
    "personal employee information",
    "system administration query",
    "database access request",
];

pub const NON_CORPORATE_LABELS: &[&str] = &[
    "personal question",
    "entertainment topic",
    "food and recipes",
    "general knowledge",
    "lifestyle question",
    "inappropriate content",
    "spam content",
    "malicious query",
    "social engineering attempt",
];

const CORPORATE_KEYWORDS: &[&str] = &[
    "employee", "staff", "personnel", "department", "hr", "company", "corporate", "business",
    "organization", "management", "team", "performance", "review", "salary", "policy", "finance",
    "budget", "training", "certification", "project", "office", "workplace", "development",
    "coding", "programming", "software", "application", "backend", "frontend", "database", "api",
    "system", "technology", "engineering", "code", "technical", "infrastructure", "platform",
    "architecture", "implementation", "deployment", "maintenance", "fullstack", "javascript",
    "typescript", "react", "angular", "vue", "node", "python", "java", "docker", "kubernetes",
    "aws", "cloud", "microservices", "repository", "git", "github", "devops", "testing",
    "debugging",
];

const DEV_KEYWORDS: &[&str] = &[
    "code", "development", "backend", "frontend", "programming", "software", "technical",
    "engineering", "dashboard", "api", "system",
];

const LEGITIMATE_PATTERNS: &[&str] = &[
    r"\bmy\s+(salary|performance|training)\b",
    r"\bour\s+(team|department|project)\b",
    r"\bcompany\s+(policy|guidelines|procedures)\b",
    r"\bhow\s+to\s+(submit|request|apply)\b",
    r"\bwhat\s+is\s+(the|our)\s+(policy|procedure)\b",
    r"\bcode\s+for\s+(the|our)?\s*(backend|frontend|development|project)\b",
    r"\b(backend|frontend|development)\s+(code|work|project|team)\b",
    r"\b(technical|development|engineering)\s+(documentation|guidelines|standards)\b",
    r"\bwork\s+on\s+(the|our)?\s*(project|system|application)\b",
    r"\b(programming|coding|development)\s+(standards|practices|guidelines)\b",
];

const DISPLAY_PATTERN: &str =
    r"\b(show|display|view)\s+(frontend|backend|code|engineering|development|technical|dashboard|system)\b";

/// Over-broad quantifiers, matched as substrings
pub const QUANTIFIERS: &[&str] = &["all", "every", "entire", "complete", "full", "total"];

/// Thresholds the cascade reads
#[derive(Debug, Clone, Copy)]
pub struct TopicThresholds {
    pub confidence: f64,
    pub domain_benefit: f64,
}

impl Default for TopicThresholds {
    fn default() -> Self {
        Self {
            confidence: 0.45,
            domain_benefit: 0.80,
        }
    }
}

/// Second-stage classifier: topic scores plus the override cascade
pub struct TopicClassifier {
    classifier: Arc<dyn ZeroShotClassifier>,
    thresholds: TopicThresholds,
    rules: Vec<OverrideRule>,
    legitimate: Vec<Regex>,
    display: Regex,
}

impl TopicClassifier {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>, thresholds: TopicThresholds) -> Result<Self> {
        let legitimate = LEGITIMATE_PATTERNS
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| Error::Config(format!("Invalid topic pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        let display = Regex::new(DISPLAY_PATTERN)
            .map_err(|e| Error::Config(format!("Invalid display pattern: {}", e)))?;

        Ok(Self {
            classifier,
            thresholds,
            rules: rules::standard_rules(),
            legitimate,
            display,
        })
    }

    /// Names of the override rules, in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Classify the query's topic, given the domain stage's result
    pub async fn classify(&self, query: &str, domain: &DomainResult) -> Result<ClassificationResult> {
        let labels: Vec<&str> = CORPORATE_LABELS
            .iter()
            .chain(NON_CORPORATE_LABELS.iter())
            .copied()
            .collect();

        let ranked = self
            .classifier
            .classify(query, &labels, Some(TEMPLATE), true)
            .await?;
        let top = ranked
            .first()
            .ok_or_else(|| Error::Classifier("Topic classification returned no labels".to_string()))?;

        let scores: HashMap<String, f64> = ranked
            .iter()
            .map(|ls| (ls.label.clone(), ls.score))
            .collect();
        let score_of = |label: &str| scores.get(label).copied().unwrap_or(0.0);

        let best_corporate = CORPORATE_LABELS
            .iter()
            .map(|l| score_of(l))
            .fold(0.0_f64, f64::max);
        let best_non_corporate = NON_CORPORATE_LABELS
            .iter()
            .map(|l| score_of(l))
            .fold(0.0_f64, f64::max);
        let best_corporate_label = CORPORATE_LABELS
            .iter()
            .copied()
            .find(|l| score_of(l) == best_corporate)
            .unwrap_or(CORPORATE_LABELS[0]);

        let text = query.trim().to_lowercase();
        let quantifier_count = count_present(&text, QUANTIFIERS);
        let broad_department_request =
            text.contains("all departments") || text.contains("every department");
        if quantifier_count >= 2 {
            tracing::warn!(count = quantifier_count, "Multiple suspicious quantifiers detected");
        }
        if broad_department_request {
            tracing::warn!("Overly broad department request detected");
        }

        let ctx = RuleContext {
            top_label: &top.label,
            top_score: top.score,
            top_is_corporate: CORPORATE_LABELS.contains(&top.label.as_str()),
            best_corporate_label,
            best_corporate,
            best_non_corporate,
            quantifier_count,
            broad_department_request,
            has_corporate_keywords: count_present(&text, CORPORATE_KEYWORDS) > 0,
            has_legitimate_pattern: self.legitimate.iter().any(|p| p.is_match(&text)),
            has_dev_keywords: count_present(&text, DEV_KEYWORDS) > 0,
            is_display_request: self.display.is_match(&text),
            domain_is_corporate: domain.is_corporate(),
            domain_score: domain.score,
            confidence_threshold: self.thresholds.confidence,
            domain_benefit_threshold: self.thresholds.domain_benefit,
        };

        let outcome = rules::run_cascade(&self.rules, &ctx);
        if outcome.settled {
            return Ok(ClassificationResult::rejected(outcome.label, outcome.confidence));
        }

        tracing::info!(
            classifier = self.classifier.name(),
            corporate = outcome.is_corporate,
            label = %outcome.label,
            confidence = outcome.confidence,
            "Classification result"
        );
        tracing::debug!(?scores, "All topic scores");

        Ok(ClassificationResult {
            is_corporate: outcome.is_corporate,
            label: outcome.label,
            confidence: outcome.confidence,
            scores,
        })
    }
}
