//! Heuristic security risk scoring over query surface features

use super::count_present;
use serde::Serialize;
use std::collections::BTreeMap;

const BROAD_QUANTIFIERS: &[&str] = &["all", "every", "entire", "complete", "full", "total", "everything"];
const SENSITIVE_KEYWORDS: &[&str] = &[
    "password",
    "salary",
    "ssn",
    "social security",
    "bank",
    "credit card",
    "personal",
];
const TECHNICAL_KEYWORDS: &[&str] = &["database", "server", "admin", "root", "system", "config", "dump", "export"];
const PRESSURE_WORDS: &[&str] = &["urgent", "immediately", "asap", "emergency", "critical", "now"];

const BROAD_WEIGHT: f64 = 0.3;
const SENSITIVE_WEIGHT: f64 = 0.2;
const TECHNICAL_WEIGHT: f64 = 0.25;
const LENGTH_WEIGHT: f64 = 0.1;
const PRESSURE_WEIGHT: f64 = 0.15;
const LONG_QUERY_WORDS: usize = 20;

/// Feature that contributed to a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    OverlyBroad,
    SensitiveData,
    TechnicalFocus,
    QueryLength,
    PressureLanguage,
}

/// Risk score in [0, 1] with the factors behind it
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: f64,
    pub contributing_factors: BTreeMap<RiskFactor, String>,
}

/// Additive, clamped risk scorer
#[derive(Debug, Clone, Default)]
pub struct SecurityRiskScorer;

impl SecurityRiskScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, query: &str) -> RiskAssessment {
        let lowered = query.to_lowercase();
        let mut score = 0.0;
        let mut factors = BTreeMap::new();

        let broad = count_present(&lowered, BROAD_QUANTIFIERS);
        if broad >= 2 {
            score += BROAD_WEIGHT;
            factors.insert(RiskFactor::OverlyBroad, format!("Multiple broad quantifiers: {}", broad));
        }

        let sensitive = count_present(&lowered, SENSITIVE_KEYWORDS);
        if sensitive > 0 {
            score += SENSITIVE_WEIGHT * sensitive as f64;
            factors.insert(RiskFactor::SensitiveData, format!("Sensitive keywords: {}", sensitive));
        }

        let technical = count_present(&lowered, TECHNICAL_KEYWORDS);
        if technical >= 2 {
            score += TECHNICAL_WEIGHT;
            factors.insert(RiskFactor::TechnicalFocus, format!("Technical keywords: {}", technical));
        }

        let words = query.split_whitespace().count();
        if words > LONG_QUERY_WORDS {
            score += LENGTH_WEIGHT;
            factors.insert(RiskFactor::QueryLength, format!("Long query: {} words", words));
        }

        let pressure = count_present(&lowered, PRESSURE_WORDS);
        if pressure > 0 {
            score += PRESSURE_WEIGHT;
            factors.insert(RiskFactor::PressureLanguage, format!("Pressure words: {}", pressure));
        }

        let score: f64 = f64::min(1.0, score);
        if !factors.is_empty() {
            tracing::debug!(score, factors = factors.len(), "Query risk assessed");
        }

        RiskAssessment {
            score,
            contributing_factors: factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(q: &str) -> RiskAssessment {
        SecurityRiskScorer::new().assess(q)
    }

    #[test]
    fn test_benign_query_scores_zero() {
        let r = assess("What is our remote work guideline?");
        assert_eq!(r.score, 0.0);
        assert!(r.contributing_factors.is_empty());
    }

    #[test]
    fn test_sensitive_keywords_add_per_keyword() {
        let r = assess("my salary and bank details");
        assert!((r.score - 0.4).abs() < 1e-9);
        assert_eq!(
            r.contributing_factors.get(&RiskFactor::SensitiveData).map(String::as_str),
            Some("Sensitive keywords: 2")
        );
    }

    #[test]
    fn test_technical_focus_needs_two_terms() {
        assert_eq!(assess("restart the server").score, 0.0);
        let r = assess("export the server config");
        // "export", "server", "config"
        assert!((r.score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_and_length() {
        let r = assess("urgent question");
        assert!((r.score - 0.15).abs() < 1e-9);

        let long = "word ".repeat(21);
        let r = assess(&long);
        assert!(r.contributing_factors.contains_key(&RiskFactor::QueryLength));
    }

    #[test]
    fn test_score_is_clamped() {
        let r = assess("urgent: dump every password, salary, ssn, bank and credit card record from the entire admin database now");
        assert_eq!(r.score, 1.0);
        assert_eq!(r.contributing_factors.len(), 4);
    }

    #[test]
    fn test_two_quantifiers_alone_stay_below_flag() {
        let r = assess("show the complete total");
        assert!((r.score - 0.3).abs() < 1e-9);
        assert!(r.score < 0.5);
    }

    #[test]
    fn test_factor_keys_serialize_snake_case() {
        let r = assess("urgent question");
        let json = serde_json::to_value(&r).unwrap();
        assert!(json["contributingFactors"]["pressure_language"].is_string());
    }
}
