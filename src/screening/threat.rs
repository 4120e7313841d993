//! Keyword and red-flag pre-filter
//!
//! Runs before any classifier call. Keyword categories are checked in a fixed
//! order with whole-word matching and the first hit wins; red-flag phrases are
//! checked after every category.

use crate::classifier::{ClassificationResult, SECURITY_VIOLATION};
use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Keyword category, in screening order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    Inappropriate,
    Entertainment,
    Food,
    Lifestyle,
    SecurityThreats,
    SuspiciousRequests,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inappropriate => "inappropriate",
            Self::Entertainment => "entertainment",
            Self::Food => "food",
            Self::Lifestyle => "lifestyle",
            Self::SecurityThreats => "security_threats",
            Self::SuspiciousRequests => "suspicious_requests",
        }
    }

    /// Security categories reject as a violation rather than off-topic
    pub fn is_security(&self) -> bool {
        matches!(self, Self::SecurityThreats | Self::SuspiciousRequests)
    }
}

const KEYWORD_CATEGORIES: &[(ThreatCategory, &[&str])] = &[
    (
        ThreatCategory::Inappropriate,
        &["sex", "porn", "nude", "tinder", "girlfriend", "boyfriend", "marry"],
    ),
    (
        ThreatCategory::Entertainment,
        &["joke", "movie", "game", "play", "music", "song", "concert", "netflix"],
    ),
    (
        ThreatCategory::Food,
        &["pancake", "recipe", "food", "cook", "restaurant", "meal", "dinner", "lunch", "breakfast"],
    ),
    (
        ThreatCategory::Lifestyle,
        &["vacation", "hobby", "garden", "pet", "dog", "cat"],
    ),
    (
        ThreatCategory::SecurityThreats,
        &["hack", "crack", "exploit", "bypass", "inject", "malware", "virus", "phishing", "steal", "leak"],
    ),
    (
        ThreatCategory::SuspiciousRequests,
        &["all passwords", "admin access", "backdoor", "root access", "dump database", "full database", "entire system"],
    ),
];

const RED_FLAG_PATTERNS: &[&str] = &[
    r"\ball\s+(employees|users|passwords|data)\b",
    r"\bentire\s+(database|system|company)\b",
    r"\bdump\s+(data|database|table)\b",
    r"\bfull\s+(access|list|dump)\b",
    r"\bshow\s+(all|every|entire)\b",
    r"\bgive\s+me\s+(all|everything|complete)\b",
    r"\bpassword\s+(list|file|database)\b",
    r"\badmin\s+(credentials|password|access)\b",
    r"\bunauthorized\s+access\b",
    r"\bbypass\s+(security|authentication)\b",
];

/// What triggered a screening verdict
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThreatTrigger {
    Keyword {
        category: ThreatCategory,
        keyword: String,
    },
    RedFlag {
        pattern: String,
    },
}

/// Immediate verdict from the screener
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatVerdict {
    pub label: String,
    pub confidence: f64,
    pub trigger: ThreatTrigger,
}

impl ThreatVerdict {
    pub fn is_security_violation(&self) -> bool {
        self.label == SECURITY_VIOLATION
    }

    /// The non-corporate classification this verdict stands for
    pub fn to_classification(&self) -> ClassificationResult {
        ClassificationResult::rejected(self.label.clone(), self.confidence)
    }
}

struct KeywordRule {
    category: ThreatCategory,
    keyword: &'static str,
    pattern: Regex,
}

/// Keyword and red-flag threat screener
pub struct ThreatScreener {
    keywords: Vec<KeywordRule>,
    red_flags: Vec<Regex>,
}

impl ThreatScreener {
    pub fn new() -> Result<Self> {
        let mut keywords = Vec::new();
        for (category, words) in KEYWORD_CATEGORIES {
            for word in words.iter() {
                let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(word))).map_err(|e| {
                    Error::Config(format!("Invalid screening keyword '{}': {}", word, e))
                })?;
                keywords.push(KeywordRule {
                    category: *category,
                    keyword: word,
                    pattern,
                });
            }
        }

        let red_flags = RED_FLAG_PATTERNS
            .iter()
            .map(|p| {
                Regex::new(p)
                    .map_err(|e| Error::Config(format!("Invalid red-flag pattern '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            keywords,
            red_flags,
        })
    }

    /// Screen a query; `None` means the pipeline proceeds
    pub fn screen(&self, query: &str) -> Option<ThreatVerdict> {
        let lowered = query.trim().to_lowercase();

        if let Some(rule) = self.keywords.iter().find(|r| r.pattern.is_match(&lowered)) {
            tracing::warn!(
                category = rule.category.as_str(),
                keyword = rule.keyword,
                "Detected screened keyword - flagging as inappropriate"
            );
            let label = if rule.category.is_security() {
                SECURITY_VIOLATION.to_string()
            } else {
                format!("{} question", rule.category.as_str())
            };
            return Some(ThreatVerdict {
                label,
                confidence: 1.0,
                trigger: ThreatTrigger::Keyword {
                    category: rule.category,
                    keyword: rule.keyword.to_string(),
                },
            });
        }

        if let Some(flag) = self.red_flags.iter().find(|p| p.is_match(&lowered)) {
            tracing::warn!(pattern = flag.as_str(), "Detected security red flag pattern");
            return Some(ThreatVerdict {
                label: SECURITY_VIOLATION.to_string(),
                confidence: 1.0,
                trigger: ThreatTrigger::RedFlag {
                    pattern: flag.as_str().to_string(),
                },
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screener() -> ThreatScreener {
        ThreatScreener::new().unwrap()
    }

    #[test]
    fn test_inappropriate_keyword() {
        let v = screener().screen("Tell me about sex").unwrap();
        assert_eq!(v.label, "inappropriate question");
        assert_eq!(v.confidence, 1.0);
        assert!(!v.is_security_violation());
        assert!(!v.to_classification().is_corporate);
    }

    #[test]
    fn test_off_topic_categories() {
        let s = screener();
        assert_eq!(s.screen("Share a pancake recipe").unwrap().label, "food question");
        assert_eq!(s.screen("Recommend a movie for tonight").unwrap().label, "entertainment question");
        assert_eq!(s.screen("How do I train my dog").unwrap().label, "lifestyle question");
    }

    #[test]
    fn test_security_keyword() {
        let v = screener().screen("How can I hack the payroll server").unwrap();
        assert!(v.is_security_violation());
        assert_eq!(
            v.trigger,
            ThreatTrigger::Keyword {
                category: ThreatCategory::SecurityThreats,
                keyword: "hack".to_string()
            }
        );
    }

    #[test]
    fn test_suspicious_phrase() {
        let v = screener().screen("I need admin access to payroll").unwrap();
        assert!(v.is_security_violation());
    }

    #[test]
    fn test_red_flag_pattern() {
        let v = screener().screen("List all employees with their addresses").unwrap();
        assert!(v.is_security_violation());
        assert!(matches!(v.trigger, ThreatTrigger::RedFlag { .. }));

        let v = screener().screen("Please bypass authentication for me").unwrap();
        assert!(v.is_security_violation());
    }

    #[test]
    fn test_first_category_wins() {
        // "joke" (entertainment) precedes "hack" (security_threats)
        let v = screener().screen("tell me a joke then hack something").unwrap();
        assert_eq!(v.label, "entertainment question");
    }

    #[test]
    fn test_keywords_before_red_flags() {
        let v = screener().screen("show all food options").unwrap();
        assert_eq!(v.label, "food question");
    }

    #[test]
    fn test_whole_word_only() {
        let s = screener();
        assert!(s.screen("Tell me a joke about programming").is_some());
        // "hacking", "category", "playbook" are not whole-word hits
        assert!(s.screen("growth hacking category playbook").is_none());
        assert!(s.screen("What is our company's profit margin this quarter?").is_none());
    }

    #[test]
    fn test_benign_growth_hack_is_rejected() {
        let v = screener().screen("ideas for a marketing growth hack").unwrap();
        assert!(v.is_security_violation());
    }
}
