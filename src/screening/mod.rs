//! Query screening
//!
//! Two classifier-independent checks run on the raw query text:
//!
//! - [`ThreatScreener`]: keyword categories and red-flag phrases that reject
//!   a query before any model call.
//! - [`SecurityRiskScorer`]: a heuristic 0-1 risk value that can override an
//!   otherwise accepted classification.

pub mod risk;
pub mod threat;

pub use risk::{RiskAssessment, RiskFactor, SecurityRiskScorer};
pub use threat::{ThreatCategory, ThreatScreener, ThreatTrigger, ThreatVerdict};

/// Count how many of `terms` occur anywhere in `text`, as substrings
pub fn count_present(text: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| text.contains(*t)).count()
}
