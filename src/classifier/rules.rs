//! Ordered override rules for topic classification
//!
//! The multi-label scores are only a starting point. Each rule below is a
//! pure function over the query features and the draft verdict so far, and
//! the rules run in a fixed order:
//!
//! | # | Rule                         | Effect                                      |
//! |---|------------------------------|---------------------------------------------|
//! | 1 | `keyword_security_check`     | reject over-broad requests                  |
//! | 2 | `corporate_keyword_match`    | accept keyword + legitimate phrasing        |
//! | 3 | `corporate_margin`           | accept clear corporate margin               |
//! | 4 | `corporate_threshold`        | accept top corporate label over threshold   |
//! | 5 | `domain_benefit_of_doubt`    | accept strongly corporate domain            |
//! | 6 | `technical_work_override`    | accept dev vocabulary                       |
//! | 7 | `display_request_override`   | accept "show backend"-style requests        |
//!
//! Rules 2–4 are alternatives: once one of them claims the query (its guard
//! holds), the others are skipped even if it did not accept.

use super::SECURITY_VIOLATION;

const BROAD_DEPARTMENT_PENALTY: f64 = 0.4;
const QUANTIFIER_PENALTY: f64 = 0.3;
const SECURITY_REJECT: f64 = 0.5;
const KEYWORD_GUARD: f64 = 0.35;
const KEYWORD_ACCEPT: f64 = 0.45;
const LEGITIMATE_BOOST: f64 = 0.15;
const MARGIN: f64 = 0.15;
const TECHNICAL_GUARD: f64 = 0.20;
const TECHNICAL_FLOOR: f64 = 0.65;
const DISPLAY_CONFIDENCE: f64 = 0.70;

/// Features of one query, computed once before the cascade
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub top_label: &'a str,
    pub top_score: f64,
    pub top_is_corporate: bool,
    pub best_corporate_label: &'a str,
    pub best_corporate: f64,
    pub best_non_corporate: f64,
    pub quantifier_count: usize,
    pub broad_department_request: bool,
    pub has_corporate_keywords: bool,
    pub has_legitimate_pattern: bool,
    pub has_dev_keywords: bool,
    pub is_display_request: bool,
    pub domain_is_corporate: bool,
    pub domain_score: f64,
    pub confidence_threshold: f64,
    pub domain_benefit_threshold: f64,
}

/// Verdict under construction
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub is_corporate: bool,
    pub label: String,
    pub confidence: f64,
    /// A rule rejected the query outright; nothing later runs
    pub settled: bool,
    /// One of the alternative acceptance rules (2–4) claimed the query
    pub claimed: bool,
}

impl RuleOutcome {
    /// Starting verdict: the top-ranked label, not corporate
    pub fn initial(ctx: &RuleContext<'_>) -> Self {
        Self {
            is_corporate: false,
            label: ctx.top_label.to_string(),
            confidence: ctx.top_score,
            settled: false,
            claimed: false,
        }
    }

    fn accept(mut self, label: &str, confidence: f64) -> Self {
        self.is_corporate = true;
        self.label = label.to_string();
        self.confidence = confidence;
        self
    }
}

/// A named step in the cascade
#[derive(Clone, Copy)]
pub struct OverrideRule {
    pub name: &'static str,
    apply: fn(&RuleContext<'_>, RuleOutcome) -> RuleOutcome,
}

impl OverrideRule {
    pub fn apply(&self, ctx: &RuleContext<'_>, outcome: RuleOutcome) -> RuleOutcome {
        (self.apply)(ctx, outcome)
    }
}

impl std::fmt::Debug for OverrideRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRule").field("name", &self.name).finish()
    }
}

/// The standard cascade, in evaluation order
pub fn standard_rules() -> Vec<OverrideRule> {
    vec![
        OverrideRule { name: "keyword_security_check", apply: keyword_security_check },
        OverrideRule { name: "corporate_keyword_match", apply: corporate_keyword_match },
        OverrideRule { name: "corporate_margin", apply: corporate_margin },
        OverrideRule { name: "corporate_threshold", apply: corporate_threshold },
        OverrideRule { name: "domain_benefit_of_doubt", apply: domain_benefit_of_doubt },
        OverrideRule { name: "technical_work_override", apply: technical_work_override },
        OverrideRule { name: "display_request_override", apply: display_request_override },
    ]
}

/// Run rules in order until one settles the verdict
pub fn run_cascade(rules: &[OverrideRule], ctx: &RuleContext<'_>) -> RuleOutcome {
    let mut outcome = RuleOutcome::initial(ctx);
    for rule in rules {
        if outcome.settled {
            break;
        }
        let was_corporate = outcome.is_corporate;
        outcome = rule.apply(ctx, outcome);
        if outcome.settled || outcome.is_corporate != was_corporate {
            tracing::info!(
                rule = rule.name,
                corporate = outcome.is_corporate,
                label = %outcome.label,
                confidence = outcome.confidence,
                "Override rule fired"
            );
        }
    }
    outcome
}

fn keyword_security_check(ctx: &RuleContext<'_>, mut outcome: RuleOutcome) -> RuleOutcome {
    let mut score = 0.0;
    if ctx.quantifier_count >= 2 {
        score += QUANTIFIER_PENALTY;
    }
    if ctx.broad_department_request {
        score += BROAD_DEPARTMENT_PENALTY;
    }
    if score >= SECURITY_REJECT {
        outcome.is_corporate = false;
        outcome.label = SECURITY_VIOLATION.to_string();
        outcome.confidence = score;
        outcome.settled = true;
    }
    outcome
}

fn corporate_keyword_match(ctx: &RuleContext<'_>, mut outcome: RuleOutcome) -> RuleOutcome {
    if !(ctx.has_corporate_keywords && ctx.best_corporate >= KEYWORD_GUARD) {
        return outcome;
    }
    outcome.claimed = true;
    if ctx.has_legitimate_pattern {
        let boosted = (ctx.best_corporate + LEGITIMATE_BOOST).min(1.0);
        outcome.accept(ctx.best_corporate_label, boosted)
    } else if ctx.best_corporate >= KEYWORD_ACCEPT {
        outcome.accept(ctx.best_corporate_label, ctx.best_corporate)
    } else {
        tracing::info!("Corporate keywords detected but no legitimate patterns - requiring higher confidence");
        outcome
    }
}

fn corporate_margin(ctx: &RuleContext<'_>, mut outcome: RuleOutcome) -> RuleOutcome {
    if outcome.claimed || ctx.best_corporate <= ctx.best_non_corporate + MARGIN {
        return outcome;
    }
    outcome.claimed = true;
    outcome.accept(ctx.best_corporate_label, ctx.best_corporate)
}

fn corporate_threshold(ctx: &RuleContext<'_>, mut outcome: RuleOutcome) -> RuleOutcome {
    if outcome.claimed || !ctx.top_is_corporate || ctx.top_score < ctx.confidence_threshold {
        return outcome;
    }
    outcome.claimed = true;
    outcome.accept(ctx.top_label, ctx.top_score)
}

fn domain_benefit_of_doubt(ctx: &RuleContext<'_>, outcome: RuleOutcome) -> RuleOutcome {
    if outcome.is_corporate
        || !ctx.domain_is_corporate
        || ctx.domain_score < ctx.domain_benefit_threshold
    {
        return outcome;
    }
    outcome.accept("business operations", ctx.domain_score)
}

fn technical_work_override(ctx: &RuleContext<'_>, outcome: RuleOutcome) -> RuleOutcome {
    if outcome.is_corporate
        || !ctx.has_corporate_keywords
        || !ctx.has_dev_keywords
        || ctx.best_corporate < TECHNICAL_GUARD
    {
        return outcome;
    }
    outcome.accept("technical work request", ctx.best_corporate.max(TECHNICAL_FLOOR))
}

fn display_request_override(ctx: &RuleContext<'_>, outcome: RuleOutcome) -> RuleOutcome {
    if outcome.is_corporate || !ctx.is_display_request {
        return outcome;
    }
    outcome.accept("engineering question", DISPLAY_CONFIDENCE)
}
