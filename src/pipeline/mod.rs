//! Query decision pipeline
//!
//! ```text
//! requester lookup ─► threat screen ─► domain ─► topic + overrides
//!                                                    │
//!                 decision ◄─ authorize ◄─ extract ◄─ risk gate / rescue
//! ```
//!
//! Every stage after the lookup may settle the decision early. A record is
//! always produced: collaborator failures become `error` records.

pub mod handler;
pub mod record;

pub use handler::{gatekeeper_router, GatekeeperState};
pub use record::{DecisionRecord, DecisionStatus};

use crate::authz::AuthorizationEngine;
use crate::classifier::topic::TopicThresholds;
use crate::classifier::{
    ClassificationResult, DomainClassifier, DomainOutcome, TopicClassifier, ZeroShotClassifier,
    SECURITY_VIOLATION,
};
use crate::config::{QueryGateConfig, ThresholdConfig};
use crate::department::{Department, DepartmentExtractor, DepartmentScope, SynonymTable};
use crate::directory::{RequesterDirectory, RequesterId};
use crate::error::Result;
use crate::screening::{count_present, RiskAssessment, SecurityRiskScorer, ThreatScreener, ThreatVerdict};
use std::sync::Arc;

/// Terms that let an Engineering requester's technical query through
const ENGINEERING_TERMS: &[&str] = &[
    "frontend",
    "backend",
    "code",
    "development",
    "programming",
    "engineering",
    "technical",
    "software",
    "application",
    "system",
    "dashboard",
    "api",
    "database",
    "architecture",
    "deployment",
];

const RESCUE_LABEL: &str = "engineering question";
const RESCUE_CONFIDENCE: f64 = 0.8;

/// Runs one query through screening, classification, extraction and
/// authorization
pub struct Gatekeeper {
    screener: ThreatScreener,
    domain: DomainClassifier,
    topic: TopicClassifier,
    risk: SecurityRiskScorer,
    extractor: DepartmentExtractor,
    authz: AuthorizationEngine,
    directory: Arc<dyn RequesterDirectory>,
    thresholds: ThresholdConfig,
    rescue_engineering: bool,
}

impl Gatekeeper {
    pub fn new(
        classifier: Arc<dyn ZeroShotClassifier>,
        directory: Arc<dyn RequesterDirectory>,
        config: &QueryGateConfig,
    ) -> Result<Self> {
        let thresholds = config.thresholds;
        thresholds.validate()?;

        tracing::info!(
            classifier = classifier.name(),
            requesters = directory.len(),
            "Initializing gatekeeper"
        );

        Ok(Self {
            screener: ThreatScreener::new()?,
            domain: DomainClassifier::new(classifier.clone(), thresholds.domain_reject),
            topic: TopicClassifier::new(
                classifier,
                TopicThresholds {
                    confidence: thresholds.confidence_threshold,
                    domain_benefit: thresholds.domain_benefit,
                },
            )?,
            risk: SecurityRiskScorer::new(),
            extractor: DepartmentExtractor::new(SynonymTable::standard())?,
            authz: AuthorizationEngine::new(
                config.policy.special_role_table(),
                config.policy.cross_department_matrix(),
            ),
            directory,
            thresholds,
            rescue_engineering: config.rescue_engineering,
        })
    }

    /// Keyword and red-flag screen only
    pub fn screen(&self, query: &str) -> Option<ThreatVerdict> {
        self.screener.screen(query)
    }

    /// Heuristic query risk only
    pub fn assess_risk(&self, query: &str) -> RiskAssessment {
        self.risk.assess(query)
    }

    /// Department scope the query targets
    pub fn extract_department(&self, query: &str) -> Option<DepartmentScope> {
        self.extractor.extract(query)
    }

    /// Screen, then classify domain and topic
    pub async fn classify(&self, query: &str) -> Result<ClassificationResult> {
        if let Some(verdict) = self.screener.screen(query) {
            return Ok(verdict.to_classification());
        }

        match self.domain.evaluate(query).await? {
            DomainOutcome::Rejected(result) => Ok(result),
            DomainOutcome::Continue(domain) => self.topic.classify(query, &domain).await,
        }
    }

    /// Decide a query; failures become `error` records
    pub async fn decide(&self, requester_id: impl Into<RequesterId>, query: &str) -> DecisionRecord {
        let requester_id = requester_id.into();
        match self.try_decide(requester_id.clone(), query).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(requester = %requester_id, error = %e, "Error processing query");
                DecisionRecord::error(query, requester_id, e.to_string())
            }
        }
    }

    /// Decide a query, surfacing classifier and directory failures
    pub async fn try_decide(&self, requester_id: RequesterId, query: &str) -> Result<DecisionRecord> {
        let Some(requester) = self.directory.lookup(&requester_id)? else {
            tracing::warn!(requester = %requester_id, "Requester not found");
            let message = format!("User with ID {} not found", requester_id);
            return Ok(DecisionRecord::error(query, requester_id, message));
        };

        let mut record = DecisionRecord::new(query, requester_id);
        record.user_dept = Some(requester.department);
        record.user_name = requester.name.clone();

        let classification = self.classify(query).await?;
        record.is_appropriate = classification.is_corporate;
        record.label = Some(classification.label.clone());
        record.confidence = Some(classification.confidence);

        let risk = self.risk.assess(query);
        record.risk_score = risk.score;
        record.risk_factors = risk.contributing_factors.clone();

        if risk.score >= self.thresholds.risk_reject {
            tracing::warn!(score = risk.score, factors = ?risk.contributing_factors, "High security risk detected");
            record.status = DecisionStatus::Rejected;
            record.message = format!("Query rejected due to high security risk (score: {:.2})", risk.score);
            record.is_appropriate = false;
            record.label = Some(SECURITY_VIOLATION.to_string());
            record.is_authorized = Some(false);
            record.auth_reason = Some(format!("High security risk: {}", describe_factors(&risk)));
            return Ok(record);
        }

        if risk.score >= self.thresholds.risk_flag {
            tracing::info!(score = risk.score, factors = ?risk.contributing_factors, "Medium security risk detected");
            record.flagged_for_review = true;
        }

        if !classification.is_corporate {
            if self.should_rescue(requester.department, &classification, query) {
                tracing::info!(requester = %record.user_id, "Allowing engineering query for Engineering requester");
                record.is_appropriate = true;
                record.label = Some(RESCUE_LABEL.to_string());
                record.confidence = Some(RESCUE_CONFIDENCE);
            } else {
                record.status = DecisionStatus::Rejected;
                record.message = "Query is not related to corporate matters".to_string();
                return Ok(record);
            }
        }

        let requested = self.extractor.extract(query);
        let Some(scope) = requested else {
            record.status = DecisionStatus::Approved;
            record.message = "Corporate query with no specific department requested".to_string();
            return Ok(record);
        };
        record.requested_dept = scope.to_string();

        let decision = self.authz.authorize(Some(&requester), Some(scope));
        record.is_authorized = Some(decision.authorized);
        record.status = if decision.authorized {
            DecisionStatus::Approved
        } else {
            DecisionStatus::Unauthorized
        };
        let subject = match scope {
            DepartmentScope::AllDepartments => "Employee data query",
            DepartmentScope::Department(_) => "Query",
        };
        let verb = if decision.authorized { "approved" } else { "unauthorized" };
        record.message = format!("{} {}: {}", subject, verb, decision.reason);
        record.auth_reason = Some(decision.reason);

        tracing::info!(
            requester = %record.user_id,
            scope = %scope,
            status = %record.status,
            "Decision made"
        );
        Ok(record)
    }

    fn should_rescue(&self, home: Department, classification: &ClassificationResult, query: &str) -> bool {
        self.rescue_engineering
            && home == Department::Engineering
            && classification.label != SECURITY_VIOLATION
            && count_present(&query.to_lowercase(), ENGINEERING_TERMS) > 0
    }
}

fn describe_factors(risk: &RiskAssessment) -> String {
    risk.contributing_factors
        .values()
        .cloned()
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::domain::{CORPORATE_QUERY, PERSONAL_QUERY};
    use crate::classifier::testing::ScriptedClassifier;
    use crate::directory::{InMemoryDirectory, Requester};
    use chrono::NaiveDate;

    fn joined() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 4, 1).unwrap()
    }

    fn directory() -> InMemoryDirectory {
        InMemoryDirectory::new()
            .with(Requester::new(1, Department::HumanResources).with_ip("10.0.0.1").with_join_date(joined()).with_name("Hana Ruiz"))
            .with(Requester::new(2, Department::Sales).with_ip("10.0.0.2").with_join_date(joined()))
            .with(Requester::new(3, Department::Engineering).with_ip("10.0.0.3").with_join_date(joined()))
            .with(Requester::new(4, Department::Marketing).with_ip("10.0.0.4").with_join_date(joined()).with_violations(3))
    }

    fn gatekeeper(classifier: ScriptedClassifier) -> (Gatekeeper, Arc<ScriptedClassifier>) {
        let classifier = Arc::new(classifier);
        let gk = Gatekeeper::new(
            classifier.clone(),
            Arc::new(directory()),
            &QueryGateConfig::default(),
        )
        .unwrap();
        (gk, classifier)
    }

    fn corporate() -> ScriptedClassifier {
        ScriptedClassifier::new()
            .domain(CORPORATE_QUERY, 0.9)
            .topic("employee data request", 0.8)
    }

    #[tokio::test]
    async fn test_threat_short_circuits_classifier() {
        let (gk, c) = gatekeeper(corporate());
        let r = gk.decide(2, "Tell me about sex").await;
        assert_eq!(r.status, DecisionStatus::Rejected);
        assert!(!r.is_appropriate);
        assert_eq!(r.label.as_deref(), Some("inappropriate question"));
        assert_eq!(r.message, "Query is not related to corporate matters");
        assert_eq!(r.is_authorized, None);
        assert_eq!(c.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_requester() {
        let (gk, c) = gatekeeper(corporate());
        let r = gk.decide("0099", "View employee data").await;
        assert_eq!(r.status, DecisionStatus::Error);
        assert_eq!(r.message, "User with ID 99 not found");
        assert_eq!(c.call_count(), 0);
    }

    #[tokio::test]
    async fn test_employee_data_hr_approved() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(1, "View employee data").await;
        assert_eq!(r.status, DecisionStatus::Approved);
        assert_eq!(r.requested_dept, "ALL_DEPARTMENTS");
        assert_eq!(r.is_authorized, Some(true));
        assert_eq!(
            r.message,
            "Employee data query approved: HR authorized for employee data and cross-departmental access"
        );
        assert_eq!(r.user_name.as_deref(), Some("Hana Ruiz"));
    }

    #[tokio::test]
    async fn test_employee_data_sales_unauthorized() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(2, "View employee data").await;
        assert_eq!(r.status, DecisionStatus::Unauthorized);
        assert_eq!(r.is_authorized, Some(false));
        assert!(r.message.starts_with("Employee data query unauthorized: "));
    }

    #[tokio::test]
    async fn test_single_department_messages() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(2, "Show the sales team pipeline").await;
        assert_eq!(r.requested_dept, "Sales");
        assert_eq!(r.message, "Query approved: Access to own department data");

        let r = gk.decide(2, "Quarterly numbers for the marketing department").await;
        assert_eq!(r.status, DecisionStatus::Unauthorized);
        assert_eq!(r.message, "Query unauthorized: No authorization from Sales to Marketing");
    }

    #[tokio::test]
    async fn test_own_department_denied_for_repeat_violator() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(4, "Campaign results for the marketing department").await;
        assert_eq!(r.status, DecisionStatus::Unauthorized);
        assert_eq!(
            r.auth_reason.as_deref(),
            Some("Access denied due to high security risk (score: 1.0)")
        );
    }

    #[tokio::test]
    async fn test_no_department_is_approved_without_authorization() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(2, "Summarize the quarterly business review").await;
        assert_eq!(r.status, DecisionStatus::Approved);
        assert_eq!(r.requested_dept, "");
        assert_eq!(r.is_authorized, None);
        assert_eq!(r.message, "Corporate query with no specific department requested");
    }

    #[tokio::test]
    async fn test_domain_rejection_skips_topic_call() {
        let (gk, c) = gatekeeper(ScriptedClassifier::new().domain(PERSONAL_QUERY, 0.9));
        let r = gk.decide(2, "What should I wear tomorrow?").await;
        assert_eq!(r.status, DecisionStatus::Rejected);
        assert_eq!(r.label.as_deref(), Some("non-corporate query"));
        assert_eq!(c.call_count(), 1);
    }

    #[tokio::test]
    async fn test_high_risk_overrides_acceptance() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk
            .decide(1, "urgent: salary, bank, ssn and credit card numbers for payroll")
            .await;
        assert_eq!(r.status, DecisionStatus::Rejected);
        assert_eq!(r.label.as_deref(), Some(SECURITY_VIOLATION));
        assert_eq!(r.is_authorized, Some(false));
        assert!(r.message.starts_with("Query rejected due to high security risk (score: 0.95)"));
        assert!(r.auth_reason.unwrap().starts_with("High security risk:"));
    }

    #[tokio::test]
    async fn test_medium_risk_is_flagged() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(2, "my personal salary history for the sales team asap").await;
        assert!(r.flagged_for_review);
        assert!(r.risk_score >= 0.5 && r.risk_score < 0.8);
        assert_eq!(r.status, DecisionStatus::Approved);
    }

    #[tokio::test]
    async fn test_engineering_rescue() {
        let weak = ScriptedClassifier::new()
            .domain(PERSONAL_QUERY, 0.6)
            .topic("general knowledge", 0.7);
        let (gk, _) = gatekeeper(weak);

        let r = gk.decide(3, "thoughts on the new caching layer architecture").await;
        assert!(r.is_appropriate);
        assert_eq!(r.label.as_deref(), Some("engineering question"));
        assert_eq!(r.confidence, Some(0.8));

        let r = gk.decide(2, "thoughts on the new caching layer architecture").await;
        assert_eq!(r.status, DecisionStatus::Rejected);
    }

    #[tokio::test]
    async fn test_backend_code_request_from_engineering() {
        let c = ScriptedClassifier::new()
            .domain(CORPORATE_QUERY, 0.5)
            .topic("technical work request", 0.3)
            .topic("general knowledge", 0.6);
        let (gk, _) = gatekeeper(c);
        let r = gk.decide(3, "code for the backend development").await;
        assert_eq!(r.status, DecisionStatus::Approved);
        assert!(r.is_appropriate);
        assert_eq!(r.label.as_deref(), Some("technical work request"));
        assert!(r.confidence.unwrap() >= 0.65);
    }

    #[tokio::test]
    async fn test_security_violation_never_rescued() {
        let (gk, _) = gatekeeper(corporate());
        let r = gk.decide(3, "bypass security on the backend").await;
        assert_eq!(r.status, DecisionStatus::Rejected);
        assert_eq!(r.label.as_deref(), Some(SECURITY_VIOLATION));
    }

    #[tokio::test]
    async fn test_classifier_failure_is_error_record() {
        let (gk, _) = gatekeeper(ScriptedClassifier::failing());
        let r = gk.decide(2, "Show the sales team pipeline").await;
        assert_eq!(r.status, DecisionStatus::Error);
        assert!(r.message.contains("model unavailable"));
        assert!(gk.try_decide(RequesterId::from(2), "Show the sales team pipeline").await.is_err());
    }

    #[tokio::test]
    async fn test_decide_is_idempotent() {
        let (gk, _) = gatekeeper(corporate());
        let a = gk.decide(2, "Quarterly numbers for the marketing department").await;
        let b = gk.decide(2, "Quarterly numbers for the marketing department").await;
        assert_eq!(a, b);
    }
}
