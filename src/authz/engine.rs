//! Deterministic department authorization

use super::policy::{CrossDepartmentMatrix, SpecialRoleTable};
use crate::department::{Department, DepartmentScope};
use crate::directory::Requester;
use crate::error::{Error, Result};
use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    pub authorized: bool,
    pub reason: String,
}

impl AuthorizationDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            authorized: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            authorized: false,
            reason: reason.into(),
        }
    }
}

/// Requester risk derived from history and tenure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequesterRisk {
    pub score: f64,
    pub is_new_employee: bool,
}

impl RequesterRisk {
    pub fn assess(requester: &Requester, today: NaiveDate) -> Self {
        let mut score = match requester.past_violations {
            0 => 0.0,
            1 => 0.3,
            2 => 0.7,
            _ => 1.0,
        };

        let mut is_new_employee = false;
        if let Some(joined) = requester.join_date {
            let months = (today.year() - joined.year()) * 12 + today.month() as i32 - joined.month() as i32;
            is_new_employee = months < 3;
            if months < 1 {
                score += 0.4;
            } else if months < 3 {
                score += 0.2;
            }
        }

        Self {
            score,
            is_new_employee,
        }
    }
}

/// Rule-based authorization over typed policy tables
#[derive(Debug, Clone, Default)]
pub struct AuthorizationEngine {
    special_roles: SpecialRoleTable,
    cross_department: CrossDepartmentMatrix,
}

impl AuthorizationEngine {
    pub fn new(special_roles: SpecialRoleTable, cross_department: CrossDepartmentMatrix) -> Self {
        Self {
            special_roles,
            cross_department,
        }
    }

    /// Engine with the standard special roles and cross-department grants
    pub fn standard() -> Self {
        Self::new(
            SpecialRoleTable::from_roles(&SpecialRoleTable::standard_roles()),
            CrossDepartmentMatrix::from_grants(&CrossDepartmentMatrix::standard_grants()),
        )
    }

    /// Authorize against today's date
    pub fn authorize(
        &self,
        requester: Option<&Requester>,
        requested: Option<DepartmentScope>,
    ) -> AuthorizationDecision {
        self.authorize_at(requester, requested, Local::now().date_naive())
    }

    /// Authorize as of `today`. Never errors: failures deny.
    pub fn authorize_at(
        &self,
        requester: Option<&Requester>,
        requested: Option<DepartmentScope>,
        today: NaiveDate,
    ) -> AuthorizationDecision {
        let Some(requested) = requested else {
            tracing::warn!("No specific department detected in the query");
            return AuthorizationDecision::deny("No specific department detected in the query");
        };

        match self.evaluate(requester, requested, today) {
            Ok(decision) => {
                if decision.authorized {
                    tracing::info!(scope = %requested, reason = %decision.reason, "Access granted");
                } else {
                    tracing::warn!(scope = %requested, reason = %decision.reason, "Access denied");
                }
                decision
            }
            Err(e) => {
                tracing::error!(error = %e, "Authorization check failed");
                let reason = match &e {
                    Error::Authorization(_) => e.to_string(),
                    other => format!("Authorization error: {}", other),
                };
                AuthorizationDecision::deny(reason)
            }
        }
    }

    fn evaluate(
        &self,
        requester: Option<&Requester>,
        requested: DepartmentScope,
        today: NaiveDate,
    ) -> Result<AuthorizationDecision> {
        let requester =
            requester.ok_or_else(|| Error::Authorization("Requester record unavailable".to_string()))?;

        match requested {
            DepartmentScope::AllDepartments => Ok(self.evaluate_all_departments(requester)),
            DepartmentScope::Department(dept) => Ok(self.evaluate_department(requester, dept, today)),
        }
    }

    fn evaluate_all_departments(&self, requester: &Requester) -> AuthorizationDecision {
        if requester.department == Department::HumanResources {
            return AuthorizationDecision::allow(
                "HR authorized for employee data and cross-departmental access",
            );
        }
        if self.special_roles.has_broad_access(&requester.id) {
            return AuthorizationDecision::allow(
                "Special role with broad access authorized for cross-departmental data",
            );
        }
        AuthorizationDecision::deny(
            "Employee data and cross-departmental queries require HR or special role authorization",
        )
    }

    fn evaluate_department(
        &self,
        requester: &Requester,
        requested: Department,
        today: NaiveDate,
    ) -> AuthorizationDecision {
        let home = requester.department;
        let violations = requester.past_violations;
        let own_department = home == requested;
        let hr_for_hr = home == Department::HumanResources && requested == Department::HumanResources;

        let risk = RequesterRisk::assess(requester, today);
        tracing::debug!(requester = %requester.id, risk = risk.score, "Requester risk");

        if risk.score >= 1.0 && !hr_for_hr {
            return AuthorizationDecision::deny(format!(
                "Access denied due to high security risk (score: {:.1})",
                risk.score
            ));
        }

        if risk.is_new_employee && violations > 0 && !own_department {
            return AuthorizationDecision::deny(
                "New employees with past violations can only access their own department",
            );
        }

        if risk.score >= 0.5 && !own_department {
            return AuthorizationDecision::deny(format!(
                "Cross-department access restricted due to security risk (score: {:.1})",
                risk.score
            ));
        }

        if requester.is_localhost() {
            return AuthorizationDecision::allow("Localhost connection with elevated access");
        }

        if own_department {
            return AuthorizationDecision::allow("Access to own department data");
        }

        if self.special_roles.covers(&requester.id, requested) {
            if violations >= 3 && !hr_for_hr {
                return AuthorizationDecision::deny(format!(
                    "Special role restricted due to {} violations",
                    violations
                ));
            }
            return AuthorizationDecision::allow(format!(
                "Special role authorization for {}",
                requested
            ));
        }

        if self.cross_department.allows(home, requested) {
            let hr_leniency = home == Department::HumanResources && violations < 5;
            if violations > 0 && !hr_leniency {
                return AuthorizationDecision::deny(
                    "Cross-department access restricted due to past violations",
                );
            }
            return AuthorizationDecision::allow(format!(
                "Cross-department authorization from {} to {}",
                home, requested
            ));
        }

        AuthorizationDecision::deny(format!("No authorization from {} to {}", home, requested))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::Department::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn engine() -> AuthorizationEngine {
        AuthorizationEngine::standard()
    }

    fn check(r: &Requester, scope: impl Into<DepartmentScope>) -> AuthorizationDecision {
        engine().authorize_at(Some(r), Some(scope.into()), today())
    }

    fn veteran(id: u64, dept: Department) -> Requester {
        Requester::new(id, dept)
            .with_ip("10.1.2.3")
            .with_join_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    }

    #[test]
    fn test_missing_scope_denies() {
        let r = veteran(1, Sales);
        let d = engine().authorize_at(Some(&r), None, today());
        assert!(!d.authorized);
        assert_eq!(d.reason, "No specific department detected in the query");
    }

    #[test]
    fn test_missing_requester_denies() {
        let d = engine().authorize_at(None, Some(Sales.into()), today());
        assert!(!d.authorized);
        assert!(d.reason.starts_with("Authorization error:"));
    }

    #[test]
    fn test_all_departments() {
        assert!(check(&veteran(1, HumanResources), DepartmentScope::AllDepartments).authorized);
        assert!(check(&veteran(13, Accounting), DepartmentScope::AllDepartments).authorized);

        let d = check(&veteran(16, Accounting), DepartmentScope::AllDepartments);
        assert!(!d.authorized);

        let d = check(&veteran(2, Sales), DepartmentScope::AllDepartments);
        assert!(!d.authorized);
        assert_eq!(
            d.reason,
            "Employee data and cross-departmental queries require HR or special role authorization"
        );
    }

    #[test]
    fn test_own_department() {
        let d = check(&veteran(3, Marketing), Marketing);
        assert!(d.authorized);
        assert_eq!(d.reason, "Access to own department data");
    }

    #[test]
    fn test_reflexive_for_every_department() {
        for dept in Department::ALL {
            assert!(check(&veteran(3, dept), dept).authorized);
            assert!(check(&veteran(3, dept).with_violations(2), dept).authorized);
        }
    }

    #[test]
    fn test_high_risk_denies_own_department() {
        let r = veteran(3, Sales).with_violations(3);
        let d = check(&r, Sales);
        assert!(!d.authorized);
        assert_eq!(d.reason, "Access denied due to high security risk (score: 1.0)");
    }

    #[test]
    fn test_high_risk_hr_exemption() {
        let r = veteran(3, HumanResources).with_violations(4);
        assert!(check(&r, HumanResources).authorized);
        assert!(!check(&r, Sales).authorized);
    }

    #[test]
    fn test_new_employee_with_violations() {
        let r = Requester::new(5, Sales)
            .with_join_date(NaiveDate::from_ymd_opt(2025, 5, 1).unwrap())
            .with_violations(1);
        assert!(check(&r, Sales).authorized);
        let d = check(&r, Marketing);
        assert_eq!(d.reason, "New employees with past violations can only access their own department");
    }

    #[test]
    fn test_brand_new_employee_risk() {
        let r = Requester::new(5, Sales).with_join_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let risk = RequesterRisk::assess(&r, today());
        assert!(risk.is_new_employee);
        assert!((risk.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_medium_risk_blocks_cross_department() {
        // HR may read Sales, but two violations put risk at 0.7
        let r = veteran(4, HumanResources).with_violations(2);
        let d = check(&r, Sales);
        assert_eq!(d.reason, "Cross-department access restricted due to security risk (score: 0.7)");
    }

    #[test]
    fn test_localhost_elevated() {
        let r = veteran(6, Engineering).with_ip("127.0.0.1");
        let d = check(&r, Accounting);
        assert!(d.authorized);
        assert_eq!(d.reason, "Localhost connection with elevated access");
    }

    #[test]
    fn test_localhost_does_not_bypass_risk_gates() {
        let r = veteran(7, Sales).with_ip("127.0.0.1").with_violations(2);
        let d = check(&r, Marketing);
        assert!(!d.authorized);
        assert_eq!(d.reason, "Cross-department access restricted due to security risk (score: 0.7)");

        let r = veteran(7, Sales).with_ip("127.0.0.1").with_violations(3);
        let d = check(&r, Marketing);
        assert_eq!(d.reason, "Access denied due to high security risk (score: 1.0)");
    }

    #[test]
    fn test_special_role() {
        let d = check(&veteran(10, HumanResources), Engineering);
        assert_eq!(d.reason, "Special role authorization for Engineering");

        let d = check(&veteran(13, Accounting), Sales);
        assert!(d.authorized);
        assert_eq!(d.reason, "Special role authorization for Sales");
    }

    #[test]
    fn test_cross_matrix() {
        let d = check(&veteran(20, Accounting), Marketing);
        assert_eq!(d.reason, "Cross-department authorization from Accounting to Marketing");

        let d = check(&veteran(20, Accounting).with_violations(1), Marketing);
        assert_eq!(d.reason, "Cross-department access restricted due to past violations");

        let d = check(&veteran(21, HumanResources).with_violations(1), Engineering);
        assert!(d.authorized);
    }

    #[test]
    fn test_default_deny() {
        let d = check(&veteran(22, Engineering), Sales);
        assert!(!d.authorized);
        assert_eq!(d.reason, "No authorization from Engineering to Sales");
    }

    #[test]
    fn test_unparseable_join_date_is_not_new() {
        let r = Requester::new(23, Accounting).with_violations(1);
        let risk = RequesterRisk::assess(&r, today());
        assert!(!risk.is_new_employee);
        assert!(check(&r, Accounting).authorized);
        let d = check(&r, Sales);
        assert_eq!(d.reason, "Cross-department access restricted due to past violations");
    }
}
