//! Decision records returned for every query

use crate::department::Department;
use crate::directory::RequesterId;
use crate::screening::RiskFactor;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final status of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Approved,
    Unauthorized,
    Rejected,
    Error,
}

impl DecisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Unauthorized => "unauthorized",
            Self::Rejected => "rejected",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything decided about one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRecord {
    pub query: String,
    pub status: DecisionStatus,
    pub message: String,
    pub is_appropriate: bool,
    pub label: Option<String>,
    pub confidence: Option<f64>,
    /// Canonical department, `ALL_DEPARTMENTS`, or empty
    pub requested_dept: String,
    /// `None` when authorization did not apply
    pub is_authorized: Option<bool>,
    pub auth_reason: Option<String>,
    pub user_id: RequesterId,
    pub user_dept: Option<Department>,
    pub user_name: Option<String>,
    pub risk_score: f64,
    pub flagged_for_review: bool,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub risk_factors: BTreeMap<RiskFactor, String>,
}

impl DecisionRecord {
    /// A bare record before classification
    pub fn new(query: impl Into<String>, user_id: RequesterId) -> Self {
        Self {
            query: query.into(),
            status: DecisionStatus::Error,
            message: String::new(),
            is_appropriate: false,
            label: None,
            confidence: None,
            requested_dept: String::new(),
            is_authorized: None,
            auth_reason: None,
            user_id,
            user_dept: None,
            user_name: None,
            risk_score: 0.0,
            flagged_for_review: false,
            risk_factors: BTreeMap::new(),
        }
    }

    /// An `error` record carrying only the failure message
    pub fn error(query: impl Into<String>, user_id: RequesterId, message: impl Into<String>) -> Self {
        let mut record = Self::new(query, user_id);
        record.message = message.into();
        record
    }
}
