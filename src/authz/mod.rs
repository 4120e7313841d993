//! Department authorization
//!
//! Fail-closed rule evaluation combining the requester's home department,
//! the requested scope, special roles, cross-department grants and the
//! requester's own risk (past violations, tenure).

pub mod engine;
pub mod policy;

pub use engine::{AuthorizationDecision, AuthorizationEngine, RequesterRisk};
pub use policy::{CrossDepartmentGrant, CrossDepartmentMatrix, SpecialRole, SpecialRoleTable};
