//! Typed access tables: special roles and cross-department grants

use crate::department::Department;
use crate::directory::RequesterId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Special roles with broad access need at least this many departments
/// to read cross-departmental data
pub const BROAD_ACCESS_MIN_DEPARTMENTS: usize = 3;

/// One special-role grant as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialRole {
    pub id: RequesterId,
    pub departments: Vec<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One cross-department grant as written in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossDepartmentGrant {
    pub from: Department,
    pub to: Vec<Department>,
}

/// Requester id to the departments that requester may read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecialRoleTable {
    roles: BTreeMap<RequesterId, BTreeSet<Department>>,
}

impl SpecialRoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// HR admin (10), HR lead (16), finance director (13)
    pub fn standard_roles() -> Vec<SpecialRole> {
        vec![
            SpecialRole {
                id: RequesterId::from(10),
                departments: vec![
                    Department::HumanResources,
                    Department::Engineering,
                    Department::Sales,
                    Department::Marketing,
                ],
                title: Some("HR admin".to_string()),
            },
            SpecialRole {
                id: RequesterId::from(16),
                departments: vec![Department::HumanResources, Department::Accounting],
                title: Some("HR lead".to_string()),
            },
            SpecialRole {
                id: RequesterId::from(13),
                departments: vec![Department::Accounting, Department::Sales, Department::Marketing],
                title: Some("Finance director".to_string()),
            },
        ]
    }

    pub fn from_roles<'a>(roles: impl IntoIterator<Item = &'a SpecialRole>) -> Self {
        let mut table = Self::new();
        for role in roles {
            table.grant(role.id.clone(), role.departments.iter().copied());
        }
        table
    }

    pub fn grant(&mut self, id: RequesterId, departments: impl IntoIterator<Item = Department>) {
        self.roles.entry(id).or_default().extend(departments);
    }

    pub fn departments(&self, id: &RequesterId) -> Option<&BTreeSet<Department>> {
        self.roles.get(id)
    }

    pub fn covers(&self, id: &RequesterId, department: Department) -> bool {
        self.departments(id)
            .map(|d| d.contains(&department))
            .unwrap_or(false)
    }

    /// Whether the role reaches enough departments for cross-departmental data
    pub fn has_broad_access(&self, id: &RequesterId) -> bool {
        self.departments(id)
            .map(|d| d.len() >= BROAD_ACCESS_MIN_DEPARTMENTS)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Home department to the extra departments it may read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossDepartmentMatrix {
    grants: BTreeMap<Department, BTreeSet<Department>>,
}

impl CrossDepartmentMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// HR reads everything, Accounting reads the revenue departments,
    /// Engineering reads nothing extra
    pub fn standard_grants() -> Vec<CrossDepartmentGrant> {
        vec![
            CrossDepartmentGrant {
                from: Department::HumanResources,
                to: Department::ALL.to_vec(),
            },
            CrossDepartmentGrant {
                from: Department::Accounting,
                to: vec![Department::Sales, Department::Marketing],
            },
            CrossDepartmentGrant {
                from: Department::Engineering,
                to: Vec::new(),
            },
        ]
    }

    pub fn from_grants<'a>(grants: impl IntoIterator<Item = &'a CrossDepartmentGrant>) -> Self {
        let mut matrix = Self::new();
        for grant in grants {
            matrix
                .grants
                .entry(grant.from)
                .or_default()
                .extend(grant.to.iter().copied());
        }
        matrix
    }

    pub fn allows(&self, from: Department, to: Department) -> bool {
        self.grants
            .get(&from)
            .map(|d| d.contains(&to))
            .unwrap_or(false)
    }
}
