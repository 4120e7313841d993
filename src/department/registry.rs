//! Canonical departments and the alias table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical organizational department
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Human Resources")]
    HumanResources,
    Engineering,
    Sales,
    Marketing,
    Accounting,
}

impl Department {
    /// All canonical departments, in registry order
    pub const ALL: [Department; 5] = [
        Department::HumanResources,
        Department::Engineering,
        Department::Sales,
        Department::Marketing,
        Department::Accounting,
    ];

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HumanResources => "Human Resources",
            Self::Engineering => "Engineering",
            Self::Sales => "Sales",
            Self::Marketing => "Marketing",
            Self::Accounting => "Accounting",
        }
    }

    /// Resolve a canonical name or any known alias, case-insensitively
    pub fn resolve(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().to_lowercase() == needle)
            .or_else(|| SynonymTable::standard().lookup(&needle))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker string for the cross-departmental scope
pub const ALL_DEPARTMENTS: &str = "ALL_DEPARTMENTS";

/// Data scope a query targets: one department, or cross-departmental data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepartmentScope {
    Department(Department),
    /// Cross-departmental or undifferentiated employee data (owned by HR)
    AllDepartments,
}

impl DepartmentScope {
    pub fn department(&self) -> Option<Department> {
        match self {
            Self::Department(d) => Some(*d),
            Self::AllDepartments => None,
        }
    }
}

impl From<Department> for DepartmentScope {
    fn from(d: Department) -> Self {
        Self::Department(d)
    }
}

impl fmt::Display for DepartmentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Department(d) => f.write_str(d.as_str()),
            Self::AllDepartments => f.write_str(ALL_DEPARTMENTS),
        }
    }
}

impl Serialize for DepartmentScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Alias entries in lookup order. Order matters: the extractor returns the
/// first alias that matches.
const STANDARD_ALIASES: &[(&str, Department)] = &[
    ("hr", Department::HumanResources),
    ("human resources", Department::HumanResources),
    ("human resource", Department::HumanResources),
    ("personnel", Department::HumanResources),
    ("eng", Department::Engineering),
    ("engineering", Department::Engineering),
    ("software", Department::Engineering),
    ("tech", Department::Engineering),
    ("technology", Department::Engineering),
    ("development", Department::Engineering),
    ("dev", Department::Engineering),
    ("it", Department::Engineering),
    ("programming", Department::Engineering),
    ("sales", Department::Sales),
    ("sale", Department::Sales),
    ("marketing", Department::Marketing),
    ("market", Department::Marketing),
    ("advertising", Department::Marketing),
    ("accounting", Department::Accounting),
    ("finance", Department::Accounting),
    ("financial", Department::Accounting),
    ("bookkeeping", Department::Accounting),
];

/// Ordered mapping from lowercase alias to canonical department
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: Vec<(String, Department)>,
}

impl SynonymTable {
    /// The built-in alias table
    pub fn standard() -> Self {
        Self {
            entries: STANDARD_ALIASES
                .iter()
                .map(|(alias, dept)| (alias.to_string(), *dept))
                .collect(),
        }
    }

    /// Exact alias lookup (input must already be lowercase)
    pub fn lookup(&self, alias: &str) -> Option<Department> {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, d)| *d)
    }

    /// Iterate `(alias, department)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Department)> {
        self.entries.iter().map(|(a, d)| (a.as_str(), *d))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::standard()
    }
}
