//! Department reference extraction
//!
//! Maps a free-text query to the department whose data it targets. Evaluation
//! order, first match wins:
//!
//! 1. A known alias in a department context ("hr team", "in sales") or as a
//!    bare word.
//! 2. Cross-departmental phrasing ("by department", "each department").
//! 3. Undifferentiated employee data ("employee records", "staff list").
//! 4. Generic capture patterns ("data from X", "access to X") whose captured
//!    phrase is resolved against the alias table by exact or partial overlap.

use super::registry::{Department, DepartmentScope, SynonymTable};
use crate::error::{Error, Result};
use regex::Regex;

const CROSS_DEPARTMENT_PATTERNS: &[&str] = &[
    r"\beach\s+department\b",
    r"\ball\s+departments?\b",
    r"\bevery\s+department\b",
    r"\bdepartments?\s+(breakdown|summary|overview|analysis)\b",
    r"\bby\s+department\b",
    r"\bacross\s+departments?\b",
    r"\bmultiple\s+departments?\b",
];

const EMPLOYEE_DATA_PATTERNS: &[&str] = &[
    r"\bview\s+employee\s+data\b",
    r"\bemployee\s+data\b",
    r"\bemployee\s+information\b",
    r"\bstaff\s+data\b",
    r"\bpersonnel\s+data\b",
    r"\bemployee\s+records?\b",
    r"\bstaff\s+records?\b",
    r"\bpersonnel\s+records?\b",
    r"\ball\s+employees?\b",
    r"\bemployee\s+list\b",
    r"\bstaff\s+list\b",
    r"\bemployee\s+directory\b",
];

/// Capture patterns; group 1 holds the candidate department phrase.
const CAPTURE_PATTERNS: &[&str] = &[
    r"\bemployees?\s+in\s+(\w+(?:\s+\w+)?)\s*(?:department|team|staff)?\b",
    r"\bhow\s+many\s+(?:in\s+)?(\w+(?:\s+\w+)?)\s*(?:department|team)?\b",
    r"\b(\w+(?:\s+\w+)?)\s+department\b",
    r"\b(\w+(?:\s+\w+)?)\s+team\b",
    r"\bdata\s+from\s+(\w+(?:\s+\w+)?)\b",
    r"\bget\s+(\w+(?:\s+\w+)?)\s+information\b",
    r"\baccess\s+to\s+(\w+(?:\s+\w+)?)\b",
    r"\bfrom\s+(\w+(?:\s+\w+)?)\s+department\b",
    r"\bfor\s+(\w+(?:\s+\w+)?)\s+department\b",
    r"\bin\s+(\w+(?:\s+\w+)?)\s+department\b",
    r"\bof\s+(\w+(?:\s+\w+)?)\s+department\b",
];

struct AliasPatterns {
    department: Department,
    patterns: Vec<Regex>,
}

/// Pattern-based department extractor
pub struct DepartmentExtractor {
    synonyms: SynonymTable,
    aliases: Vec<AliasPatterns>,
    cross_department: Vec<Regex>,
    employee_data: Vec<Regex>,
    capture: Vec<Regex>,
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p)
                .map_err(|e| Error::Config(format!("Invalid department pattern '{}': {}", p, e)))
        })
        .collect()
}

impl DepartmentExtractor {
    /// Build an extractor over the given alias table
    pub fn new(synonyms: SynonymTable) -> Result<Self> {
        let aliases = synonyms
            .iter()
            .map(|(alias, department)| {
                let a = regex::escape(alias);
                let sources = [
                    format!(r"\b{}\s+department\b", a),
                    format!(r"\b{}\s+team\b", a),
                    format!(r"\b{}\s+staff\b", a),
                    format!(r"\bin\s+{}\b", a),
                    format!(r"\bfrom\s+{}\b", a),
                    format!(r"\bof\s+{}\b", a),
                    format!(r"\b{}\b", a),
                ];
                let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
                Ok(AliasPatterns {
                    department,
                    patterns: compile_all(&refs)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            synonyms,
            aliases,
            cross_department: compile_all(CROSS_DEPARTMENT_PATTERNS)?,
            employee_data: compile_all(EMPLOYEE_DATA_PATTERNS)?,
            capture: compile_all(CAPTURE_PATTERNS)?,
        })
    }

    /// Extract the department scope a query targets, if any
    pub fn extract(&self, query: &str) -> Option<DepartmentScope> {
        let query = query.trim().to_lowercase();

        for alias in &self.aliases {
            if alias.patterns.iter().any(|p| p.is_match(&query)) {
                tracing::info!(department = %alias.department, "Found department mention");
                return Some(DepartmentScope::Department(alias.department));
            }
        }

        if let Some(p) = self.cross_department.iter().find(|p| p.is_match(&query)) {
            tracing::info!(pattern = p.as_str(), "Detected cross-departmental query");
            return Some(DepartmentScope::AllDepartments);
        }

        if let Some(p) = self.employee_data.iter().find(|p| p.is_match(&query)) {
            tracing::info!(pattern = p.as_str(), "Detected general employee data request");
            return Some(DepartmentScope::AllDepartments);
        }

        for pattern in &self.capture {
            for caps in pattern.captures_iter(&query) {
                let Some(candidate) = caps.get(1).map(|m| m.as_str().trim()) else {
                    continue;
                };
                if candidate.chars().count() <= 1 {
                    continue;
                }
                if let Some(department) = self.resolve_candidate(candidate) {
                    tracing::info!(candidate, department = %department, "Resolved department candidate");
                    return Some(DepartmentScope::Department(department));
                }
            }
        }

        tracing::info!("No department detected in query");
        None
    }

    /// Resolve a captured phrase: exact alias first, then the first alias that
    /// overlaps it (alias inside phrase, any alias word inside phrase, or
    /// phrase inside alias).
    fn resolve_candidate(&self, candidate: &str) -> Option<Department> {
        if let Some(department) = self.synonyms.lookup(candidate) {
            return Some(department);
        }
        self.synonyms
            .iter()
            .find(|(alias, _)| {
                candidate.contains(alias)
                    || alias.split_whitespace().any(|word| candidate.contains(word))
                    || alias.contains(candidate)
            })
            .map(|(_, department)| department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> DepartmentExtractor {
        DepartmentExtractor::new(SynonymTable::standard()).unwrap()
    }

    fn dept(d: Department) -> Option<DepartmentScope> {
        Some(DepartmentScope::Department(d))
    }

    #[test]
    fn test_direct_alias_mentions() {
        let e = extractor();
        assert_eq!(e.extract("how many employees in software department"), dept(Department::Engineering));
        assert_eq!(e.extract("show me engineering team data"), dept(Department::Engineering));
        assert_eq!(e.extract("get HR information"), dept(Department::HumanResources));
        assert_eq!(e.extract("employees in tech department"), dept(Department::Engineering));
        assert_eq!(e.extract("sales team performance"), dept(Department::Sales));
        assert_eq!(e.extract("marketing department budget"), dept(Department::Marketing));
        assert_eq!(e.extract("accounting staff list"), dept(Department::Accounting));
        assert_eq!(e.extract("finance team members"), dept(Department::Accounting));
        assert_eq!(e.extract("IT department employees"), dept(Department::Engineering));
        assert_eq!(e.extract("Show me HR dashboard"), dept(Department::HumanResources));
    }

    #[test]
    fn test_every_alias_in_department_context() {
        let e = extractor();
        for (alias, department) in SynonymTable::standard().iter() {
            let query = format!("please list the {} department budget", alias);
            assert_eq!(e.extract(&query), dept(department), "alias '{}'", alias);
        }
    }

    #[test]
    fn test_alias_order_first_wins() {
        let e = extractor();
        // "hr" precedes "sales" in the table
        assert_eq!(e.extract("compare sales with hr"), dept(Department::HumanResources));
    }

    #[test]
    fn test_cross_departmental_queries() {
        let e = extractor();
        let all = Some(DepartmentScope::AllDepartments);
        assert_eq!(e.extract("How many employees work in each department?"), all);
        assert_eq!(e.extract("Show me all departments breakdown"), all);
        assert_eq!(e.extract("What's the employee count by department?"), all);
        assert_eq!(e.extract("List employees across all departments"), all);
        assert_eq!(e.extract("Department-wise headcount analysis across departments"), all);
    }

    #[test]
    fn test_general_employee_data_queries() {
        let e = extractor();
        let all = Some(DepartmentScope::AllDepartments);
        assert_eq!(e.extract("View employee data"), all);
        assert_eq!(e.extract("Employee data"), all);
        assert_eq!(e.extract("Show me employee information"), all);
        assert_eq!(e.extract("All employees"), all);
        assert_eq!(e.extract("Employee list"), all);
        assert_eq!(e.extract("Staff records"), all);
    }

    #[test]
    fn test_personnel_alias_beats_employee_data_pattern() {
        // "personnel" is an HR alias, checked before the employee-data patterns
        let e = extractor();
        assert_eq!(e.extract("personnel records"), dept(Department::HumanResources));
    }

    #[test]
    fn test_capture_with_partial_overlap() {
        let e = extractor();
        assert_eq!(e.extract("budget for the marketingops team"), dept(Department::Marketing));
        assert_eq!(e.extract("data from salesforce"), dept(Department::Sales));
    }

    #[test]
    fn test_no_department() {
        let e = extractor();
        assert_eq!(e.extract("What's the company holiday policy?"), None);
        assert_eq!(e.extract(""), None);
    }
}
