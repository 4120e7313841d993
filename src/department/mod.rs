//! Department registry and department-reference extraction

pub mod extractor;
pub mod registry;

pub use extractor::DepartmentExtractor;
pub use registry::{Department, DepartmentScope, SynonymTable, ALL_DEPARTMENTS};
