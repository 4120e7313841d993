//! CSV-backed employee directory

use super::{parse_join_date, parse_violations, InMemoryDirectory, Requester, RequesterDirectory, RequesterId};
use crate::department::Department;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One employee row; columns beyond these are ignored
#[derive(Debug, Deserialize)]
struct EmployeeRow {
    id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    dept: String,
    #[serde(default)]
    ip_address: String,
    #[serde(default)]
    join_date: String,
    #[serde(default)]
    past_violations: String,
}

impl EmployeeRow {
    fn into_requester(self) -> Option<Requester> {
        let department = Department::resolve(&self.dept)?;
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string();

        let mut requester = Requester::new(RequesterId::new(&self.id), department)
            .with_ip(self.ip_address.trim())
            .with_violations(parse_violations(&self.past_violations));
        if let Some(date) = parse_join_date(&self.join_date) {
            requester = requester.with_join_date(date);
        }
        if !name.is_empty() {
            requester = requester.with_name(name);
        }
        Some(requester)
    }
}

/// Employee directory loaded once from a CSV file
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    inner: InMemoryDirectory,
    skipped: usize,
}

impl CsvDirectory {
    /// Load the directory from a CSV file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Directory(format!("Failed to open employee data {}: {}", path.display(), e))
        })?;
        let directory = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            requesters = directory.len(),
            skipped = directory.skipped,
            "Loaded employee directory"
        );
        Ok(directory)
    }

    /// Parse CSV content with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ::csv::ReaderBuilder::new()
            .trim(::csv::Trim::Headers)
            .flexible(true)
            .from_reader(reader);

        let mut inner = InMemoryDirectory::new();
        let mut skipped = 0;
        for record in reader.deserialize::<EmployeeRow>() {
            let row = record?;
            let id = row.id.clone();
            let dept = row.dept.clone();
            match row.into_requester() {
                Some(requester) => inner.insert(requester),
                None => {
                    tracing::warn!(id = %id, dept = %dept, "Skipping employee with unknown department");
                    skipped += 1;
                }
            }
        }

        Ok(Self { inner, skipped })
    }

    /// Rows dropped for an unrecognized department
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl RequesterDirectory for CsvDirectory {
    fn lookup(&self, id: &RequesterId) -> Result<Option<Requester>> {
        self.inner.lookup(id)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
