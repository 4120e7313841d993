//! Requester directory
//!
//! Read-only lookup of the employees who submit queries. Identifiers arrive as
//! numbers or strings and are normalized into a [`RequesterId`] at the
//! boundary; attribute parsing is lenient and falls back to the safest value.

pub mod csv;

pub use self::csv::CsvDirectory;

use crate::department::Department;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

/// Date formats accepted for join dates, tried in order
pub const JOIN_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Canonical requester identifier.
///
/// Surrounding whitespace is dropped and purely numeric ids lose leading
/// zeros, so `7`, `"7"` and `" 007 "` are the same requester.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RequesterId(String);

impl RequesterId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            let stripped = trimmed.trim_start_matches('0');
            if stripped.is_empty() {
                return Self("0".to_string());
            }
            return Self(stripped.to_string());
        }
        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RequesterId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RequesterId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RequesterId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for RequesterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Self::from(n),
            Raw::Text(s) => Self::new(s),
        })
    }
}

/// An employee who may submit queries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub id: RequesterId,
    pub department: Department,
    pub ip_address: String,
    pub join_date: Option<NaiveDate>,
    pub past_violations: u32,
    pub name: Option<String>,
}

impl Requester {
    pub fn new(id: impl Into<RequesterId>, department: Department) -> Self {
        Self {
            id: id.into(),
            department,
            ip_address: String::new(),
            join_date: None,
            past_violations: 0,
            name: None,
        }
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = ip.into();
        self
    }

    pub fn with_join_date(mut self, date: NaiveDate) -> Self {
        self.join_date = Some(date);
        self
    }

    pub fn with_violations(mut self, violations: u32) -> Self {
        self.past_violations = violations;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Loopback address or the literal `localhost`
    pub fn is_localhost(&self) -> bool {
        let ip = self.ip_address.trim();
        ip.eq_ignore_ascii_case("localhost")
            || ip.parse::<IpAddr>().map(|a| a.is_loopback()).unwrap_or(false)
    }
}

/// Parse a join date in any accepted format; anything else is `None`
pub fn parse_join_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    JOIN_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Parse a violation count leniently: integers or integral floats, else 0
pub fn parse_violations(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u32>() {
        return n;
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => f as u32,
        _ => 0,
    }
}

/// Read-only requester lookup
pub trait RequesterDirectory: Send + Sync {
    fn lookup(&self, id: &RequesterId) -> Result<Option<Requester>>;

    /// Number of known requesters
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Directory held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    requesters: HashMap<RequesterId, Requester>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, requester: Requester) {
        self.requesters.insert(requester.id.clone(), requester);
    }

    pub fn with(mut self, requester: Requester) -> Self {
        self.insert(requester);
        self
    }
}

impl FromIterator<Requester> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = Requester>>(iter: I) -> Self {
        let mut dir = Self::new();
        for r in iter {
            dir.insert(r);
        }
        dir
    }
}

impl RequesterDirectory for InMemoryDirectory {
    fn lookup(&self, id: &RequesterId) -> Result<Option<Requester>> {
        Ok(self.requesters.get(id).cloned())
    }

    fn len(&self) -> usize {
        self.requesters.len()
    }
}
