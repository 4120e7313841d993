//! QueryGate configuration management

use crate::authz::{CrossDepartmentGrant, CrossDepartmentMatrix, SpecialRole, SpecialRoleTable};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main QueryGate configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryGateConfig {
    /// Let Engineering requesters through with technical queries the
    /// classifier judged non-corporate
    #[serde(default = "default_true")]
    pub rescue_engineering: bool,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Zero-shot classifier endpoint
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Decision thresholds
    #[serde(default)]
    pub thresholds: ThresholdConfig,

    /// Employee directory
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Access policy tables
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl Default for QueryGateConfig {
    fn default() -> Self {
        Self {
            rescue_engineering: true,
            server: ServerConfig::default(),
            classifier: ClassifierConfig::default(),
            thresholds: ThresholdConfig::default(),
            directory: DirectoryConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

impl QueryGateConfig {
    /// Load configuration from a TOML file; absent sections use defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.thresholds.validate()?;
        Ok(config)
    }
}

fn default_true() -> bool {
    true
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// Zero-shot classifier endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Base URL of the inference service
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// Environment variable holding the bearer token
    pub api_key_env: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co".to_string(),
            model: "facebook/bart-large-mnli".to_string(),
            api_key_env: Some("HF_API_TOKEN".to_string()),
            timeout_secs: 30,
        }
    }
}

/// Decision thresholds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Minimum score for the top-ranked corporate topic
    pub confidence_threshold: f64,

    /// Personal-domain score at which a query is rejected outright
    pub domain_reject: f64,

    /// Corporate-domain score that earns the benefit of the doubt
    pub domain_benefit: f64,

    /// Query risk that rejects as a security violation
    pub risk_reject: f64,

    /// Query risk that flags a decision for review
    pub risk_flag: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.45,
            domain_reject: 0.70,
            domain_benefit: 0.80,
            risk_reject: 0.8,
            risk_flag: 0.5,
        }
    }
}

impl ThresholdConfig {
    /// Every threshold must lie in [0, 1]
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("confidence_threshold", self.confidence_threshold),
            ("domain_reject", self.domain_reject),
            ("domain_benefit", self.domain_benefit),
            ("risk_reject", self.risk_reject),
            ("risk_flag", self.risk_flag),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::error::Error::Config(format!(
                    "Threshold {} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Employee directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryConfig {
    /// Path to the employee CSV
    pub path: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("MOCK_DATA.csv"),
        }
    }
}

/// Access policy tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Requesters with access beyond their home department
    pub special_roles: Vec<SpecialRole>,

    /// Departments a home department may read in addition to its own
    pub cross_department: Vec<CrossDepartmentGrant>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            special_roles: SpecialRoleTable::standard_roles(),
            cross_department: CrossDepartmentMatrix::standard_grants(),
        }
    }
}

impl PolicyConfig {
    pub fn special_role_table(&self) -> SpecialRoleTable {
        SpecialRoleTable::from_roles(&self.special_roles)
    }

    pub fn cross_department_matrix(&self) -> CrossDepartmentMatrix {
        CrossDepartmentMatrix::from_grants(&self.cross_department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::Department;
    use crate::directory::RequesterId;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = QueryGateConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.classifier.model, "facebook/bart-large-mnli");
        assert_eq!(config.thresholds.confidence_threshold, 0.45);
        assert_eq!(config.thresholds.domain_reject, 0.70);
        assert_eq!(config.thresholds.risk_reject, 0.8);
        assert_eq!(config.policy.special_roles.len(), 3);
        assert!(config.rescue_engineering);
        assert!(config.thresholds.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = QueryGateConfig::from_toml("").unwrap();
        assert_eq!(config.directory.path, PathBuf::from("MOCK_DATA.csv"));
        assert_eq!(config.policy.cross_department.len(), 3);
    }

    #[test]
    fn test_partial_sections() {
        let config = QueryGateConfig::from_toml(
            r#"
            rescue_engineering = false

            [server]
            port = 9000

            [thresholds]
            risk_reject = 0.9

            [[policy.special_roles]]
            id = 42
            departments = ["Sales", "Marketing", "Engineering"]
            "#,
        )
        .unwrap();
        assert!(!config.rescue_engineering);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.thresholds.risk_reject, 0.9);
        assert_eq!(config.thresholds.risk_flag, 0.5);

        let roles = config.policy.special_role_table();
        assert_eq!(roles.len(), 1);
        assert!(roles.covers(&RequesterId::from(42), Department::Engineering));
        // cross grants keep their defaults
        assert!(config
            .policy
            .cross_department_matrix()
            .allows(Department::Accounting, Department::Sales));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let err = QueryGateConfig::from_toml("[thresholds]\nrisk_flag = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("risk_flag"));
    }

    #[test]
    fn test_round_trips_through_toml() {
        let text = toml::to_string_pretty(&QueryGateConfig::default()).unwrap();
        let parsed = QueryGateConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.policy.special_roles, QueryGateConfig::default().policy.special_roles);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[directory]\npath = \"staff.csv\"").unwrap();
        let config = QueryGateConfig::load(file.path()).unwrap();
        assert_eq!(config.directory.path, PathBuf::from("staff.csv"));
    }
}
