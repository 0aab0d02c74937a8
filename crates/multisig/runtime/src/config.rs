//! Deployment configuration
//!
//! A deployment is the `(master, owners, quorum)` triple consumed by instance
//! construction, optionally with an initial deposit. A factory file lists
//! several deployments under `[[instances]]`.

use multisig_types::{validate_owners, validate_quorum, Amount, Identity, MultisigError, MultisigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a single wallet instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Principal holding the master role
    pub master: Identity,

    /// Initial owners, in order
    pub owners: Vec<Identity>,

    /// Confirmations required to execute
    pub quorum: u32,

    /// Native value credited by the master right after creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_deposit: Option<Amount>,

    /// Free-form name for operators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DeploymentConfig {
    pub fn new(master: Identity, owners: Vec<Identity>, quorum: u32) -> Self {
        Self {
            master,
            owners,
            quorum,
            initial_deposit: None,
            label: None,
        }
    }

    /// Load and validate a deployment from a TOML file
    pub fn load(path: impl AsRef<Path>) -> MultisigResult<Self> {
        let contents = read_config(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> MultisigResult<Self> {
        let config: DeploymentConfig =
            toml::from_str(contents).map_err(|e| MultisigError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the owner and quorum rules instance construction enforces
    pub fn validate(&self) -> MultisigResult<()> {
        validate_owners(&self.owners)?;
        validate_quorum(self.quorum, self.owners.len())
    }
}

/// Configuration for a fleet of instances created by one factory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub instances: Vec<DeploymentConfig>,
}

impl FactoryConfig {
    /// Load a factory file; a single top-level deployment is accepted as a fleet of one
    pub fn load(path: impl AsRef<Path>) -> MultisigResult<Self> {
        let contents = read_config(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> MultisigResult<Self> {
        let table: toml::Table =
            toml::from_str(contents).map_err(|e| MultisigError::Config(e.to_string()))?;

        let config = if table.contains_key("instances") {
            toml::from_str::<FactoryConfig>(contents)
                .map_err(|e| MultisigError::Config(e.to_string()))?
        } else {
            FactoryConfig {
                instances: vec![toml::from_str::<DeploymentConfig>(contents)
                    .map_err(|e| MultisigError::Config(e.to_string()))?],
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MultisigResult<()> {
        if self.instances.is_empty() {
            return Err(MultisigError::Config(
                "factory configuration lists no instances".into(),
            ));
        }
        for (index, instance) in self.instances.iter().enumerate() {
            instance
                .validate()
                .map_err(|e| MultisigError::Config(format!("instance {}: {}", index, e)))?;
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> MultisigResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| MultisigError::Config(format!("cannot read {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SINGLE: &str = r#"
master = "alice"
owners = ["alice", "bob", "carol"]
quorum = 2
initial_deposit = 100
label = "ops"
"#;

    #[test]
    fn test_parse_deployment() {
        let config = DeploymentConfig::from_toml_str(SINGLE).unwrap();
        assert_eq!(config.master, Identity::new("alice"));
        assert_eq!(config.owners.len(), 3);
        assert_eq!(config.quorum, 2);
        assert_eq!(config.initial_deposit, Some(Amount::new(100)));
        assert_eq!(config.label.as_deref(), Some("ops"));
    }

    #[test]
    fn test_deployment_rules_enforced() {
        let zero = r#"
master = "m"
owners = ["a"]
quorum = 0
"#;
        assert!(matches!(
            DeploymentConfig::from_toml_str(zero),
            Err(MultisigError::InvariantViolation(_))
        ));

        let dup = r#"
master = "m"
owners = ["a", "a"]
quorum = 1
"#;
        assert!(DeploymentConfig::from_toml_str(dup).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = DeploymentConfig::from_toml_str("master = ");
        assert!(matches!(result, Err(MultisigError::Config(_))));

        let missing_field = r#"master = "m""#;
        assert!(matches!(
            DeploymentConfig::from_toml_str(missing_field),
            Err(MultisigError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SINGLE.as_bytes()).unwrap();

        let config = DeploymentConfig::load(file.path()).unwrap();
        assert_eq!(config.quorum, 2);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = DeploymentConfig::load("/nonexistent/multisig/deploy.toml");
        assert!(matches!(result, Err(MultisigError::Config(_))));
    }

    #[test]
    fn test_factory_config() {
        let fleet = r#"
[[instances]]
master = "m"
owners = ["a", "b"]
quorum = 2

[[instances]]
master = "m"
owners = ["c"]
quorum = 1
label = "solo"
"#;
        let config = FactoryConfig::from_toml_str(fleet).unwrap();
        assert_eq!(config.instances.len(), 2);
        assert_eq!(config.instances[1].label.as_deref(), Some("solo"));
    }

    #[test]
    fn test_factory_accepts_single_deployment() {
        let config = FactoryConfig::from_toml_str(SINGLE).unwrap();
        assert_eq!(config.instances.len(), 1);
        assert_eq!(config.instances[0].master, Identity::new("alice"));
    }

    #[test]
    fn test_factory_reports_bad_instance() {
        let fleet = r#"
[[instances]]
master = "m"
owners = ["a"]
quorum = 3
"#;
        let err = FactoryConfig::from_toml_str(fleet).unwrap_err();
        assert!(err.to_string().contains("instance 0"));

        let empty = "instances = []";
        assert!(FactoryConfig::from_toml_str(empty).is_err());
    }
}
