//! Construction-time configuration of a role manager.

use std::path::Path;

use crate::error::RoleManagerError;
use crate::primitives::{Address, HatId};

/// Immutable settings fixed when a manager is constructed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManagerConfig {
    /// Address identifying the capability registry this manager is deployed
    /// against. It is recorded for operators and logs only; the handle the
    /// manager calls is the one passed to `RoleManager::new`. Zero stands for
    /// a null registry handle and is rejected by `validate`.
    pub registry: Address,
    /// Address under which this manager is installed as eligibility and
    /// toggle oracle on every token it creates.
    pub oracle: Address,
    /// Credential that authorizes privileged operations.
    pub admin_hat: HatId,
    /// Parent of every role token.
    pub branch_hat: HatId,
    /// Image reference passed along on token creation.
    #[serde(default)]
    pub image_uri: String,
}

impl ManagerConfig {
    pub fn new(registry: Address, oracle: Address, admin_hat: HatId, branch_hat: HatId) -> Self {
        ManagerConfig { registry, oracle, admin_hat, branch_hat, image_uri: String::new() }
    }

    pub fn with_image_uri(mut self, image_uri: impl Into<String>) -> Self {
        self.image_uri = image_uri.into();
        self
    }

    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, RoleManagerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RoleManagerError::Configuration(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, RoleManagerError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RoleManagerError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), RoleManagerError> {
        if self.registry.is_zero() {
            return Err(RoleManagerError::Configuration("registry address is unset".into()));
        }
        if self.oracle.is_zero() {
            return Err(RoleManagerError::Configuration("oracle address is unset".into()));
        }
        if self.admin_hat.is_none() {
            return Err(RoleManagerError::Configuration("admin hat is unset".into()));
        }
        if self.branch_hat.is_none() {
            return Err(RoleManagerError::Configuration("branch hat is unset".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> ManagerConfig {
        ManagerConfig::new(Address::repeat_byte(0xee), Address::repeat_byte(0xaa), HatId(1), HatId(2))
    }

    #[test]
    fn test_validate_rejects_unset_fields() {
        assert!(sample().validate().is_ok());

        let mut c = sample();
        c.registry = Address::ZERO;
        assert!(matches!(c.validate(), Err(RoleManagerError::Configuration(_))));

        let mut c = sample();
        c.oracle = Address::ZERO;
        assert!(matches!(c.validate(), Err(RoleManagerError::Configuration(_))));

        let mut c = sample();
        c.admin_hat = HatId::NONE;
        assert!(matches!(c.validate(), Err(RoleManagerError::Configuration(_))));

        let mut c = sample();
        c.branch_hat = HatId::NONE;
        assert!(matches!(c.validate(), Err(RoleManagerError::Configuration(_))));
    }

    #[test]
    fn test_json_roundtrip_and_default_image() {
        let registry = vec![0xeeu8; 20];
        let oracle = vec![0xaau8; 20];
        let json = serde_json::json!({
            "registry": registry,
            "oracle": oracle,
            "admin_hat": 1,
            "branch_hat": 2
        })
        .to_string();
        let config = ManagerConfig::from_json_str(&json).unwrap();
        assert_eq!(config, sample());
        assert_eq!(config.image_uri, "");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let cfg = sample().with_image_uri("ipfs://roles");
        write!(file, "{}", serde_json::to_string(&cfg).unwrap()).unwrap();

        let loaded = ManagerConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_from_file_missing_or_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(ManagerConfig::from_file(&missing), Err(RoleManagerError::Configuration(_))));
        assert!(matches!(ManagerConfig::from_json_str("{"), Err(RoleManagerError::Configuration(_))));
    }
}
