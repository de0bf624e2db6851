//! The declared-state document `rangerctl` reads and writes.
//!
//! ```json
//! { "policies": [ { "name": "sales-read", "service": "hive_prod", ... } ] }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use ranger_contracts::{
    declared::DeclaredPolicy,
    error::{RangerError, RangerResult},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub policies: Vec<DeclaredPolicy>,
}

impl StateDocument {
    pub fn from_json_str(s: &str) -> RangerResult<Self> {
        serde_json::from_str(s).map_err(|e| RangerError::ConfigError {
            reason: format!("failed to parse state document: {e}"),
        })
    }

    /// Load from `path`. A missing file is an empty document.
    pub fn load(path: &Path) -> RangerResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| RangerError::ConfigError {
            reason: format!("failed to read state document {}: {e}", path.display()),
        })?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> RangerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RangerError::ConfigError {
            reason: format!("failed to encode state document: {e}"),
        })
    }

    pub fn save(&self, path: &Path) -> RangerResult<()> {
        let content = self.to_json_string()?;
        std::fs::write(path, content + "\n").map_err(|e| RangerError::ConfigError {
            reason: format!("failed to write state document {}: {e}", path.display()),
        })
    }

    /// True if some entry already tracks the remote policy `id`.
    pub fn tracks(&self, id: &str) -> bool {
        self.policies.iter().any(|p| p.id.as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_applies_declared_defaults() {
        let doc = StateDocument::from_json_str(
            r#"{ "policies": [ {
                "name": "sales-read",
                "service": "hive_prod",
                "resources": [ { "type": "database", "values": ["sales"] } ],
                "policy_item": [ { "users": ["alice"], "permissions": ["select"] } ]
            } ] }"#,
        )
        .unwrap();

        let policy = &doc.policies[0];
        assert_eq!(policy.id, None);
        assert!(policy.is_enabled);
        assert!(policy.is_audit_enabled);
        assert_eq!(policy.policy_type, 0);
        assert_eq!(policy.policy_items[0].permissions, vec!["select".to_string()]);
    }

    #[test]
    fn test_empty_object_is_empty_document() {
        assert_eq!(StateDocument::from_json_str("{}").unwrap(), StateDocument::default());
    }

    #[test]
    fn test_malformed_document_is_config_error() {
        let err = StateDocument::from_json_str("{ policies: ").unwrap_err();
        assert!(matches!(err, RangerError::ConfigError { .. }));
    }

    #[test]
    fn test_save_then_load_from_disk() {
        let path = std::env::temp_dir().join(format!("rangerctl-state-{}.json", std::process::id()));
        let mut doc = StateDocument::default();
        let mut policy = DeclaredPolicy::new("sales-read", "hive_prod");
        policy.id = Some("12".to_string());
        doc.policies.push(policy);

        doc.save(&path).unwrap();
        let loaded = StateDocument::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded, doc);
        assert!(loaded.tracks("12"));
        assert!(!loaded.tracks("13"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let path = std::env::temp_dir().join("rangerctl-state-does-not-exist.json");
        assert!(StateDocument::load(&path).unwrap().policies.is_empty());
    }
}
