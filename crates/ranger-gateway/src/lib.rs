//! # ranger-gateway
//!
//! The remote policy gateway: one outbound request per operation against the
//! Ranger Admin public v2 API, with the HTTP outcome mapped to a wire
//! [`Policy`](ranger_contracts::wire::Policy) or a typed
//! [`RangerError`](ranger_contracts::error::RangerError).
//!
//! This crate provides:
//! - The [`PolicyGateway`] trait the reconciler is written against
//! - [`HttpPolicyGateway`], a blocking `reqwest` implementation
//! - [`InMemoryPolicyGateway`], a reference implementation with call recording
//! - [`GatewayConfig`], TOML-loaded endpoint and credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//! use ranger_gateway::{GatewayConfig, HttpPolicyGateway, PolicyGateway};
//!
//! let config = GatewayConfig::from_file(Path::new("ranger.toml"))?;
//! let gateway = HttpPolicyGateway::from_config(&config)?;
//! let policy = gateway.find_policy("hive_prod", "sales-read")?;
//! ```

pub mod config;
pub mod http;
pub mod memory;
pub mod routes;
pub mod traits;

pub use config::GatewayConfig;
pub use http::HttpPolicyGateway;
pub use memory::{GatewayCall, InMemoryPolicyGateway, InjectedFailure};
pub use routes::PolicyRoutes;
pub use traits::PolicyGateway;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use ranger_contracts::{error::RangerError, wire::Policy};

    use super::*;

    fn policy(name: &str, service: &str) -> Policy {
        Policy {
            id: None,
            name: name.to_string(),
            service: service.to_string(),
            description: None,
            is_enabled: true,
            is_audit_enabled: true,
            policy_type: Default::default(),
            resources: Default::default(),
            policy_items: vec![],
            deny_policy_items: vec![],
        }
    }

    // ── Routes ────────────────────────────────────────────────────────────────

    #[test]
    fn routes_build_id_and_collection_paths() {
        let routes = PolicyRoutes::new("http://ranger:6080/").unwrap();

        assert_eq!(
            routes.policies().as_str(),
            "http://ranger:6080/service/public/v2/api/policy"
        );
        assert_eq!(
            routes.policy(42).as_str(),
            "http://ranger:6080/service/public/v2/api/policy/42"
        );
    }

    #[test]
    fn routes_keep_endpoint_path_prefix() {
        let routes = PolicyRoutes::new("https://gw.example.com/ranger").unwrap();
        assert_eq!(
            routes.policy(7).as_str(),
            "https://gw.example.com/ranger/service/public/v2/api/policy/7"
        );
    }

    #[test]
    fn routes_search_encodes_service_and_name() {
        let routes = PolicyRoutes::new("http://ranger:6080").unwrap();

        let url = routes.policy_search("hive prod", "sales & ops");

        assert_eq!(url.path(), "/service/public/v2/api/service/hive%20prod/policy");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("policyName".to_string(), "sales & ops".to_string())]
        );
    }

    #[test]
    fn routes_reject_unparseable_endpoint() {
        assert!(matches!(
            PolicyRoutes::new("ranger:6080 no scheme"),
            Err(RangerError::ConfigError { .. })
        ));
    }

    // ── GatewayConfig ─────────────────────────────────────────────────────────

    #[test]
    fn config_parses_toml_and_trims_endpoint() {
        let config = GatewayConfig::from_toml_str(
            r#"
            endpoint = "https://ranger.internal:6182/"
            username = "admin"
            password = "rangerR0cks!"
            insecure = true
            timeout_secs = 15
        "#,
        )
        .unwrap();

        assert_eq!(config.endpoint, "https://ranger.internal:6182");
        assert!(config.insecure);
        assert_eq!(config.timeout(), Some(std::time::Duration::from_secs(15)));
    }

    #[test]
    fn config_defaults_to_verified_tls_and_no_timeout() {
        let config = GatewayConfig::new("http://ranger:6080", "admin", "pw").unwrap();
        assert!(!config.insecure);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn config_builds_basic_auth_header() {
        let config = GatewayConfig::new("http://ranger:6080", "admin", "admin").unwrap();
        // base64("admin:admin")
        assert_eq!(config.authorization_header(), "Basic YWRtaW46YWRtaW4=");
    }

    #[test]
    fn config_rejects_empty_password() {
        match GatewayConfig::new("http://ranger:6080", "admin", "") {
            Err(RangerError::ConfigError { reason }) => assert!(reason.contains("'password'")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_rejects_malformed_toml() {
        match GatewayConfig::from_toml_str("endpoint = ") {
            Err(RangerError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse gateway TOML"))
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_debug_redacts_password() {
        let config = GatewayConfig::new("http://ranger:6080", "admin", "s3cret").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    // ── InMemoryPolicyGateway ─────────────────────────────────────────────────

    #[test]
    fn memory_create_assigns_sequential_ids() {
        let gateway = InMemoryPolicyGateway::new();

        let first = gateway.create_policy(&policy("a", "hive")).unwrap();
        let second = gateway.create_policy(&policy("b", "hive")).unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(gateway.len(), 2);
    }

    #[test]
    fn memory_create_rejects_duplicate_name_in_service() {
        let gateway = InMemoryPolicyGateway::new();
        gateway.seed(policy("a", "hive"));

        let err = gateway.create_policy(&policy("a", "hive")).unwrap_err();
        assert_eq!(err.status(), Some(400));

        // Same name in another service is fine.
        assert!(gateway.create_policy(&policy("a", "hdfs")).is_ok());
    }

    #[test]
    fn memory_find_requires_exact_name() {
        let gateway = InMemoryPolicyGateway::new();
        gateway.seed(policy("foo_v2", "hive"));

        assert!(gateway.find_policy("hive", "foo").unwrap_err().is_not_found());

        let id = gateway.seed(policy("foo", "hive"));
        assert_eq!(gateway.find_policy("hive", "foo").unwrap().id, Some(id));
    }

    #[test]
    fn memory_records_calls_and_injects_failures() {
        let gateway = InMemoryPolicyGateway::new();
        let id = gateway.seed(policy("a", "hive"));

        gateway.fail_with(InjectedFailure::Status(503));
        assert_eq!(gateway.get_policy(id).unwrap_err().status(), Some(503));

        gateway.clear_failure();
        gateway.delete_policy(id).unwrap();
        assert!(gateway.delete_policy(id).unwrap_err().is_not_found());

        assert_eq!(
            gateway.calls(),
            vec![
                GatewayCall::Get(id),
                GatewayCall::Delete(id),
                GatewayCall::Delete(id)
            ]
        );
    }

    #[test]
    fn memory_replace_of_missing_policy_is_not_found() {
        let gateway = InMemoryPolicyGateway::new();
        assert!(gateway
            .replace_policy(99, &policy("a", "hive"))
            .unwrap_err()
            .is_not_found());
    }
}
