//! # ranger-translate
//!
//! Pure, bidirectional conversion between the declared policy model and the
//! Ranger wire model.
//!
//! ## Overview
//!
//! [`declared_to_wire`] validates and emits the wire [`Policy`] sent on
//! create and replace. [`wire_to_declared`] rebuilds the full declared record
//! on refresh. Neither performs I/O.
//!
//! Translating wire → declared → wire reproduces the original value up to
//! ordering: resource components and condition types are keyed maps, and
//! principal lists are sets as far as the remote service is concerned.
//!
//! ## Polarity
//!
//! A rule is a deny rule because it sits in `deny_item` / `denyPolicyItems`,
//! never because of an access flag. Every access written carries
//! `isAllowed = true`.
//!
//! [`Policy`]: ranger_contracts::wire::Policy

pub mod to_declared;
pub mod to_wire;

pub use to_declared::{item_from_wire, wire_to_declared};
pub use to_wire::{declared_to_wire, item_to_wire};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use ranger_contracts::{
        declared::{DeclaredItem, DeclaredPolicy, DeclaredResource},
        error::RangerError,
        wire::{Access, Policy, PolicyItem, PolicyType},
    };

    use crate::{declared_to_wire, item_from_wire, item_to_wire, wire_to_declared};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn resource(resource_type: &str, values: &[&str]) -> DeclaredResource {
        DeclaredResource {
            resource_type: resource_type.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
            is_exclude: false,
            is_recursive: false,
        }
    }

    fn item(users: &[&str], permissions: &[&str]) -> DeclaredItem {
        DeclaredItem {
            users: users.iter().map(|u| u.to_string()).collect(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    /// A policy touching every declared field.
    fn full_policy() -> DeclaredPolicy {
        let mut conditions = BTreeMap::new();
        conditions.insert("ip-range".to_string(), vec!["10.0.0.0/8".to_string()]);

        let mut policy = DeclaredPolicy::new("sales-read", "hive_prod");
        policy.description = Some("read access to sales".to_string());
        policy.is_audit_enabled = false;
        policy.policy_type = 0;
        policy.resources = vec![
            resource("table", &["orders", "returns"]),
            DeclaredResource {
                is_exclude: true,
                ..resource("database", &["sales"])
            },
            resource("column", &["*"]),
        ];
        policy.policy_items = vec![DeclaredItem {
            groups: vec!["analysts".to_string()],
            roles: vec!["reporting".to_string()],
            delegate_admin: true,
            conditions,
            ..item(&["alice", "bob"], &["select", "read"])
        }];
        policy.deny_items = vec![item(&["mallory"], &["drop"])];
        policy
    }

    fn sorted_resources(mut policy: DeclaredPolicy) -> DeclaredPolicy {
        policy
            .resources
            .sort_by(|a, b| a.resource_type.cmp(&b.resource_type));
        policy
    }

    // ── 1. declared → wire → declared ─────────────────────────────────────────

    /// Every field survives the round trip; only resource order may change.
    #[test]
    fn test_declared_round_trip_is_set_equal() {
        let declared = full_policy();

        let wire = declared_to_wire(&declared).unwrap();
        let back = wire_to_declared(&wire);

        assert_eq!(sorted_resources(back), sorted_resources(declared));
    }

    // ── 2. wire → declared → wire ─────────────────────────────────────────────

    #[test]
    fn test_wire_round_trip_reproduces_wire_value() {
        let wire = declared_to_wire(&full_policy()).unwrap();
        let again = declared_to_wire(&wire_to_declared(&wire)).unwrap();
        assert_eq!(again, wire);
    }

    // ── 3. permissions ↔ accesses ─────────────────────────────────────────────

    #[test]
    fn test_permissions_become_allowed_accesses() {
        let wire = item_to_wire(&item(&["alice"], &["read", "write"]));

        assert_eq!(
            wire.accesses,
            vec![Access::allowed("read"), Access::allowed("write")]
        );
    }

    #[test]
    fn test_accesses_become_permissions_in_any_order() {
        let wire = PolicyItem {
            accesses: vec![Access::allowed("write"), Access::allowed("read")],
            ..Default::default()
        };

        let mut permissions = item_from_wire(&wire).permissions;
        permissions.sort();

        assert_eq!(permissions, vec!["read".to_string(), "write".to_string()]);
    }

    /// Accesses with isAllowed=false are never written by rangersync but the
    /// remote schema permits them; they are dropped on read.
    #[test]
    fn test_disallowed_accesses_are_excluded_on_read() {
        let wire = PolicyItem {
            accesses: vec![
                Access::allowed("read"),
                Access {
                    access_type: "write".to_string(),
                    is_allowed: false,
                },
            ],
            ..Default::default()
        };

        assert_eq!(item_from_wire(&wire).permissions, vec!["read".to_string()]);
    }

    // ── 4. polarity ───────────────────────────────────────────────────────────

    #[test]
    fn test_deny_items_land_in_deny_list_with_allowed_accesses() {
        let wire = declared_to_wire(&full_policy()).unwrap();

        assert_eq!(wire.policy_items.len(), 1);
        assert_eq!(wire.deny_policy_items.len(), 1);
        assert_eq!(wire.deny_policy_items[0].users, vec!["mallory".to_string()]);
        assert!(wire.deny_policy_items[0].accesses.iter().all(|a| a.is_allowed));
    }

    // ── 5. resources ──────────────────────────────────────────────────────────

    #[test]
    fn test_resources_keyed_by_type() {
        let wire = declared_to_wire(&full_policy()).unwrap();

        assert_eq!(wire.resources.len(), 3);
        assert!(wire.resources["database"].is_exclude);
        assert_eq!(
            wire.resources["table"].values,
            vec!["orders".to_string(), "returns".to_string()]
        );
    }

    #[test]
    fn test_duplicate_resource_type_is_rejected() {
        let mut policy = full_policy();
        policy.resources.push(resource("table", &["customers"]));

        match declared_to_wire(&policy) {
            Err(RangerError::ValidationError { reason }) => {
                assert!(reason.contains("'table'"), "unexpected reason: {reason}");
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    // ── 6. conditions ─────────────────────────────────────────────────────────

    #[test]
    fn test_conditions_emitted_as_type_value_pairs() {
        let mut declared = item(&["alice"], &["read"]);
        declared
            .conditions
            .insert("ip-range".to_string(), vec!["10.0.0.0/8".to_string()]);
        declared
            .conditions
            .insert("hour".to_string(), vec!["9".to_string(), "17".to_string()]);

        let out = serde_json::to_value(item_to_wire(&declared)).unwrap();
        let conditions = out["conditions"].as_array().unwrap();

        assert_eq!(conditions.len(), 2);
        assert!(conditions.contains(&json!({ "type": "ip-range", "values": ["10.0.0.0/8"] })));
        assert!(conditions.contains(&json!({ "type": "hour", "values": ["9", "17"] })));
    }

    #[test]
    fn test_malformed_condition_key_is_omitted() {
        let wire: PolicyItem = serde_json::from_value(json!({
            "accesses": [{ "type": "read", "isAllowed": true }],
            "conditions": [
                { "type": "ip-range", "values": ["10.0.0.0/8"] },
                { "type": "expiry", "values": [1700000000, "soon"] },
                { "values": ["orphan"] }
            ]
        }))
        .unwrap();

        let declared = item_from_wire(&wire);

        assert_eq!(declared.conditions.len(), 1);
        assert!(declared.conditions.contains_key("ip-range"));
        assert!(!declared.conditions.contains_key("expiry"));
    }

    #[test]
    fn test_repeated_condition_type_collapses() {
        let wire: PolicyItem = serde_json::from_value(json!({
            "accesses": [],
            "conditions": [
                { "type": "hour", "values": ["9"] },
                { "type": "hour", "values": ["17"] }
            ]
        }))
        .unwrap();

        let declared = item_from_wire(&wire);

        assert_eq!(declared.conditions.len(), 1);
        assert_eq!(declared.conditions["hour"], vec!["17".to_string()]);
    }

    #[test]
    fn test_no_conditions_emits_no_conditions_field() {
        let wire = item_to_wire(&item(&["alice"], &["read"]));
        assert!(wire.conditions.is_empty());
        let out = serde_json::to_value(&wire).unwrap();
        assert!(out.get("conditions").is_none());
    }

    // ── 7. edge cases ─────────────────────────────────────────────────────────

    #[test]
    fn test_absent_wire_description_becomes_empty_string() {
        let wire: Policy = serde_json::from_value(json!({
            "id": 3,
            "name": "p",
            "service": "s"
        }))
        .unwrap();

        let declared = wire_to_declared(&wire);

        assert_eq!(declared.id.as_deref(), Some("3"));
        assert_eq!(declared.description.as_deref(), Some(""));
        assert!(declared.policy_items.is_empty());
        assert!(declared.deny_items.is_empty());
    }

    #[test]
    fn test_empty_description_is_not_sent() {
        let mut policy = DeclaredPolicy::new("p", "s");
        policy.description = Some(String::new());

        let wire = declared_to_wire(&policy).unwrap();

        assert_eq!(wire.description, None);
    }

    #[test]
    fn test_translation_never_sets_id() {
        let mut policy = full_policy();
        policy.id = Some("88".to_string());

        assert_eq!(declared_to_wire(&policy).unwrap().id, None);
    }

    #[test]
    fn test_policy_type_maps_to_enum() {
        let mut policy = DeclaredPolicy::new("mask-ssn", "hive_prod");
        policy.policy_type = 1;
        assert_eq!(declared_to_wire(&policy).unwrap().policy_type, PolicyType::DataMask);

        policy.policy_type = 7;
        assert!(matches!(
            declared_to_wire(&policy),
            Err(RangerError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_blank_service_is_rejected() {
        let policy = DeclaredPolicy::new("p", "  ");
        assert!(matches!(
            declared_to_wire(&policy),
            Err(RangerError::ValidationError { .. })
        ));
    }
}
