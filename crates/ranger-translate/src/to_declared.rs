//! Wire → declared translation.
//!
//! Tolerant by contract: accesses with `isAllowed = false` are dropped and
//! malformed condition entries are skipped, so that a policy edited outside
//! rangersync can still be refreshed.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use ranger_contracts::{
    declared::{DeclaredItem, DeclaredPolicy, DeclaredResource},
    wire::{ConditionEntry, Policy, PolicyItem},
};

/// Translate a wire policy into the full declared record.
pub fn wire_to_declared(policy: &Policy) -> DeclaredPolicy {
    DeclaredPolicy {
        id: policy.id.map(|id| id.to_string()),
        name: policy.name.clone(),
        service: policy.service.clone(),
        description: Some(policy.description.clone().unwrap_or_default()),
        is_enabled: policy.is_enabled,
        is_audit_enabled: policy.is_audit_enabled,
        policy_type: policy.policy_type.into(),
        resources: policy
            .resources
            .iter()
            .map(|(resource_type, spec)| DeclaredResource {
                resource_type: resource_type.clone(),
                values: spec.values.clone(),
                is_exclude: spec.is_exclude,
                is_recursive: spec.is_recursive,
            })
            .collect(),
        policy_items: policy.policy_items.iter().map(item_from_wire).collect(),
        deny_items: policy.deny_policy_items.iter().map(item_from_wire).collect(),
    }
}

/// Translate one wire rule into a declared rule.
pub fn item_from_wire(item: &PolicyItem) -> DeclaredItem {
    let permissions = item
        .accesses
        .iter()
        .filter(|access| {
            if !access.is_allowed {
                debug!(access = %access.access_type, "ignoring access with isAllowed=false");
            }
            access.is_allowed
        })
        .map(|access| access.access_type.clone())
        .collect();

    DeclaredItem {
        users: item.users.clone(),
        groups: item.groups.clone(),
        roles: item.roles.clone(),
        permissions,
        delegate_admin: item.delegate_admin,
        conditions: flatten_conditions(&item.conditions),
    }
}

fn flatten_conditions(entries: &[ConditionEntry]) -> BTreeMap<String, Vec<String>> {
    let mut conditions = BTreeMap::new();
    for entry in entries {
        match entry {
            // A repeated condition type keeps the last entry.
            ConditionEntry::Typed(condition) => {
                conditions.insert(condition.condition_type.clone(), condition.values.clone());
            }
            ConditionEntry::Malformed(raw) => {
                warn!(
                    condition_type = raw.get("type").and_then(|t| t.as_str()).unwrap_or("<missing>"),
                    "skipping malformed policy condition"
                );
            }
        }
    }
    conditions
}
