//! Declared → wire translation.
//!
//! 1. Reject input the remote service would misinterpret (blank name or
//!    service, unknown policy type, a resource component declared twice).
//! 2. Collapse the ordered resource list into the key-unique resource map.
//! 3. Emit each rule list into the wire list of the same polarity, turning
//!    every permission into an `{type, isAllowed: true}` access.

use std::collections::BTreeMap;

use ranger_contracts::{
    declared::{DeclaredItem, DeclaredPolicy, DeclaredResource, RuleKind},
    error::{RangerError, RangerResult},
    wire::{Access, ConditionEntry, Policy, PolicyCondition, PolicyItem, PolicyType, ResourceSpec},
};

/// Translate a declared policy into the wire shape, without an id.
///
/// The caller attaches the id for id-addressed writes.
pub fn declared_to_wire(declared: &DeclaredPolicy) -> RangerResult<Policy> {
    if declared.name.trim().is_empty() {
        return Err(RangerError::ValidationError {
            reason: "policy name must not be empty".to_string(),
        });
    }
    if declared.service.trim().is_empty() {
        return Err(RangerError::ValidationError {
            reason: format!("policy '{}' has an empty service", declared.name),
        });
    }

    let policy_type =
        PolicyType::try_from(declared.policy_type).map_err(|reason| RangerError::ValidationError {
            reason: format!("policy '{}': {}", declared.name, reason),
        })?;

    Ok(Policy {
        id: None,
        name: declared.name.clone(),
        service: declared.service.clone(),
        // The wire format has no null; an empty description is sent as absent.
        description: declared.description.clone().filter(|d| !d.is_empty()),
        is_enabled: declared.is_enabled,
        is_audit_enabled: declared.is_audit_enabled,
        policy_type,
        resources: resources_to_wire(&declared.name, &declared.resources)?,
        policy_items: items_to_wire(declared, RuleKind::Allow),
        deny_policy_items: items_to_wire(declared, RuleKind::Deny),
    })
}

/// Translate one declared rule into a wire rule.
pub fn item_to_wire(item: &DeclaredItem) -> PolicyItem {
    PolicyItem {
        users: item.users.clone(),
        groups: item.groups.clone(),
        roles: item.roles.clone(),
        accesses: item.permissions.iter().map(|p| Access::allowed(p.as_str())).collect(),
        delegate_admin: item.delegate_admin,
        conditions: item
            .conditions
            .iter()
            .map(|(condition_type, values)| {
                ConditionEntry::Typed(PolicyCondition {
                    condition_type: condition_type.clone(),
                    values: values.clone(),
                })
            })
            .collect(),
    }
}

fn resources_to_wire(
    policy_name: &str,
    resources: &[DeclaredResource],
) -> RangerResult<BTreeMap<String, ResourceSpec>> {
    let mut map = BTreeMap::new();
    for resource in resources {
        let spec = ResourceSpec {
            values: resource.values.clone(),
            is_exclude: resource.is_exclude,
            is_recursive: resource.is_recursive,
        };
        if map.insert(resource.resource_type.clone(), spec).is_some() {
            return Err(RangerError::ValidationError {
                reason: format!(
                    "policy '{}' declares resource '{}' more than once",
                    policy_name, resource.resource_type
                ),
            });
        }
    }
    Ok(map)
}

fn items_to_wire(declared: &DeclaredPolicy, kind: RuleKind) -> Vec<PolicyItem> {
    declared.items(kind).iter().map(item_to_wire).collect()
}
