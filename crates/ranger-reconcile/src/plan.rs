//! Change planning and drift comparison.
//!
//! Two declared policies are in agreement when they match after
//! normalization:
//!
//! - resources are compared sorted by component type; a type declared
//!   twice stays twice
//! - users, groups, roles, permissions and condition values are compared
//!   as sets
//! - an absent description equals an empty one
//! - the id is ignored
//!
//! Resource values and the order of rules within a list stay significant.

use std::collections::{BTreeMap, BTreeSet};

use ranger_contracts::{
    declared::{DeclaredItem, DeclaredPolicy},
    outcome::PlannedChange,
};

/// Decide how `current` must change to become `desired`.
///
/// `current` is the refreshed state, or `None` when nothing is tracked.
pub fn plan_change(current: Option<&DeclaredPolicy>, desired: &DeclaredPolicy) -> PlannedChange {
    match current {
        None => PlannedChange::Create,
        Some(current) if current.id.is_none() => PlannedChange::Create,
        Some(current) if current.service != desired.service => PlannedChange::Replace,
        Some(current) if in_agreement(current, desired) => PlannedChange::NoOp,
        Some(_) => PlannedChange::Update,
    }
}

/// True if `a` and `b` describe the same remote policy content.
pub fn in_agreement(a: &DeclaredPolicy, b: &DeclaredPolicy) -> bool {
    Normalized::from(a) == Normalized::from(b)
}

#[derive(Debug, PartialEq, Eq)]
struct Normalized<'a> {
    name: &'a str,
    service: &'a str,
    description: &'a str,
    is_enabled: bool,
    is_audit_enabled: bool,
    policy_type: i64,
    resources: Vec<(&'a str, &'a [String], bool, bool)>,
    policy_items: Vec<NormalizedItem<'a>>,
    deny_items: Vec<NormalizedItem<'a>>,
}

#[derive(Debug, PartialEq, Eq)]
struct NormalizedItem<'a> {
    users: BTreeSet<&'a str>,
    groups: BTreeSet<&'a str>,
    roles: BTreeSet<&'a str>,
    permissions: BTreeSet<&'a str>,
    delegate_admin: bool,
    conditions: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> From<&'a DeclaredPolicy> for Normalized<'a> {
    fn from(policy: &'a DeclaredPolicy) -> Self {
        Self {
            name: &policy.name,
            service: &policy.service,
            description: policy.description.as_deref().unwrap_or(""),
            is_enabled: policy.is_enabled,
            is_audit_enabled: policy.is_audit_enabled,
            policy_type: policy.policy_type,
            resources: {
                let mut resources: Vec<_> = policy
                    .resources
                    .iter()
                    .map(|r| {
                        (
                            r.resource_type.as_str(),
                            r.values.as_slice(),
                            r.is_exclude,
                            r.is_recursive,
                        )
                    })
                    .collect();
                resources.sort();
                resources
            },
            policy_items: policy.policy_items.iter().map(NormalizedItem::from).collect(),
            deny_items: policy.deny_items.iter().map(NormalizedItem::from).collect(),
        }
    }
}

impl<'a> From<&'a DeclaredItem> for NormalizedItem<'a> {
    fn from(item: &'a DeclaredItem) -> Self {
        fn set(values: &[String]) -> BTreeSet<&str> {
            values.iter().map(String::as_str).collect()
        }
        Self {
            users: set(&item.users),
            groups: set(&item.groups),
            roles: set(&item.roles),
            permissions: set(&item.permissions),
            delegate_admin: item.delegate_admin,
            conditions: item
                .conditions
                .iter()
                .map(|(condition_type, values)| (condition_type.as_str(), set(values)))
                .collect(),
        }
    }
}
