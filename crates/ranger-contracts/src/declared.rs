//! Declared (desired/observed) policy state as exchanged with the engine.
//!
//! Field names match the declared-resource surface (`snake_case`, with
//! `policy_item` / `deny_item` for the rule lists). Defaults mirror the
//! attribute defaults: policies and audits enabled, access policy type,
//! exclusion/recursion/delegation off.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{RangerError, RangerResult};

/// One declared Ranger policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredPolicy {
    /// Computed. Set by Create or Import, cleared when the policy is gone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Changing this forces replacement of the remote policy.
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default = "default_true")]
    pub is_audit_enabled: bool,
    /// 0 = access, 1 = data-mask, 2 = row-filter.
    #[serde(default)]
    pub policy_type: i64,
    #[serde(default)]
    pub resources: Vec<DeclaredResource>,
    #[serde(default, rename = "policy_item")]
    pub policy_items: Vec<DeclaredItem>,
    #[serde(default, rename = "deny_item")]
    pub deny_items: Vec<DeclaredItem>,
}

impl DeclaredPolicy {
    /// A policy with the given name and service and every other field defaulted.
    pub fn new(name: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            service: service.into(),
            description: None,
            is_enabled: true,
            is_audit_enabled: true,
            policy_type: 0,
            resources: Vec::new(),
            policy_items: Vec::new(),
            deny_items: Vec::new(),
        }
    }

    /// The rule list holding items of the given polarity.
    pub fn items(&self, kind: RuleKind) -> &[DeclaredItem] {
        match kind {
            RuleKind::Allow => &self.policy_items,
            RuleKind::Deny => &self.deny_items,
        }
    }

    /// The stored id parsed as the remote service's integer key.
    ///
    /// Returns `ValidationError` when no id is set or it is not an integer.
    pub fn numeric_id(&self) -> RangerResult<i64> {
        match &self.id {
            Some(id) => parse_policy_id(id),
            None => Err(RangerError::ValidationError {
                reason: format!("policy '{}' has no id", self.name),
            }),
        }
    }
}

/// A resource component and the values it matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredResource {
    /// Component name, e.g. `database`, `table`, `column`, `path`.
    #[serde(rename = "type")]
    pub resource_type: String,
    pub values: Vec<String>,
    #[serde(default)]
    pub is_exclude: bool,
    #[serde(default)]
    pub is_recursive: bool,
}

/// An allow or deny rule. Which one it is depends on the list it sits in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredItem {
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub delegate_admin: bool,
    /// Condition type to its values. Duplicate condition types on the wire
    /// collapse into one key here.
    #[serde(default)]
    pub conditions: BTreeMap<String, Vec<String>>,
}

/// The polarity of a rule list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Allow,
    Deny,
}

impl RuleKind {
    pub fn label(self) -> &'static str {
        match self {
            RuleKind::Allow => "allow",
            RuleKind::Deny => "deny",
        }
    }
}

/// Parse an id string as held in declared state or supplied on import.
pub fn parse_policy_id(raw: &str) -> RangerResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|e| RangerError::ValidationError {
            reason: format!("could not parse policy id '{raw}': {e}"),
        })
}

fn default_true() -> bool {
    true
}
