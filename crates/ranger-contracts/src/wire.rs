//! The JSON shape exchanged with the Ranger Admin public v2 API.
//!
//! Field names follow the remote service (`camelCase`). Nothing here knows
//! about declared state; conversion lives in `ranger-translate`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// A Ranger policy as sent to and received from the remote service.
///
/// `id` is absent until the service assigns one on create. `service` is fixed
/// at creation: changing it requires deleting and recreating the policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub is_audit_enabled: bool,
    #[serde(default)]
    pub policy_type: PolicyType,
    /// Keyed by resource component name (`database`, `table`, `path`, ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: BTreeMap<String, ResourceSpec>,
    /// Allow rules.
    #[serde(default, deserialize_with = "null_as_default")]
    pub policy_items: Vec<PolicyItem>,
    /// Deny rules. Items here carry `isAllowed = true` accesses as well; the
    /// list itself is what makes them deny rules.
    #[serde(default, deserialize_with = "null_as_default")]
    pub deny_policy_items: Vec<PolicyItem>,
}

/// The kind of policy, encoded on the wire as a small integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PolicyType {
    #[default]
    Access,
    DataMask,
    RowFilter,
}

impl TryFrom<i64> for PolicyType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PolicyType::Access),
            1 => Ok(PolicyType::DataMask),
            2 => Ok(PolicyType::RowFilter),
            other => Err(format!(
                "unknown policy type {other} (expected 0 = access, 1 = data-mask, 2 = row-filter)"
            )),
        }
    }
}

impl From<PolicyType> for i64 {
    fn from(value: PolicyType) -> Self {
        match value {
            PolicyType::Access => 0,
            PolicyType::DataMask => 1,
            PolicyType::RowFilter => 2,
        }
    }
}

/// The values one resource component matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<String>,
    /// Match everything except `values`.
    #[serde(
        default,
        rename = "isExcludes",
        alias = "isExclude",
        alias = "isExcludeSupported"
    )]
    pub is_exclude: bool,
    /// Match `values` hierarchically.
    #[serde(default)]
    pub is_recursive: bool,
}

/// One allow or deny rule: principals, granted accesses and conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyItem {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub accesses: Vec<Access>,
    #[serde(default)]
    pub delegate_admin: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionEntry>,
}

/// A single `{type, isAllowed}` access tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    #[serde(rename = "type")]
    pub access_type: String,
    #[serde(default)]
    pub is_allowed: bool,
}

impl Access {
    /// An access granting `access_type`. This is the only form rangersync writes.
    pub fn allowed(access_type: impl Into<String>) -> Self {
        Self {
            access_type: access_type.into(),
            is_allowed: true,
        }
    }
}

/// A well-formed `{type, values}` condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyCondition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub values: Vec<String>,
}

/// A condition entry as found in a rule's `conditions` list.
///
/// The remote service may hand back entries that do not fit
/// `PolicyCondition` (non-string values, missing fields). Those decode into
/// `Malformed` instead of failing the whole policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionEntry {
    Typed(PolicyCondition),
    Malformed(serde_json::Value),
}

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
