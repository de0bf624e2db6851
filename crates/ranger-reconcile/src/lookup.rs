//! Read-only lookup of an existing policy, by id or by service and name.
//!
//! Unlike `Reconciler::read`, a missing policy is an error here: the caller
//! asked for a specific policy and there is no state to drop.

use tracing::debug;

use ranger_contracts::{
    declared::{parse_policy_id, DeclaredPolicy},
    error::{RangerError, RangerResult},
};
use ranger_translate::wire_to_declared;

use crate::reconciler::Reconciler;

/// How to locate a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyQuery {
    ById(String),
    ByName { service: String, name: String },
}

impl PolicyQuery {
    /// Build a query from optional inputs. An id wins over service + name.
    pub fn from_parts(
        id: Option<&str>,
        service: Option<&str>,
        name: Option<&str>,
    ) -> RangerResult<Self> {
        match (id, service, name) {
            (Some(id), _, _) => Ok(PolicyQuery::ById(id.to_string())),
            (None, Some(service), Some(name)) => Ok(PolicyQuery::ByName {
                service: service.to_string(),
                name: name.to_string(),
            }),
            _ => Err(RangerError::ValidationError {
                reason: "a policy lookup needs an id, or both a service and a name".to_string(),
            }),
        }
    }
}

impl Reconciler {
    /// Fetch the policy matching `query` as a full declared record.
    pub fn lookup(&self, query: &PolicyQuery) -> RangerResult<DeclaredPolicy> {
        debug!(query = ?query, "looking up Ranger policy");
        let policy = match query {
            PolicyQuery::ById(raw) => {
                let id = parse_policy_id(raw).map_err(|e| e.during("lookup"))?;
                self.gateway().get_policy(id)
            }
            PolicyQuery::ByName { service, name } => self.gateway().find_policy(service, name),
        }
        .map_err(|e| e.during("lookup"))?;

        Ok(wire_to_declared(&policy))
    }
}
