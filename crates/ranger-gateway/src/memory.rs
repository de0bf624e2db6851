//! In-memory implementation of `PolicyGateway`.
//!
//! `InMemoryPolicyGateway` stands in for a Ranger Admin instance: it assigns
//! ids on create, enforces name uniqueness per service, searches names by
//! substring the way the remote endpoint does, and records every call so
//! callers can assert which requests were (or were not) issued.
//!
//! A failure can be injected with `fail_with`; every call then fails the same
//! way until `clear_failure` is called.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ranger_contracts::{
    error::{RangerError, RangerResult},
    wire::Policy,
};

use crate::traits::PolicyGateway;

/// A request the gateway received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Get(i64),
    Find { service: String, name: String },
    Create(String),
    Replace(i64),
    Delete(i64),
}

/// A failure to inject into every subsequent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Respond with this HTTP status (404 becomes `NotFound`).
    Status(u16),
    /// Behave as if the service could not be reached.
    Unreachable,
    /// Respond with a body that does not decode.
    Garbage,
}

pub(crate) struct InMemoryState {
    pub(crate) policies: BTreeMap<i64, Policy>,
    pub(crate) next_id: i64,
    pub(crate) calls: Vec<GatewayCall>,
    pub(crate) failure: Option<InjectedFailure>,
}

/// A `PolicyGateway` backed by a map, shareable across clones.
#[derive(Clone)]
pub struct InMemoryPolicyGateway {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryPolicyGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPolicyGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                policies: BTreeMap::new(),
                next_id: 1,
                calls: Vec::new(),
                failure: None,
            })),
        }
    }

    /// Store `policy` directly, without recording a call. Returns its id.
    pub fn seed(&self, mut policy: Policy) -> i64 {
        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;
        policy.id = Some(id);
        state.policies.insert(id, policy);
        id
    }

    /// Snapshot of the stored policy with this id.
    pub fn stored(&self, id: i64) -> Option<Policy> {
        self.lock().policies.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    pub fn fail_with(&self, failure: InjectedFailure) {
        self.lock().failure = Some(failure);
    }

    pub fn clear_failure(&self) {
        self.lock().failure = None;
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        // A poisoned lock only means a test thread panicked mid-call.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `call` and fail if a failure is injected.
    fn begin(&self, call: GatewayCall) -> RangerResult<MutexGuard<'_, InMemoryState>> {
        let mut state = self.lock();
        state.calls.push(call);
        let failure = state.failure.clone();
        match failure {
            None => Ok(state),
            Some(InjectedFailure::Status(404)) => Err(RangerError::NotFound {
                what: "injected 404".to_string(),
            }),
            Some(InjectedFailure::Status(status)) => Err(RangerError::ApiError {
                status,
                body: "injected failure".to_string(),
            }),
            Some(InjectedFailure::Unreachable) => Err(RangerError::ApiUnreachable {
                reason: "connection refused".to_string(),
            }),
            Some(InjectedFailure::Garbage) => Err(RangerError::DecodeError {
                reason: "expected value at line 1 column 1".to_string(),
            }),
        }
    }
}

impl PolicyGateway for InMemoryPolicyGateway {
    fn get_policy(&self, id: i64) -> RangerResult<Policy> {
        let state = self.begin(GatewayCall::Get(id))?;
        let found = state.policies.get(&id).cloned();
        found.ok_or_else(|| not_found(id))
    }

    fn find_policy(&self, service: &str, name: &str) -> RangerResult<Policy> {
        let state = self.begin(GatewayCall::Find {
            service: service.to_string(),
            name: name.to_string(),
        })?;
        // The remote search is a loose match; exactness is applied afterwards.
        let found = state
            .policies
            .values()
            .filter(|p| p.service == service && p.name.contains(name))
            .find(|p| p.name == name)
            .cloned();
        found.ok_or_else(|| RangerError::NotFound {
            what: format!("no policy named '{name}' in service '{service}'"),
        })
    }

    fn create_policy(&self, policy: &Policy) -> RangerResult<Policy> {
        let mut state = self.begin(GatewayCall::Create(policy.name.clone()))?;
        let duplicate = state
            .policies
            .values()
            .any(|p| p.service == policy.service && p.name == policy.name);
        if duplicate {
            return Err(RangerError::ApiError {
                status: 400,
                body: format!(
                    "another policy already exists for name '{}' in service '{}'",
                    policy.name, policy.service
                ),
            });
        }

        let id = state.next_id;
        state.next_id += 1;
        let mut stored = policy.clone();
        stored.id = Some(id);
        state.policies.insert(id, stored.clone());
        Ok(stored)
    }

    fn replace_policy(&self, id: i64, policy: &Policy) -> RangerResult<Policy> {
        let mut state = self.begin(GatewayCall::Replace(id))?;
        let slot = state.policies.get_mut(&id).ok_or_else(|| not_found(id))?;
        let mut stored = policy.clone();
        stored.id = Some(id);
        *slot = stored.clone();
        Ok(stored)
    }

    fn delete_policy(&self, id: i64) -> RangerResult<()> {
        let mut state = self.begin(GatewayCall::Delete(id))?;
        state
            .policies
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(id))
    }
}

fn not_found(id: i64) -> RangerError {
    RangerError::NotFound {
        what: format!("no policy with id {id}"),
    }
}
