//! The reconciler: the CRUD lifecycle that converges a remote Ranger policy
//! onto its declared state.
//!
//! Every operation is one translate step plus at most one gateway call
//! (Replace is Delete followed by Create):
//!
//!   Create  plan → wire → POST          → plan + returned id
//!   Read    id   → GET                  → refreshed record | Removed
//!   Update  plan → wire + id → PUT      → plan
//!   Delete  id   → DELETE               → ()
//!   Import  raw id                      → state holding only the id
//!
//! State handed back after Create and Update is the plan, not the server's
//! echo, so server-side normalization never shows up as a diff. Read is the
//! only operation that copies remote values into state.

use tracing::{debug, info, warn};

use ranger_contracts::{
    declared::{parse_policy_id, DeclaredPolicy},
    error::{RangerError, RangerResult},
    outcome::{PlannedChange, ReadOutcome},
};
use ranger_gateway::PolicyGateway;
use ranger_translate::{declared_to_wire, wire_to_declared};

use crate::plan::plan_change;

/// Result of bringing one declared policy in line with the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converged {
    /// What was done.
    pub change: PlannedChange,
    /// The state to record for this policy afterwards.
    pub state: DeclaredPolicy,
}

/// Drives policy lifecycle operations through a `PolicyGateway`.
///
/// Holds no state between calls; the gateway is the only shared resource.
pub struct Reconciler {
    gateway: Box<dyn PolicyGateway>,
}

impl Reconciler {
    pub fn new(gateway: Box<dyn PolicyGateway>) -> Self {
        Self { gateway }
    }

    pub(crate) fn gateway(&self) -> &dyn PolicyGateway {
        self.gateway.as_ref()
    }

    /// Create the planned policy and return the plan with its new id.
    ///
    /// # Errors
    ///
    /// `ValidationError` if the plan already carries an id or fails
    /// translation; any gateway failure, including `NotFound`, is fatal.
    pub fn create(&self, plan: DeclaredPolicy) -> RangerResult<DeclaredPolicy> {
        self.try_create(plan).map_err(|e| e.during("create"))
    }

    fn try_create(&self, mut plan: DeclaredPolicy) -> RangerResult<DeclaredPolicy> {
        if let Some(id) = &plan.id {
            return Err(RangerError::ValidationError {
                reason: format!("policy '{}' already has id {id}; create requires none", plan.name),
            });
        }

        let wire = declared_to_wire(&plan)?;
        let created = self.gateway.create_policy(&wire)?;
        let id = created.id.ok_or_else(|| RangerError::DecodeError {
            reason: format!("created policy '{}' came back without an id", plan.name),
        })?;

        info!(id, name = %plan.name, service = %plan.service, "created Ranger policy");
        plan.id = Some(id.to_string());
        Ok(plan)
    }

    /// Refresh `state` from the remote service.
    ///
    /// Without an id the policy is logically absent and no request is made.
    /// A 404 means the policy was deleted out of band; both cases return
    /// `ReadOutcome::Removed`. On error the caller keeps its prior state.
    pub fn read(&self, state: &DeclaredPolicy) -> RangerResult<ReadOutcome> {
        let Some(raw_id) = state.id.as_deref() else {
            debug!(name = %state.name, "policy has no id; treating as absent");
            return Ok(ReadOutcome::Removed);
        };
        let id = parse_policy_id(raw_id).map_err(|e| e.during("read"))?;

        match self.gateway.get_policy(id) {
            Ok(policy) => Ok(ReadOutcome::Present(wire_to_declared(&policy))),
            Err(RangerError::NotFound { .. }) => {
                warn!(id, name = %state.name, "Ranger policy no longer exists; removing from state");
                Ok(ReadOutcome::Removed)
            }
            Err(e) => Err(e.during("read")),
        }
    }

    /// Replace the remote policy with `plan`, keeping its id.
    ///
    /// `prior` is the recorded state. A `service` change cannot be applied in
    /// place and is rejected; plan it as a replacement instead.
    pub fn update(&self, prior: &DeclaredPolicy, plan: DeclaredPolicy) -> RangerResult<DeclaredPolicy> {
        self.try_update(prior, plan).map_err(|e| e.during("update"))
    }

    fn try_update(&self, prior: &DeclaredPolicy, mut plan: DeclaredPolicy) -> RangerResult<DeclaredPolicy> {
        if prior.service != plan.service {
            return Err(RangerError::ValidationError {
                reason: format!(
                    "policy '{}' moves from service '{}' to '{}'; service cannot change in place, the policy must be replaced",
                    plan.name, prior.service, plan.service
                ),
            });
        }

        if plan.id.is_none() {
            plan.id = prior.id.clone();
        }
        let id = plan.numeric_id()?;

        let mut wire = declared_to_wire(&plan)?;
        wire.id = Some(id);
        let updated = self.gateway.replace_policy(id, &wire)?;

        info!(id, name = %updated.name, "updated Ranger policy");
        Ok(plan)
    }

    /// Delete the remote policy recorded in `state`.
    ///
    /// On error the caller keeps `state` and may retry.
    pub fn delete(&self, state: &DeclaredPolicy) -> RangerResult<()> {
        let id = state.numeric_id().map_err(|e| e.during("delete"))?;
        self.gateway.delete_policy(id).map_err(|e| e.during("delete"))?;
        info!(id, name = %state.name, "deleted Ranger policy");
        Ok(())
    }

    /// Start tracking an existing remote policy by id.
    ///
    /// No request is made and the id is not checked here: the Read that
    /// follows an import establishes whether the policy exists.
    pub fn import(&self, id: &str) -> DeclaredPolicy {
        info!(id = %id, "importing Ranger policy");
        DeclaredPolicy {
            id: Some(id.trim().to_string()),
            ..DeclaredPolicy::new("", "")
        }
    }

    /// Bring the remote policy in line with `desired`.
    ///
    /// `desired` is validated before planning, so an invalid plan fails even
    /// when it would otherwise be a no-op.
    ///
    /// `current` is the freshly read state (`None` if absent). Replace is
    /// delete-then-create; if the create fails after the delete succeeded the
    /// error is returned and the policy is absent remotely.
    pub fn converge(
        &self,
        current: Option<&DeclaredPolicy>,
        mut desired: DeclaredPolicy,
    ) -> RangerResult<Converged> {
        declared_to_wire(&desired).map_err(|e| e.during("converge"))?;

        let change = plan_change(current, &desired);
        debug!(name = %desired.name, change = %change, "planned change");

        let state = match (change, current) {
            (PlannedChange::Update, Some(current)) => self.update(current, desired)?,
            (PlannedChange::Replace, Some(current)) => {
                self.delete(current)?;
                desired.id = None;
                self.create(desired)?
            }
            (PlannedChange::NoOp, Some(current)) => {
                desired.id = current.id.clone();
                desired
            }
            _ => {
                desired.id = None;
                self.create(desired)?
            }
        };

        Ok(Converged { change, state })
    }
}
