//! Results handed back to the engine by the reconciler.

use serde::{Deserialize, Serialize};

use crate::declared::DeclaredPolicy;

/// What a Read found.
///
/// `Removed` is not an error: the engine drops the policy from its state and
/// plans a fresh create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadOutcome {
    /// The policy exists; this is the full refreshed record.
    Present(DeclaredPolicy),
    /// The policy has no id or the remote service no longer has it.
    Removed,
}

impl ReadOutcome {
    pub fn into_present(self) -> Option<DeclaredPolicy> {
        match self {
            ReadOutcome::Present(policy) => Some(policy),
            ReadOutcome::Removed => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        matches!(self, ReadOutcome::Removed)
    }
}

/// How a declared policy must change to match the desired one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlannedChange {
    /// Nothing exists remotely yet.
    Create,
    /// Mutable fields differ; update in place, keeping the id.
    Update,
    /// `service` differs; delete the old policy and create a new one.
    Replace,
    /// Desired and current state already agree.
    NoOp,
}

impl std::fmt::Display for PlannedChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlannedChange::Create => "create",
            PlannedChange::Update => "update",
            PlannedChange::Replace => "replace",
            PlannedChange::NoOp => "no-op",
        };
        f.pad(label)
    }
}
