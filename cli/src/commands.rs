//! Engine commands over a `StateDocument`.
//!
//! Each command updates the document in place as it goes, so the caller can
//! persist progress even when a later policy fails.

use tracing::{info, warn};

use ranger_contracts::{
    declared::DeclaredPolicy,
    error::{RangerError, RangerResult},
    outcome::ReadOutcome,
};
use ranger_reconcile::{Converged, PolicyQuery, Reconciler};

use crate::state::StateDocument;

/// Refresh, plan and converge every declared policy.
///
/// Stops at the first failure; entries converged before it keep their new
/// state in `doc`.
pub fn apply(reconciler: &Reconciler, doc: &mut StateDocument) -> RangerResult<Vec<Converged>> {
    let mut results = Vec::with_capacity(doc.policies.len());
    for entry in doc.policies.iter_mut() {
        let current = match reconciler.read(entry)? {
            ReadOutcome::Present(refreshed) => Some(refreshed),
            ReadOutcome::Removed => None,
        };
        let converged = reconciler.converge(current.as_ref(), entry.clone())?;
        info!(name = %converged.state.name, change = %converged.change, "converged policy");
        *entry = converged.state.clone();
        results.push(converged);
    }
    Ok(results)
}

/// Replace each tracked entry with its remote record, dropping entries whose
/// policy no longer exists. Entries not yet created are left alone.
///
/// Returns the number of entries dropped.
pub fn refresh(reconciler: &Reconciler, doc: &mut StateDocument) -> RangerResult<usize> {
    let mut refreshed = Vec::with_capacity(doc.policies.len());
    let mut dropped = 0;
    for entry in &doc.policies {
        if entry.id.is_none() {
            refreshed.push(entry.clone());
            continue;
        }
        match reconciler.read(entry)? {
            ReadOutcome::Present(policy) => refreshed.push(policy),
            ReadOutcome::Removed => dropped += 1,
        }
    }
    doc.policies = refreshed;
    Ok(dropped)
}

/// Delete every tracked policy and drop it from the document.
///
/// On failure the failed entry and everything after it stay in `doc`.
pub fn destroy(reconciler: &Reconciler, doc: &mut StateDocument) -> RangerResult<usize> {
    let mut remaining = Vec::new();
    let mut deleted = 0;
    let mut failure = None;

    for entry in std::mem::take(&mut doc.policies) {
        if failure.is_some() || entry.id.is_none() {
            remaining.push(entry);
            continue;
        }
        match reconciler.delete(&entry) {
            Ok(()) => deleted += 1,
            Err(e) => {
                warn!(name = %entry.name, error = %e, "delete failed; keeping policy in state");
                remaining.push(entry);
                failure = Some(e);
            }
        }
    }

    doc.policies = remaining;
    match failure {
        Some(e) => Err(e),
        None => Ok(deleted),
    }
}

/// Start tracking the remote policy `id` and fill in its record.
pub fn import(reconciler: &Reconciler, doc: &mut StateDocument, id: &str) -> RangerResult<DeclaredPolicy> {
    let imported = reconciler.import(id);
    let raw_id = imported.id.as_deref().unwrap_or(id);
    if doc.tracks(raw_id) {
        return Err(RangerError::ValidationError {
            reason: format!("policy {raw_id} is already tracked"),
        });
    }

    match reconciler.read(&imported).map_err(|e| e.during("import"))? {
        ReadOutcome::Present(policy) => {
            doc.policies.push(policy.clone());
            Ok(policy)
        }
        ReadOutcome::Removed => Err(RangerError::NotFound {
            what: format!("no policy with id {raw_id} to import"),
        }
        .during("import")),
    }
}

/// Look up one policy without touching any state.
pub fn show(
    reconciler: &Reconciler,
    id: Option<&str>,
    service: Option<&str>,
    name: Option<&str>,
) -> RangerResult<DeclaredPolicy> {
    let query = PolicyQuery::from_parts(id, service, name)?;
    reconciler.lookup(&query)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
