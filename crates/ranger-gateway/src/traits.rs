//! The gateway trait: the boundary between reconciliation and the network.
//!
//! Each method issues exactly one request to the remote policy service and
//! maps the outcome to a wire value or a typed `RangerError`:
//!
//! - 404 → `NotFound`
//! - any other unexpected status → `ApiError { status }`
//! - no HTTP response at all → `ApiUnreachable`
//! - an undecodable body → `DecodeError`
//!
//! Implementations never retry. A caller that needs resilience wraps the
//! gateway, it does not push retries into translation or reconciliation.

use ranger_contracts::{error::RangerResult, wire::Policy};

/// Remote policy storage addressed by id, or by service and exact name.
pub trait PolicyGateway: Send + Sync {
    /// Fetch one policy by its id.
    fn get_policy(&self, id: i64) -> RangerResult<Policy>;

    /// Find the policy in `service` whose name is exactly `name`.
    ///
    /// The remote search matches names loosely; implementations must filter
    /// for an exact match and return `NotFound` when there is none.
    fn find_policy(&self, service: &str, name: &str) -> RangerResult<Policy>;

    /// Create `policy` and return the stored record, including its new id.
    fn create_policy(&self, policy: &Policy) -> RangerResult<Policy>;

    /// Replace the policy stored under `id` with `policy`.
    fn replace_policy(&self, id: i64, policy: &Policy) -> RangerResult<Policy>;

    /// Delete the policy stored under `id`.
    fn delete_policy(&self, id: i64) -> RangerResult<()>;
}
