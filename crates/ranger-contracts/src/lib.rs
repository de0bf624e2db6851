//! # ranger-contracts
//!
//! Shared types for rangersync: the Ranger wire model, the declared policy
//! model, reconciler outcomes and the error type.
//!
//! Every other crate in the workspace imports from here. No business logic
//! lives in this crate, only data definitions and error types.

pub mod declared;
pub mod error;
pub mod outcome;
pub mod wire;
