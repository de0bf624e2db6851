//! # ranger-reconcile
//!
//! The reconciliation lifecycle for declared Ranger policies.
//!
//! This crate provides:
//! - [`Reconciler`], which runs Create / Read / Update / Delete / Import
//!   through a [`PolicyGateway`](ranger_gateway::PolicyGateway)
//! - [`PolicyQuery`] and `Reconciler::lookup` for read-only lookups
//! - [`plan_change`], which decides between create, in-place update,
//!   replacement and no-op
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ranger_gateway::{GatewayConfig, HttpPolicyGateway};
//! use ranger_reconcile::Reconciler;
//!
//! let gateway = HttpPolicyGateway::from_config(&config)?;
//! let reconciler = Reconciler::new(Box::new(gateway));
//! let state = reconciler.create(plan)?;
//! ```

pub mod lookup;
pub mod plan;
pub mod reconciler;

pub use lookup::PolicyQuery;
pub use plan::{in_agreement, plan_change};
pub use reconciler::{Converged, Reconciler};

// ── Tests ─────────────────────────────────────────────────────────────────────
