//! Service-tree reconciliation for Zabbix IT services.
//!
//! Builds and maintains a four-level service tree
//! (`[prefix] > host group > host > trigger`) from the trigger inventory:
//!
//! - **[`ServiceTreeCache`]**: insertion-ordered snapshot of the remote tree
//!   with scoped searches ([`find_child`](ServiceTreeCache::find_child),
//!   [`find_top_level`](ServiceTreeCache::find_top_level)) and the relaxed
//!   [`find_by_name`](ServiceTreeCache::find_by_name).
//!
//! - **[`projector`]**: maps triggers to [`DesiredLeaf`]s, expanding
//!   description macros to the host name.
//!
//! - **[`Reconciler`]**: `populate()` creates exactly the missing nodes;
//!   `purge()` empties the tree top-down with a bounded retry loop.
//!
//! - **[`Controller`]**: session lifecycle around the JSON-RPC client, with
//!   [`Controller::oneshot()`] for single CLI invocations.
//!
//! The engine reaches Zabbix only through [`InventoryClient`].

pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod inventory;
pub mod model;
pub mod projector;
pub mod reconcile;
pub mod store;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    AuthCredentials, ConnectionConfig, ProjectionOptions, SyncOptions, TlsVerification, TreePrefix,
};
pub use controller::Controller;
pub use error::{CoreError, Operation};
pub use inventory::InventoryClient;
pub use reconcile::{CreatedNode, NodeLevel, PurgeReport, ReconcileReport, Reconciler};
pub use store::ServiceTreeCache;

pub use model::{
    DesiredLeaf, HostRef, NewService, ServiceDefaults, ServiceId, ServiceNode, ServiceRef, Severity,
    SkipReason, SkippedLeaf, StatusAlgorithm, TriggerId, TriggerQuery, TriggerRecord,
};
