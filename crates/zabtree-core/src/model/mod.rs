// ── Domain model ──

pub mod ids;
pub mod service;
pub mod trigger;

pub use ids::{ServiceId, TriggerId};
pub use service::{NewService, ServiceDefaults, ServiceNode, ServiceRef, StatusAlgorithm};
pub use trigger::{
    DesiredLeaf, HostRef, ParseSeverityError, Severity, SkipReason, SkippedLeaf, TriggerQuery,
    TriggerRecord,
};
