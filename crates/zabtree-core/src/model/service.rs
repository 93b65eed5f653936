// ── Service node domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ids::{ServiceId, TriggerId};

/// How a service derives its status from its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum StatusAlgorithm {
    /// Status is not calculated.
    DoNotCalculate,
    /// Problem if at least one child has a problem.
    #[default]
    AnyChildProblem,
    /// Problem if all children have problems.
    AllChildrenProblem,
}

impl StatusAlgorithm {
    pub fn code(self) -> u8 {
        match self {
            Self::DoNotCalculate => 0,
            Self::AnyChildProblem => 1,
            Self::AllChildrenProblem => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::DoNotCalculate),
            1 => Some(Self::AnyChildProblem),
            2 => Some(Self::AllChildrenProblem),
            _ => None,
        }
    }
}

/// A node of the IT-service tree as known to the remote system.
///
/// Matching identity is `(name, parent)`; `id` is only used for linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNode {
    pub id: ServiceId,
    pub name: String,
    /// `None` for top-level nodes.
    pub parent: Option<ServiceId>,
    /// `None` for structural nodes.
    pub trigger: Option<TriggerId>,
    pub sla_target: Option<f64>,
    pub algorithm: Option<StatusAlgorithm>,
    pub sort_order: Option<u32>,
}

impl ServiceNode {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_structural(&self) -> bool {
        self.trigger.is_none()
    }
}

/// Per-node settings applied to every service the engine creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefaults {
    /// Acceptable SLA in percent.
    pub sla_target: f64,
    pub sort_order: u32,
    pub algorithm: StatusAlgorithm,
    pub show_sla: bool,
}

impl Default for ServiceDefaults {
    fn default() -> Self {
        Self {
            sla_target: 99.9,
            sort_order: 1,
            algorithm: StatusAlgorithm::AnyChildProblem,
            show_sla: true,
        }
    }
}

/// A service creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewService {
    pub name: String,
    pub parent: Option<ServiceId>,
    pub trigger: Option<TriggerId>,
    pub sla_target: f64,
    pub sort_order: u32,
    pub algorithm: StatusAlgorithm,
    pub show_sla: bool,
}

impl NewService {
    /// A grouping node without a trigger.
    pub fn structural(
        name: impl Into<String>,
        parent: Option<ServiceId>,
        defaults: &ServiceDefaults,
    ) -> Self {
        Self {
            name: name.into(),
            parent,
            trigger: None,
            sla_target: defaults.sla_target,
            sort_order: defaults.sort_order,
            algorithm: defaults.algorithm,
            show_sla: defaults.show_sla,
        }
    }

    /// A leaf bound to a trigger.
    pub fn leaf(
        name: impl Into<String>,
        parent: ServiceId,
        trigger: TriggerId,
        defaults: &ServiceDefaults,
    ) -> Self {
        Self {
            trigger: Some(trigger),
            ..Self::structural(name, Some(parent), defaults)
        }
    }

    /// The node this request becomes once the remote system assigns `id`.
    pub fn into_node(self, id: ServiceId) -> ServiceNode {
        ServiceNode {
            id,
            name: self.name,
            parent: self.parent,
            trigger: self.trigger,
            sla_target: Some(self.sla_target),
            algorithm: Some(self.algorithm),
            sort_order: Some(self.sort_order),
        }
    }
}

/// Minimal `{ id, name }` reference used in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: ServiceId,
    pub name: String,
}

impl From<&ServiceNode> for ServiceRef {
    fn from(node: &ServiceNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn leaf_inherits_defaults_and_carries_trigger() {
        let defaults = ServiceDefaults {
            sla_target: 99.5,
            ..ServiceDefaults::default()
        };
        let svc = NewService::leaf("CPU high", ServiceId::from(2), TriggerId::from(9), &defaults);
        assert_eq!(svc.parent, Some(ServiceId::from(2)));
        assert_eq!(svc.trigger, Some(TriggerId::from(9)));
        assert!((svc.sla_target - 99.5).abs() < f64::EPSILON);

        let node = svc.into_node(ServiceId::from(10));
        assert!(!node.is_structural());
        assert!(!node.is_top_level());
    }

    #[test]
    fn algorithm_names_and_codes() {
        assert_eq!(
            StatusAlgorithm::from_str("all-children-problem").ok(),
            Some(StatusAlgorithm::AllChildrenProblem)
        );
        assert_eq!(StatusAlgorithm::AnyChildProblem.code(), 1);
        assert_eq!(StatusAlgorithm::from_code(7), None);
    }
}
