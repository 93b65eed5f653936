// ── API-to-domain type conversions ──
//
// Bridges raw `zabtree_api` wire types into canonical domain types. Zabbix
// transports every number as a string; unparseable values become `None`
// rather than errors, since they only feed reporting.

use zabtree_api::{ServiceCreate, ServiceRecord, Trigger};

use crate::model::{
    HostRef, NewService, ServiceId, ServiceNode, Severity, StatusAlgorithm, TriggerId,
    TriggerQuery, TriggerRecord,
};

/// Zabbix uses `"0"` for "no trigger" and "no parent".
fn non_zero(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != "0")
}

impl From<ServiceRecord> for ServiceNode {
    fn from(r: ServiceRecord) -> Self {
        Self {
            id: ServiceId::from(r.id),
            name: r.name,
            parent: non_zero(r.parent).map(ServiceId::from),
            trigger: non_zero(r.trigger_id).map(TriggerId::from),
            sla_target: r.good_sla.and_then(|s| s.trim().parse().ok()),
            algorithm: r
                .algorithm
                .and_then(|s| s.trim().parse().ok())
                .and_then(StatusAlgorithm::from_code),
            sort_order: r.sort_order.and_then(|s| s.trim().parse().ok()),
        }
    }
}

impl From<Trigger> for TriggerRecord {
    fn from(t: Trigger) -> Self {
        Self {
            id: TriggerId::from(t.id),
            description: t.description,
            priority: t
                .priority
                .and_then(|p| p.trim().parse().ok())
                .and_then(Severity::from_code)
                .unwrap_or_default(),
            groups: t.groups.into_iter().map(|g| g.name).collect(),
            // Service-level triggers reference exactly one host.
            host: t.hosts.into_iter().next().map(|h| HostRef {
                host: h.host,
                name: h.name,
            }),
        }
    }
}

impl From<&NewService> for ServiceCreate {
    fn from(s: &NewService) -> Self {
        Self {
            name: s.name.clone(),
            parent_id: s.parent.as_ref().map(|p| p.as_str().to_owned()),
            trigger_id: s.trigger.as_ref().map(|t| t.as_str().to_owned()),
            show_sla: u8::from(s.show_sla),
            sort_order: s.sort_order,
            algorithm: s.algorithm.code(),
            good_sla: s.sla_target,
        }
    }
}

impl From<&TriggerQuery> for zabtree_api::TriggerQuery {
    fn from(q: &TriggerQuery) -> Self {
        Self {
            min_severity: q.min_severity.code(),
            monitored_only: q.monitored_only,
            group: q.group.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use zabtree_api::{HostGroup, TriggerHost};

    use super::*;
    use crate::model::ServiceDefaults;

    #[test]
    fn service_record_normalizes_zero_trigger_and_numbers() {
        let node = ServiceNode::from(ServiceRecord {
            id: "4".into(),
            name: "Linux servers".into(),
            trigger_id: Some("0".into()),
            good_sla: Some("99.9000".into()),
            algorithm: Some("2".into()),
            sort_order: Some("garbage".into()),
            parent: None,
        });
        assert_eq!(node.trigger, None);
        assert_eq!(node.sla_target, Some(99.9));
        assert_eq!(node.algorithm, Some(StatusAlgorithm::AllChildrenProblem));
        assert_eq!(node.sort_order, None);
        assert!(node.is_top_level());
    }

    #[test]
    fn trigger_takes_first_host_and_group_names() {
        let record = TriggerRecord::from(Trigger {
            id: "13491".into(),
            description: "CPU high on {HOST.NAME}".into(),
            priority: Some("4".into()),
            hosts: vec![TriggerHost {
                id: Some("10084".into()),
                host: "web01".into(),
                name: "Web 01".into(),
            }],
            groups: vec![
                HostGroup {
                    id: Some("2".into()),
                    name: "Linux servers".into(),
                },
                HostGroup {
                    id: Some("7".into()),
                    name: "Web".into(),
                },
            ],
        });
        assert_eq!(record.priority, Severity::High);
        assert_eq!(record.groups, vec!["Linux servers", "Web"]);
        assert_eq!(
            record.host,
            Some(HostRef {
                host: "web01".into(),
                name: "Web 01".into()
            })
        );
    }

    #[test]
    fn new_service_maps_to_wire_codes() {
        let svc = NewService::structural("Linux servers", None, &ServiceDefaults::default());
        let wire = ServiceCreate::from(&svc);
        assert_eq!(wire.parent_id, None);
        assert_eq!(wire.show_sla, 1);
        assert_eq!(wire.algorithm, 1);
        assert_eq!(wire.sort_order, 1);
    }
}
