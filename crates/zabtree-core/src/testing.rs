// ── In-memory inventory for engine tests ──

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::CoreError;
use crate::inventory::InventoryClient;
use crate::model::{
    HostRef, NewService, ServiceId, ServiceNode, Severity, TriggerId, TriggerQuery, TriggerRecord,
};

/// How `delete_service` treats the children of the deleted node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeleteMode {
    /// The whole subtree goes.
    Cascade,
    /// Children stay and become top-level.
    Orphan,
    /// Deletes are accepted and do nothing.
    Ignore,
}

#[derive(Debug, Default)]
struct State {
    services: Vec<ServiceNode>,
    next_id: u64,
    create_calls: usize,
    delete_calls: Vec<String>,
}

pub(crate) struct MemoryInventory {
    triggers: Vec<TriggerRecord>,
    delete_mode: DeleteMode,
    fail_on_create: Option<String>,
    state: Mutex<State>,
}

impl MemoryInventory {
    pub(crate) fn new(triggers: Vec<TriggerRecord>) -> Self {
        Self {
            triggers,
            delete_mode: DeleteMode::Cascade,
            fail_on_create: None,
            state: Mutex::new(State {
                next_id: 1000,
                ..State::default()
            }),
        }
    }

    pub(crate) fn with_services(self, services: Vec<ServiceNode>) -> Self {
        self.state().services = services;
        self
    }

    pub(crate) fn delete_mode(mut self, mode: DeleteMode) -> Self {
        self.delete_mode = mode;
        self
    }

    pub(crate) fn fail_on_create(mut self, name: &str) -> Self {
        self.fail_on_create = Some(name.to_owned());
        self
    }

    pub(crate) fn services(&self) -> Vec<ServiceNode> {
        self.state().services.clone()
    }

    pub(crate) fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    pub(crate) fn delete_calls(&self) -> Vec<String> {
        self.state().delete_calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn subtree(services: &[ServiceNode], root: &ServiceId) -> Vec<ServiceId> {
    let mut doomed = vec![root.clone()];
    let mut i = 0;
    while let Some(id) = doomed.get(i).cloned() {
        doomed.extend(
            services
                .iter()
                .filter(|n| n.parent.as_ref() == Some(&id))
                .map(|n| n.id.clone()),
        );
        i += 1;
    }
    doomed
}

impl InventoryClient for MemoryInventory {
    async fn list_triggers(&self, query: &TriggerQuery) -> Result<Vec<TriggerRecord>, CoreError> {
        Ok(self
            .triggers
            .iter()
            .filter(|t| t.priority >= query.min_severity)
            .filter(|t| {
                query
                    .group
                    .as_ref()
                    .is_none_or(|g| t.groups.iter().any(|tg| tg == g))
            })
            .cloned()
            .collect())
    }

    async fn list_services(&self) -> Result<Vec<ServiceNode>, CoreError> {
        Ok(self.services())
    }

    async fn create_service(&self, service: &NewService) -> Result<ServiceId, CoreError> {
        if self.fail_on_create.as_deref() == Some(service.name.as_str()) {
            return Err(CoreError::Api {
                message: "service.create: Invalid params.".into(),
                code: Some(-32602),
                status: None,
            });
        }
        let mut state = self.state();
        state.create_calls += 1;
        state.next_id += 1;
        let id = ServiceId::from(state.next_id);
        state.services.push(service.clone().into_node(id.clone()));
        Ok(id)
    }

    async fn delete_service_dependencies(&self, id: &ServiceId) -> Result<(), CoreError> {
        self.state().delete_calls.push(format!("deletedependencies {id}"));
        Ok(())
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<(), CoreError> {
        let mut state = self.state();
        state.delete_calls.push(format!("delete {id}"));
        match self.delete_mode {
            DeleteMode::Cascade => {
                let doomed = subtree(&state.services, id);
                state.services.retain(|n| !doomed.contains(&n.id));
            }
            DeleteMode::Orphan => {
                state.services.retain(|n| &n.id != id);
                for node in &mut state.services {
                    if node.parent.as_ref() == Some(id) {
                        node.parent = None;
                    }
                }
            }
            DeleteMode::Ignore => {}
        }
        Ok(())
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

pub(crate) fn trigger(
    id: u64,
    description: &str,
    host: Option<(&str, &str)>,
    groups: &[&str],
) -> TriggerRecord {
    TriggerRecord {
        id: TriggerId::from(id),
        description: description.into(),
        priority: Severity::Disaster,
        groups: groups.iter().map(|g| (*g).to_owned()).collect(),
        host: host.map(|(h, n)| HostRef {
            host: h.into(),
            name: n.into(),
        }),
    }
}

pub(crate) fn service(
    id: u64,
    name: &str,
    parent: Option<u64>,
    trigger: Option<u64>,
) -> ServiceNode {
    ServiceNode {
        id: ServiceId::from(id),
        name: name.into(),
        parent: parent.map(ServiceId::from),
        trigger: trigger.map(TriggerId::from),
        sla_target: None,
        algorithm: None,
        sort_order: None,
    }
}
