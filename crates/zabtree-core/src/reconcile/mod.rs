// ── Reconciliation engine ──
//
// Brings the remote service tree in line with the trigger inventory:
//
//   [root [> branch [> node]]] > host group > "host - name" > trigger
//
// Every creation is awaited before the next search, and the created node
// is recorded in the cache, so a later leaf sharing a parent finds it.

mod purge;

use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::config::SyncOptions;
use crate::error::{CoreError, Operation};
use crate::inventory::InventoryClient;
use crate::model::{DesiredLeaf, NewService, ServiceId, SkipReason, SkippedLeaf};
use crate::projector::project;
use crate::store::ServiceTreeCache;

pub use purge::PurgeReport;

// ── Reports ─────────────────────────────────────────────────────────

/// Tree level a created node sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NodeLevel {
    Prefix,
    HostGroup,
    Host,
    Trigger,
}

/// A node created during `populate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedNode {
    pub level: NodeLevel,
    pub id: ServiceId,
    pub name: String,
    pub parent: Option<ServiceId>,
}

/// Outcome of one `populate` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Creations in the order they were made.
    pub created: Vec<CreatedNode>,
    pub skipped: Vec<SkippedLeaf>,
    /// Triggers that survived the description filter.
    pub leaves_seen: usize,
}

impl ReconcileReport {
    pub fn created_at(&self, level: NodeLevel) -> usize {
        self.created.iter().filter(|n| n.level == level).count()
    }

    /// Whether the tree was already in sync.
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
    }
}

// ── Reconciler ──────────────────────────────────────────────────────

/// Drives one populate or purge run against an inventory.
///
/// Owns the [`ServiceTreeCache`] for the duration of the run; the engine
/// is the only writer.
pub struct Reconciler<'a, C> {
    client: &'a C,
    options: &'a SyncOptions,
    cache: ServiceTreeCache,
}

impl<'a, C: InventoryClient> Reconciler<'a, C> {
    pub fn new(client: &'a C, options: &'a SyncOptions) -> Self {
        Self {
            client,
            options,
            cache: ServiceTreeCache::new(),
        }
    }

    pub fn cache(&self) -> &ServiceTreeCache {
        &self.cache
    }

    pub fn into_cache(self) -> ServiceTreeCache {
        self.cache
    }

    /// Reload the cache from the inventory.
    pub async fn refresh(&mut self) -> Result<usize, CoreError> {
        self.cache.load(self.client).await
    }

    /// Create every missing node for the current trigger inventory.
    ///
    /// Idempotent: a second run against an unchanged inventory creates
    /// nothing. Stops at the first remote failure; nodes created before it
    /// stay in place.
    pub async fn populate(&mut self) -> Result<ReconcileReport, CoreError> {
        let mut report = ReconcileReport::default();

        let existing = self.refresh().await?;
        info!(existing, "service tree loaded");

        let anchor = self.resolve_prefix(&mut report).await?;

        let options = self.options;
        let triggers = self
            .client
            .list_triggers(&options.trigger_query())
            .await
            .map_err(|e| CoreError::remote(Operation::ListTriggers, None, None, e))?;
        info!(count = triggers.len(), "triggers fetched");

        for item in project(triggers, options.projection()) {
            report.leaves_seen += 1;
            match item {
                Ok(leaf) => self.reconcile_leaf(&leaf, anchor.as_ref(), &mut report).await?,
                Err(skip) => {
                    warn!(trigger = %skip.trigger_id, reason = %skip.reason, "skipping trigger");
                    report.skipped.push(skip);
                }
            }
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped.len(),
            leaves = report.leaves_seen,
            "populate finished"
        );
        Ok(report)
    }

    /// Find or create the root/branch/node chain; returns the deepest node.
    async fn resolve_prefix(
        &mut self,
        report: &mut ReconcileReport,
    ) -> Result<Option<ServiceId>, CoreError> {
        let options = self.options;
        let mut anchor = None;
        for name in options.prefix.names() {
            let id = self
                .ensure_node(name, anchor.as_ref(), NodeLevel::Prefix, report)
                .await?;
            anchor = Some(id);
        }
        if let Some(id) = &anchor {
            debug!(anchor = %id, "prefix resolved");
        }
        Ok(anchor)
    }

    async fn reconcile_leaf(
        &mut self,
        leaf: &DesiredLeaf,
        anchor: Option<&ServiceId>,
        report: &mut ReconcileReport,
    ) -> Result<(), CoreError> {
        let mut group_ids = Vec::with_capacity(leaf.groups.len());
        for group in &leaf.groups {
            let id = self
                .ensure_node(group, anchor, NodeLevel::HostGroup, report)
                .await?;
            group_ids.push(id);
        }

        let Some(host_id) = self.ensure_host(leaf, &group_ids, report).await? else {
            warn!(trigger = %leaf.trigger_id, name = %leaf.trigger_name, "trigger has no host group");
            report.skipped.push(SkippedLeaf {
                trigger_id: leaf.trigger_id.clone(),
                description: leaf.trigger_name.clone(),
                reason: SkipReason::NoGroups,
            });
            return Ok(());
        };

        if let Some(existing) = self.cache.find_child(&leaf.trigger_name, &host_id) {
            if existing.trigger.as_ref() != Some(&leaf.trigger_id) {
                warn!(
                    trigger = %leaf.trigger_id,
                    bound_to = ?existing.trigger,
                    name = %leaf.trigger_name,
                    "leaf name already taken under host"
                );
                report.skipped.push(SkippedLeaf {
                    trigger_id: leaf.trigger_id.clone(),
                    description: leaf.trigger_name.clone(),
                    reason: SkipReason::LeafNameTaken,
                });
            }
            return Ok(());
        }

        let service = NewService::leaf(
            leaf.trigger_name.as_str(),
            host_id,
            leaf.trigger_id.clone(),
            &self.options.service,
        );
        self.create(service, NodeLevel::Trigger, report).await?;
        Ok(())
    }

    /// Host nodes may already sit under any of the trigger's groups; a new
    /// one goes under the first. `None` when there is no group at all.
    async fn ensure_host(
        &mut self,
        leaf: &DesiredLeaf,
        group_ids: &[ServiceId],
        report: &mut ReconcileReport,
    ) -> Result<Option<ServiceId>, CoreError> {
        let existing = group_ids
            .iter()
            .find_map(|group| self.cache.find_child(&leaf.host_node_name, group));
        if let Some(node) = existing {
            return Ok(Some(node.id.clone()));
        }
        let Some(first) = group_ids.first() else {
            return Ok(None);
        };
        let service = NewService::structural(
            leaf.host_node_name.as_str(),
            Some(first.clone()),
            &self.options.service,
        );
        self.create(service, NodeLevel::Host, report).await.map(Some)
    }

    /// Structural node `name` under `parent` (top level when `None`).
    async fn ensure_node(
        &mut self,
        name: &str,
        parent: Option<&ServiceId>,
        level: NodeLevel,
        report: &mut ReconcileReport,
    ) -> Result<ServiceId, CoreError> {
        let existing = match parent {
            Some(p) => self.cache.find_child(name, p),
            None => self.cache.find_top_level(name),
        };
        if let Some(node) = existing {
            return Ok(node.id.clone());
        }
        let service = NewService::structural(name, parent.cloned(), &self.options.service);
        self.create(service, level, report).await
    }

    async fn create(
        &mut self,
        service: NewService,
        level: NodeLevel,
        report: &mut ReconcileReport,
    ) -> Result<ServiceId, CoreError> {
        let id = self.client.create_service(&service).await.map_err(|e| {
            CoreError::remote(
                Operation::CreateService,
                Some(service.name.as_str()),
                service.parent.as_ref().map(ServiceId::as_str),
                e,
            )
        })?;

        info!(%id, name = %service.name, parent = ?service.parent, %level, "created service");
        report.created.push(CreatedNode {
            level,
            id: id.clone(),
            name: service.name.clone(),
            parent: service.parent.clone(),
        });
        self.cache.record(service.into_node(id.clone()));
        Ok(id)
    }
}
