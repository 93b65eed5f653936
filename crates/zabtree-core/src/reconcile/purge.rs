// ── Purge driver ──
//
// Empties the service tree top-down. Each cycle reloads the tree and
// deletes every top-level node; deleting a parent is expected to take its
// subtree along, otherwise the orphans surface as top-level nodes in the
// next cycle. Cycles that remove nothing are counted and bounded.

use serde::Serialize;
use tracing::{info, warn};

use super::Reconciler;
use crate::error::{CoreError, Operation};
use crate::inventory::InventoryClient;
use crate::model::ServiceRef;

/// Outcome of a purge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Delete cycles performed.
    pub cycles: u32,
    /// Top-level nodes deleted, in deletion order.
    pub deleted: Vec<ServiceRef>,
}

impl<C: InventoryClient> Reconciler<'_, C> {
    /// Delete every service node.
    ///
    /// Fails with [`CoreError::PurgeStalled`] after `max_stalled_cycles`
    /// consecutive cycles that leave the node count unchanged.
    pub async fn purge(&mut self) -> Result<PurgeReport, CoreError> {
        let max_stalled = self.options.max_stalled_cycles.max(1);
        let mut report = PurgeReport::default();
        let mut previous: Option<usize> = None;
        let mut stalled = 0;

        loop {
            let remaining = self.refresh().await?;
            if remaining == 0 {
                info!(cycles = report.cycles, deleted = report.deleted.len(), "service tree empty");
                return Ok(report);
            }

            if previous.is_some_and(|before| remaining >= before) {
                stalled += 1;
                warn!(remaining, stalled, max_stalled, "purge cycle made no progress");
                if stalled >= max_stalled {
                    return Err(CoreError::PurgeStalled {
                        cycles: report.cycles,
                        remaining,
                    });
                }
            } else {
                stalled = 0;
            }
            previous = Some(remaining);

            report.cycles += 1;
            let roots: Vec<ServiceRef> = self.cache.top_level().map(ServiceRef::from).collect();
            info!(cycle = report.cycles, remaining, roots = roots.len(), "purge cycle");

            for root in roots {
                self.delete_root(&root).await?;
                report.deleted.push(root);
            }
        }
    }

    async fn delete_root(&self, root: &ServiceRef) -> Result<(), CoreError> {
        let name = Some(root.name.as_str());
        self.client
            .delete_service_dependencies(&root.id)
            .await
            .map_err(|e| CoreError::remote(Operation::DeleteDependencies, name, None, e))?;
        self.client
            .delete_service(&root.id)
            .await
            .map_err(|e| CoreError::remote(Operation::DeleteService, name, None, e))?;
        info!(id = %root.id, name = %root.name, "deleted service");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SyncOptions;
    use crate::model::ServiceNode;
    use crate::testing::{DeleteMode, MemoryInventory, service, trigger};

    fn chain(depth: u64) -> Vec<ServiceNode> {
        (1..=depth)
            .map(|i| {
                let parent = (i > 1).then_some(i - 1);
                service(i, &format!("level {i}"), parent, None)
            })
            .collect()
    }

    #[tokio::test]
    async fn cascading_delete_empties_in_one_cycle() {
        let inv = MemoryInventory::new(vec![trigger(
            1,
            "CPU high on {HOST.NAME}",
            Some(("web01", "Web 01")),
            &["Linux servers", "Web"],
        )]);
        let options = SyncOptions::default();
        Reconciler::new(&inv, &options).populate().await.unwrap();

        let report = Reconciler::new(&inv, &options).purge().await.unwrap();

        assert_eq!(report.cycles, 1);
        let names: Vec<&str> = report.deleted.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Linux servers", "Web"]);
        assert!(inv.services().is_empty());
    }

    #[tokio::test]
    async fn dependencies_are_removed_before_the_node() {
        let inv = MemoryInventory::new(vec![]).with_services(chain(1));
        let options = SyncOptions::default();
        Reconciler::new(&inv, &options).purge().await.unwrap();
        assert_eq!(inv.delete_calls(), vec!["deletedependencies 1", "delete 1"]);
    }

    #[tokio::test]
    async fn orphaning_delete_takes_one_cycle_per_level() {
        let inv = MemoryInventory::new(vec![])
            .with_services(chain(4))
            .delete_mode(DeleteMode::Orphan);
        let options = SyncOptions::default();

        let report = Reconciler::new(&inv, &options).purge().await.unwrap();

        assert_eq!(report.cycles, 4);
        assert_eq!(report.deleted.len(), 4);
        assert!(inv.services().is_empty());
    }

    #[tokio::test]
    async fn empty_tree_needs_no_cycles() {
        let inv = MemoryInventory::new(vec![]);
        let options = SyncOptions::default();
        let report = Reconciler::new(&inv, &options).purge().await.unwrap();
        assert_eq!(report, PurgeReport::default());
    }

    #[tokio::test]
    async fn ignored_deletes_fail_after_bound() {
        let inv = MemoryInventory::new(vec![])
            .with_services(chain(3))
            .delete_mode(DeleteMode::Ignore);
        let options = SyncOptions {
            max_stalled_cycles: 2,
            ..SyncOptions::default()
        };

        let err = Reconciler::new(&inv, &options).purge().await.unwrap_err();

        match err {
            CoreError::PurgeStalled { cycles, remaining } => {
                assert_eq!(cycles, 2);
                assert_eq!(remaining, 3);
            }
            other => panic!("expected PurgeStalled, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn tree_without_top_level_nodes_stalls() {
        let inv = MemoryInventory::new(vec![]).with_services(vec![
            service(1, "a", Some(2), None),
            service(2, "b", Some(1), None),
        ]);
        let options = SyncOptions::default();
        let err = Reconciler::new(&inv, &options).purge().await.unwrap_err();
        assert!(
            matches!(err, CoreError::PurgeStalled { remaining: 2, .. }),
            "got {err:?}"
        );
    }
}
