// ── Cache refresh from the inventory ──

use tracing::debug;

use super::ServiceTreeCache;
use crate::error::{CoreError, Operation};
use crate::inventory::InventoryClient;

impl ServiceTreeCache {
    /// Replace the cache with the full remote node list.
    ///
    /// Returns the number of nodes loaded.
    pub async fn load<C: InventoryClient>(&mut self, client: &C) -> Result<usize, CoreError> {
        let nodes = client
            .list_services()
            .await
            .map_err(|e| CoreError::remote(Operation::ListServices, None, None, e))?;
        debug!(count = nodes.len(), "loaded service tree");
        self.replace(nodes);
        Ok(self.len())
    }
}
