// ── Inventory capability set ──
//
// The engine talks to Zabbix only through this trait, so it can be driven
// by the real JSON-RPC client or by an in-memory fake in tests.

use std::future::Future;

use tracing::debug;
use zabtree_api::{ServiceCreate, ZabbixClient};

use crate::error::CoreError;
use crate::model::{NewService, ServiceId, ServiceNode, TriggerQuery, TriggerRecord};

/// Remote operations the reconciliation engine needs.
pub trait InventoryClient {
    fn list_triggers(
        &self,
        query: &TriggerQuery,
    ) -> impl Future<Output = Result<Vec<TriggerRecord>, CoreError>> + Send;

    /// Every service node, in the order the server returns them.
    fn list_services(&self) -> impl Future<Output = Result<Vec<ServiceNode>, CoreError>> + Send;

    fn create_service(
        &self,
        service: &NewService,
    ) -> impl Future<Output = Result<ServiceId, CoreError>> + Send;

    fn delete_service_dependencies(
        &self,
        id: &ServiceId,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    fn delete_service(&self, id: &ServiceId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl InventoryClient for ZabbixClient {
    async fn list_triggers(&self, query: &TriggerQuery) -> Result<Vec<TriggerRecord>, CoreError> {
        let raw = ZabbixClient::list_triggers(self, &query.into()).await?;
        debug!(count = raw.len(), "fetched triggers");
        Ok(raw.into_iter().map(TriggerRecord::from).collect())
    }

    async fn list_services(&self) -> Result<Vec<ServiceNode>, CoreError> {
        let raw = ZabbixClient::list_services(self).await?;
        debug!(count = raw.len(), "fetched services");
        Ok(raw.into_iter().map(ServiceNode::from).collect())
    }

    async fn create_service(&self, service: &NewService) -> Result<ServiceId, CoreError> {
        let id = ZabbixClient::create_service(self, &ServiceCreate::from(service)).await?;
        Ok(ServiceId::from(id))
    }

    async fn delete_service_dependencies(&self, id: &ServiceId) -> Result<(), CoreError> {
        ZabbixClient::delete_service_dependencies(self, id.as_str()).await?;
        Ok(())
    }

    async fn delete_service(&self, id: &ServiceId) -> Result<(), CoreError> {
        ZabbixClient::delete_service(self, id.as_str()).await?;
        Ok(())
    }
}
