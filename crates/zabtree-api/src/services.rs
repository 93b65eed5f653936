// IT service endpoints
//
// `service.get`, `service.create`, `service.deletedependencies` and
// `service.delete`, in the pre-6.0 service model where each service has
// at most one parent and an optional trigger.

use serde_json::json;
use tracing::debug;

use crate::client::ZabbixClient;
use crate::error::Error;
use crate::models::{ServiceCreate, ServiceIds, ServiceRecord};

impl ZabbixClient {
    /// List every service with its parent reference.
    pub async fn list_services(&self) -> Result<Vec<ServiceRecord>, Error> {
        debug!("listing services");
        self.call(
            "service.get",
            json!({
                "output": ["name", "triggerid", "goodsla", "algorithm", "sortorder"],
                "selectParent": ["serviceid"],
            }),
        )
        .await
    }

    /// Create a service and return its assigned id.
    pub async fn create_service(&self, service: &ServiceCreate) -> Result<String, Error> {
        debug!(
            name = %service.name,
            parent = ?service.parent_id,
            trigger = ?service.trigger_id,
            "creating service"
        );
        let result: ServiceIds = self.call("service.create", service).await?;
        first_id("service.create", result)
    }

    /// Remove every dependency edge of a service (both directions).
    pub async fn delete_service_dependencies(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting service dependencies");
        let _: ServiceIds = self.call("service.deletedependencies", [id]).await?;
        Ok(())
    }

    /// Delete a service. The frontend removes its child links as well.
    pub async fn delete_service(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting service");
        let _: ServiceIds = self.call("service.delete", [id]).await?;
        Ok(())
    }
}

fn first_id(method: &str, result: ServiceIds) -> Result<String, Error> {
    result
        .ids
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse {
            method: method.to_owned(),
            message: "no serviceids in result".into(),
        })
}
