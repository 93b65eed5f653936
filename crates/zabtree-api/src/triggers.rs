use tracing::debug;

use crate::client::ZabbixClient;
use crate::error::Error;
use crate::models::{Trigger, TriggerGetParams, TriggerQuery};

impl ZabbixClient {
    /// Fetch triggers at or above `min_severity`, with their hosts and
    /// host groups.
    ///
    /// `trigger.get` with `selectHosts: [host, name]` and
    /// `selectGroups: [name]`; `group` narrows to a single host group.
    pub async fn list_triggers(&self, query: &TriggerQuery) -> Result<Vec<Trigger>, Error> {
        debug!(
            min_severity = query.min_severity,
            monitored_only = query.monitored_only,
            group = ?query.group,
            "listing triggers"
        );
        let params = TriggerGetParams {
            min_severity: query.min_severity,
            monitored: query.monitored_only,
            output: ["triggerid", "description", "priority"],
            select_hosts: ["host", "name"],
            select_groups: ["name"],
            group: query.group.as_deref(),
        };
        self.call("trigger.get", params).await
    }
}
