// Zabbix JSON-RPC wire types.
//
// Field names follow the API (`serviceid`, `goodsla`, ...) via serde
// renames. Numeric values arrive as strings; parsing into domain types
// happens in `zabtree-core`.

use serde::{Deserialize, Deserializer, Serialize};

// ── Envelope ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse<T> {
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RpcErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorBody {
    /// `data` is usually a string, but nothing in the protocol promises it.
    pub fn data_text(&self) -> Option<String> {
        self.data.as_ref().map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

// ── Services ────────────────────────────────────────────────────────

/// A service as returned by `service.get` with `selectParent`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "serviceid")]
    pub id: String,
    pub name: String,
    /// `"0"` (or absent) for structural services.
    #[serde(rename = "triggerid", default)]
    pub trigger_id: Option<String>,
    #[serde(rename = "goodsla", default)]
    pub good_sla: Option<String>,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(rename = "sortorder", default)]
    pub sort_order: Option<String>,
    /// Zabbix sends `[]` for top-level services and `{"serviceid": ..}`
    /// otherwise.
    #[serde(default, deserialize_with = "parent_ref")]
    pub parent: Option<String>,
}

fn parent_ref<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Service {
            #[serde(rename = "serviceid")]
            id: String,
        },
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Service { id } if !id.is_empty() && id != "0" => Some(id),
        Raw::Service { .. } | Raw::Other(_) => None,
    })
}

/// Parameters for `service.create`.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceCreate {
    pub name: String,
    #[serde(rename = "parentid", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(rename = "triggerid", skip_serializing_if = "Option::is_none")]
    pub trigger_id: Option<String>,
    #[serde(rename = "showsla")]
    pub show_sla: u8,
    #[serde(rename = "sortorder")]
    pub sort_order: u32,
    pub algorithm: u8,
    #[serde(rename = "goodsla")]
    pub good_sla: f64,
}

/// `{ "serviceids": [...] }` result of create/delete calls.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ServiceIds {
    #[serde(rename = "serviceids", default)]
    pub ids: Vec<String>,
}

// ── Triggers ────────────────────────────────────────────────────────

/// A trigger as returned by `trigger.get` with `selectHosts` and
/// `selectGroups`.
#[derive(Debug, Clone, Deserialize)]
pub struct Trigger {
    #[serde(rename = "triggerid")]
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub hosts: Vec<TriggerHost>,
    #[serde(default)]
    pub groups: Vec<HostGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerHost {
    #[serde(rename = "hostid", default)]
    pub id: Option<String>,
    /// Technical host name.
    pub host: String,
    /// Visible name.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostGroup {
    #[serde(rename = "groupid", default)]
    pub id: Option<String>,
    pub name: String,
}

/// Filter for `trigger.get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerQuery {
    pub min_severity: u8,
    pub monitored_only: bool,
    pub group: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TriggerGetParams<'a> {
    pub min_severity: u8,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub monitored: bool,
    pub output: [&'static str; 3],
    #[serde(rename = "selectHosts")]
    pub select_hosts: [&'static str; 2],
    #[serde(rename = "selectGroups")]
    pub select_groups: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<&'a str>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parent_array_means_top_level() {
        let rec: ServiceRecord = serde_json::from_value(json!({
            "serviceid": "1",
            "name": "Root",
            "triggerid": "0",
            "parent": []
        }))
        .unwrap();
        assert_eq!(rec.parent, None);
        assert_eq!(rec.trigger_id.as_deref(), Some("0"));
    }

    #[test]
    fn parent_object_carries_id() {
        let rec: ServiceRecord = serde_json::from_value(json!({
            "serviceid": "7",
            "name": "web01 - Web 01",
            "parent": { "serviceid": "3" }
        }))
        .unwrap();
        assert_eq!(rec.parent.as_deref(), Some("3"));
        assert_eq!(rec.trigger_id, None);
    }

    #[test]
    fn create_omits_absent_parent_and_trigger() {
        let body = serde_json::to_value(ServiceCreate {
            name: "Linux servers".into(),
            parent_id: None,
            trigger_id: None,
            show_sla: 1,
            sort_order: 1,
            algorithm: 1,
            good_sla: 99.9,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "name": "Linux servers",
                "showsla": 1,
                "sortorder": 1,
                "algorithm": 1,
                "goodsla": 99.9
            })
        );
    }
}
