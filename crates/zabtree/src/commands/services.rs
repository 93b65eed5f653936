//! `services` handler: lists the current tree with full paths.

use serde::Serialize;
use tabled::Tabled;

use zabtree_core::{Controller, ServiceId, ServiceNode, ServiceTreeCache, TriggerId};

use crate::cli::{GlobalOpts, ServicesArgs};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

/// One service as listed and exported.
#[derive(Debug, Serialize)]
struct ServiceEntry {
    id: ServiceId,
    name: String,
    parent: Option<ServiceId>,
    trigger: Option<TriggerId>,
    sla_target: Option<f64>,
    path: Vec<String>,
}

impl ServiceEntry {
    fn new(node: &ServiceNode, tree: &ServiceTreeCache) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            parent: node.parent.clone(),
            trigger: node.trigger.clone(),
            sla_target: node.sla_target,
            path: tree.path(&node.id).into_iter().map(str::to_owned).collect(),
        }
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Trigger")]
    trigger: String,
    #[tabled(rename = "SLA")]
    sla: String,
}

impl From<&ServiceEntry> for ServiceRow {
    fn from(e: &ServiceEntry) -> Self {
        Self {
            id: e.id.to_string(),
            path: e.path.join(" > "),
            trigger: e.trigger.as_ref().map(ToString::to_string).unwrap_or_default(),
            sla: e.sla_target.map(|s| format!("{s}%")).unwrap_or_default(),
        }
    }
}

/// Depth-first from the top-level nodes; nodes unreachable from the top
/// (missing parent, parent cycle) follow in insertion order.
fn listing(tree: &ServiceTreeCache) -> Vec<ServiceEntry> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(tree.len());
    let mut stack: Vec<&ServiceNode> = tree.top_level().collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if !seen.insert(&node.id) {
            continue;
        }
        out.push(ServiceEntry::new(node, tree));
        let mut children: Vec<&ServiceNode> = tree.children(&node.id).collect();
        children.reverse();
        stack.extend(children);
    }

    for node in tree.iter() {
        if seen.insert(&node.id) {
            out.push(ServiceEntry::new(node, tree));
        }
    }
    out
}

pub async fn handle(
    args: ServicesArgs,
    profile_name: &str,
    profile: &Profile,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let connection = config::resolve_connection(profile_name, profile, global)?;

    let pb = output::spinner("Loading service tree", global.quiet);
    let result = Controller::oneshot(connection, |c| async move { c.service_tree().await }).await;
    pb.finish_and_clear();
    let tree = result?;

    let entries = listing(&tree);
    let out = output::render_list(
        global.output,
        &entries,
        |e| ServiceRow::from(e),
        |e| e.path.join(" > "),
    )?;
    output::print_output(&out, global.quiet);

    output::write_export(args.export.as_deref(), &entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: u64, name: &str, parent: Option<u64>) -> ServiceNode {
        ServiceNode {
            id: ServiceId::from(id),
            name: name.into(),
            parent: parent.map(ServiceId::from),
            trigger: None,
            sla_target: Some(99.9),
            algorithm: None,
            sort_order: None,
        }
    }

    #[test]
    fn listing_is_depth_first_with_orphans_last() {
        let mut tree = ServiceTreeCache::new();
        tree.replace(vec![
            node(1, "Linux servers", None),
            node(2, "Windows servers", None),
            node(3, "web01 - Web 01", Some(1)),
            node(4, "dc01 - DC 01", Some(2)),
            node(5, "CPU high on web01", Some(3)),
            node(6, "stray", Some(404)),
        ]);

        let paths: Vec<String> = listing(&tree).iter().map(|e| e.path.join(" > ")).collect();
        assert_eq!(
            paths,
            vec![
                "Linux servers",
                "Linux servers > web01 - Web 01",
                "Linux servers > web01 - Web 01 > CPU high on web01",
                "Windows servers",
                "Windows servers > dc01 - DC 01",
                "stray",
            ]
        );
    }

    #[test]
    fn rows_show_trigger_and_sla() {
        let mut tree = ServiceTreeCache::new();
        let mut leaf = node(2, "CPU high", Some(1));
        leaf.trigger = Some(TriggerId::from(13491));
        tree.replace(vec![node(1, "Linux servers", None), leaf]);

        let entries = listing(&tree);
        let row = ServiceRow::from(&entries[1]);
        assert_eq!(row.path, "Linux servers > CPU high");
        assert_eq!(row.trigger, "13491");
        assert_eq!(row.sla, "99.9%");
    }
}
