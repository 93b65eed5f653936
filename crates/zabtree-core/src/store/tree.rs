// ── Service tree cache ──
//
// Insertion-ordered arena of service nodes with O(1) lookups by id, by
// (name, parent), and by bare name. Indexes point at the FIRST node
// recorded for a key, so lookups agree with a front-to-back scan.

use std::collections::HashMap;

use tracing::debug;

use crate::model::{ServiceId, ServiceNode};

/// In-memory snapshot of the remote service tree.
///
/// Refreshed wholesale with [`replace`](Self::replace) and appended to with
/// [`record`](Self::record) as the engine creates nodes, so every search
/// sees the nodes created earlier in the same run.
#[derive(Debug, Default)]
pub struct ServiceTreeCache {
    nodes: Vec<ServiceNode>,
    by_id: HashMap<ServiceId, usize>,
    top_level: HashMap<String, usize>,
    by_parent: HashMap<ServiceId, HashMap<String, usize>>,
    by_name: HashMap<String, usize>,
    children: HashMap<ServiceId, Vec<usize>>,
}

impl ServiceTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the current contents and index `nodes` in order.
    pub fn replace(&mut self, nodes: Vec<ServiceNode>) {
        self.nodes.clear();
        self.by_id.clear();
        self.top_level.clear();
        self.by_parent.clear();
        self.by_name.clear();
        self.children.clear();
        self.nodes.reserve(nodes.len());
        for node in nodes {
            self.push(node);
        }
        debug!(count = self.nodes.len(), "service cache replaced");
    }

    /// Append a node created during this run.
    pub fn record(&mut self, node: ServiceNode) {
        debug!(id = %node.id, name = %node.name, parent = ?node.parent, "service cache record");
        self.push(node);
    }

    fn push(&mut self, node: ServiceNode) {
        let slot = self.nodes.len();
        self.by_id.entry(node.id.clone()).or_insert(slot);
        self.by_name.entry(node.name.clone()).or_insert(slot);
        match &node.parent {
            Some(parent) => {
                self.by_parent
                    .entry(parent.clone())
                    .or_default()
                    .entry(node.name.clone())
                    .or_insert(slot);
                self.children.entry(parent.clone()).or_default().push(slot);
            }
            None => {
                self.top_level.entry(node.name.clone()).or_insert(slot);
            }
        }
        self.nodes.push(node);
    }

    // ── Searches ─────────────────────────────────────────────────────

    /// First node named `name` whose parent is `parent`.
    ///
    /// Top-level nodes never match.
    pub fn find_child(&self, name: &str, parent: &ServiceId) -> Option<&ServiceNode> {
        let slot = self.by_parent.get(parent)?.get(name)?;
        self.nodes.get(*slot)
    }

    /// First top-level node named `name`.
    pub fn find_top_level(&self, name: &str) -> Option<&ServiceNode> {
        self.top_level.get(name).and_then(|slot| self.nodes.get(*slot))
    }

    /// First node named `name` anywhere in the tree.
    ///
    /// Names repeat across branches (the same host under two groups, the
    /// same trigger text on many hosts), so this is only meaningful for
    /// names known to be unique.
    pub fn find_by_name(&self, name: &str) -> Option<&ServiceNode> {
        self.by_name.get(name).and_then(|slot| self.nodes.get(*slot))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn get(&self, id: &ServiceId) -> Option<&ServiceNode> {
        self.by_id.get(id).and_then(|slot| self.nodes.get(*slot))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceNode> {
        self.nodes.iter()
    }

    pub fn top_level(&self) -> impl Iterator<Item = &ServiceNode> {
        self.nodes.iter().filter(|n| n.is_top_level())
    }

    /// Direct children of `id`, in insertion order.
    pub fn children(&self, id: &ServiceId) -> impl Iterator<Item = &ServiceNode> {
        self.children
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|slot| self.nodes.get(*slot))
    }

    /// Names from the top-level ancestor down to `id`.
    ///
    /// A parent missing from the cache ends the walk; a parent cycle is
    /// cut after visiting every node once.
    pub fn path(&self, id: &ServiceId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.get(id);
        while let Some(node) = current {
            if names.len() > self.nodes.len() {
                break;
            }
            names.push(node.name.as_str());
            current = node.parent.as_ref().and_then(|p| self.get(p));
        }
        names.reverse();
        names
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::service;

    fn node(id: u64, name: &str, parent: Option<u64>) -> ServiceNode {
        service(id, name, parent, None)
    }

    fn sample() -> ServiceTreeCache {
        let mut cache = ServiceTreeCache::new();
        cache.replace(vec![
            node(1, "Linux servers", None),
            node(5, "web01 - Web 01", Some(1)),
            node(7, "db01 - DB 01", Some(1)),
            node(8, "api", Some(7)),
            node(9, "api", Some(5)),
        ]);
        cache
    }

    #[test]
    fn find_child_is_scoped_to_parent() {
        let cache = sample();
        let hit = cache.find_child("api", &ServiceId::from(5));
        assert_eq!(hit.map(|n| n.id.as_str()), Some("9"));
        assert!(cache.find_child("api", &ServiceId::from(1)).is_none());
        // Bare-name search returns the first one recorded, under 7.
        assert_eq!(cache.find_by_name("api").map(|n| n.id.as_str()), Some("8"));
    }

    #[test]
    fn top_level_nodes_never_match_find_child() {
        let cache = sample();
        assert!(cache.find_child("Linux servers", &ServiceId::from(1)).is_none());
        assert_eq!(
            cache.find_top_level("Linux servers").map(|n| n.id.as_str()),
            Some("1")
        );
        assert!(cache.find_top_level("api").is_none());
    }

    #[test]
    fn duplicates_resolve_to_first_recorded() {
        let mut cache = ServiceTreeCache::new();
        cache.record(node(1, "Root", None));
        cache.record(node(2, "Root", None));
        assert_eq!(cache.find_top_level("Root").map(|n| n.id.as_str()), Some("1"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn record_is_visible_to_subsequent_searches() {
        let mut cache = sample();
        assert!(cache.find_child("disk full", &ServiceId::from(5)).is_none());
        cache.record(node(20, "disk full", Some(5)));
        assert_eq!(
            cache.find_child("disk full", &ServiceId::from(5)).map(|n| n.id.as_str()),
            Some("20")
        );
        let names: Vec<&str> = cache.children(&ServiceId::from(5)).map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["api", "disk full"]);
    }

    #[test]
    fn replace_discards_previous_contents() {
        let mut cache = sample();
        cache.replace(vec![node(100, "Fresh", None)]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&ServiceId::from(1)).is_none());
        assert!(cache.find_by_name("api").is_none());
        assert_eq!(cache.children(&ServiceId::from(5)).count(), 0);
    }

    #[test]
    fn path_walks_to_the_top() {
        let cache = sample();
        assert_eq!(
            cache.path(&ServiceId::from(9)),
            vec!["Linux servers", "web01 - Web 01", "api"]
        );
        assert_eq!(cache.top_level().count(), 1);
        assert!(cache.path(&ServiceId::from(404)).is_empty());
    }

    #[test]
    fn path_survives_parent_cycles() {
        let mut cache = ServiceTreeCache::new();
        cache.replace(vec![node(1, "a", Some(2)), node(2, "b", Some(1))]);
        assert!(cache.path(&ServiceId::from(1)).len() <= 3);
    }
}
