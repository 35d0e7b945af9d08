//! Graph map types and builders
//!
//! Defines the core data structures for efficient graph traversal.

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::proto::NodeDef;

/// Consumer names of a node
/// SmallVec optimized for common case of 1-4 consumers
pub type OutputList = SmallVec<[String; 4]>;

/// Entry in the node map - a node and the nodes consuming it
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEntry {
    /// The node itself
    pub node: NodeDef,
    /// Names of nodes referencing this one, first reference first
    pub outputs: OutputList,
}

impl GraphEntry {
    /// Create an entry with no consumers
    pub fn new(node: NodeDef) -> Self {
        Self {
            node,
            outputs: OutputList::new(),
        }
    }

    /// Create an entry with the given consumers (duplicates dropped)
    pub fn with_outputs<'a>(node: NodeDef, outputs: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entry = Self::new(node);
        for name in outputs {
            entry.add_output(name);
        }
        entry
    }

    /// Check if `name` is a recorded consumer
    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|o| o == name)
    }

    /// Record a consumer; returns false if it was already present
    pub fn add_output(&mut self, name: &str) -> bool {
        if self.has_output(name) {
            return false;
        }
        self.outputs.push(name.to_string());
        true
    }

    /// Forget a consumer; returns false if it was not present
    pub fn remove_output(&mut self, name: &str) -> bool {
        let before = self.outputs.len();
        self.outputs.retain(|o| o != name);
        self.outputs.len() != before
    }
}

/// Type alias for node map: node_name → GraphEntry (order preserved)
pub type NodeMap = IndexMap<String, GraphEntry>;

/// Build the node map from a flat node list
///
/// Preserves node order using IndexMap. When a name occurs twice the first
/// node wins; later duplicates are logged and dropped.
pub fn build_node_map(nodes: Vec<NodeDef>) -> NodeMap {
    let mut map = NodeMap::with_capacity(nodes.len());

    for node in nodes {
        if map.contains_key(&node.name) {
            tracing::debug!(node = %node.name, op = %node.op, "dropping duplicate node");
            continue;
        }
        map.insert(node.name.clone(), GraphEntry::new(node));
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::make_node;

    #[test]
    fn test_build_node_map_preserves_order() {
        let map = build_node_map(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Relu", "relu", &["x"]),
            make_node("Identity", "out", &["relu"]),
        ]);

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["x", "relu", "out"]);
        assert!(map.values().all(|e| e.outputs.is_empty()));
    }

    #[test]
    fn test_build_node_map_first_duplicate_wins() {
        let map = build_node_map(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Const", "x", &[]),
        ]);

        assert_eq!(map.len(), 1);
        assert_eq!(map["x"].node.op, "Placeholder");
    }

    #[test]
    fn test_outputs_have_no_duplicates() {
        let mut entry = GraphEntry::new(make_node("Placeholder", "x", &[]));
        assert!(entry.add_output("a"));
        assert!(!entry.add_output("a"));
        assert!(entry.add_output("b"));
        assert_eq!(entry.outputs.as_slice(), &["a".to_string(), "b".to_string()]);

        assert!(entry.remove_output("a"));
        assert!(!entry.remove_output("a"));
        assert_eq!(entry.outputs.len(), 1);
    }

    #[test]
    fn test_with_outputs() {
        let entry = GraphEntry::with_outputs(make_node("Const", "c", &[]), ["a", "b", "a"]);
        assert_eq!(entry.outputs.len(), 2);
    }
}
