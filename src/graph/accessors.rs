//! Graph accessor methods
//!
//! Read-only queries over a [`GraphIndex`]. None of these fail; absent names
//! yield `None` or empty results.

use std::collections::BTreeMap;

use crate::proto::{AttrValue, NodeDef};

use super::index::GraphIndex;
use super::maps::GraphEntry;

impl GraphIndex {
    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by name
    pub fn get_node(&self, name: &str) -> Option<&NodeDef> {
        self.entries.get(name).map(|e| &e.node)
    }

    /// Get GraphEntry by name
    pub fn get_entry(&self, name: &str) -> Option<&GraphEntry> {
        self.entries.get(name)
    }

    /// Check if a node exists
    pub fn has_node(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the index holds no nodes
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all nodes in order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.entries.values().map(|e| &e.node)
    }

    /// Iterate over node names in order
    pub fn node_names(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Position of a node in index order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.get_index_of(name)
    }

    /// Mutable access to a node's attributes
    ///
    /// Attributes play no part in adjacency, so they can be edited in place.
    pub fn node_attrs_mut(&mut self, name: &str) -> Option<&mut BTreeMap<String, AttrValue>> {
        self.entries.get_mut(name).map(|e| &mut e.node.attr)
    }

    // ========================================================================
    // Graph traversal
    // ========================================================================

    /// Names of the nodes consuming `name` (empty if absent)
    pub fn consumers(&self, name: &str) -> &[String] {
        self.entries
            .get(name)
            .map(|e| e.outputs.as_slice())
            .unwrap_or(&[])
    }

    /// Node producing the value named by an input reference
    pub fn producer_of(&self, reference: &str) -> Option<&NodeDef> {
        self.get_node(&self.names.node_name(reference))
    }

    /// Producer of a node's first input
    pub fn first_producer(&self, node: &NodeDef) -> Option<&NodeDef> {
        node.input.first().and_then(|r| self.producer_of(r))
    }

    /// Distinct producer names of a node's inputs, first reference first
    pub fn producer_names(&self, node: &NodeDef) -> Vec<String> {
        let mut names: Vec<String> = Vec::with_capacity(node.input.len());
        for input in &node.input {
            let name = self.names.node_name(input);
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// Check if any input of `consumer` resolves to `producer`
    pub fn references(&self, consumer: &NodeDef, producer: &str) -> bool {
        consumer
            .input
            .iter()
            .any(|input| self.names.resolve(input).node == producer)
    }

    // ========================================================================
    // Pattern matching helpers
    // ========================================================================

    /// Find nodes by op type
    pub fn find_nodes_by_op(&self, op: &str) -> Vec<&NodeDef> {
        self.nodes().filter(|n| n.op == op).collect()
    }

    /// Find nodes matching any of the given op types
    pub fn find_nodes_by_ops(&self, ops: &[&str]) -> Vec<&NodeDef> {
        self.nodes().filter(|n| n.is_op_in(ops)).collect()
    }
}
