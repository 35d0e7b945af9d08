//! Graph index for GraphDef manipulation
//!
//! `GraphIndex` is the central structure for rewriting a graph. It owns every
//! node and keeps, per node, the list of nodes consuming it.

use std::rc::Rc;

use crate::error::{RewriteError, RewriteResult};
use crate::names::NameNormalizer;
use crate::proto::{GraphDef, NodeDef};

use super::maps::{build_node_map, NodeMap};

/// Mutable name-keyed view of a graph
///
/// Invariant: for every node A whose inputs reference node B, B's outputs
/// contain A, and every recorded output names a present node referencing its
/// owner. Mutators keep this true; see [`GraphIndex::check_consistency`].
#[derive(Debug, Clone)]
pub struct GraphIndex {
    pub(crate) entries: NodeMap,
    pub(crate) names: Rc<NameNormalizer>,
}

impl GraphIndex {
    /// Build an index with a fresh normalizer
    ///
    /// Duplicate names keep their first node. Inputs naming an absent node
    /// are logged and left out of the adjacency.
    pub fn build(nodes: Vec<NodeDef>) -> Self {
        Self::build_with(nodes, Rc::new(NameNormalizer::new()))
    }

    /// Build an index sharing the session normalizer `names`
    pub fn build_with(nodes: Vec<NodeDef>, names: Rc<NameNormalizer>) -> Self {
        let mut index = Self {
            entries: build_node_map(nodes),
            names,
        };

        for (producer, consumer) in index.collect_links() {
            match index.entries.get_mut(&producer) {
                Some(entry) => {
                    entry.add_output(&consumer);
                }
                None => {
                    tracing::warn!(
                        node = %consumer,
                        missing = %producer,
                        "input references an absent node"
                    );
                }
            }
        }

        index
    }

    /// Build an index, failing on inputs that name an absent node
    pub fn try_build(nodes: Vec<NodeDef>) -> RewriteResult<Self> {
        Self::try_build_with(nodes, Rc::new(NameNormalizer::new()))
    }

    /// Strict variant of [`GraphIndex::build_with`]
    pub fn try_build_with(nodes: Vec<NodeDef>, names: Rc<NameNormalizer>) -> RewriteResult<Self> {
        let mut index = Self {
            entries: build_node_map(nodes),
            names,
        };

        let links = index.collect_links();
        if let Some((producer, consumer)) = links
            .iter()
            .find(|(producer, _)| !index.entries.contains_key(producer))
        {
            return Err(RewriteError::DanglingReference {
                node: consumer.clone(),
                missing: producer.clone(),
            });
        }

        for (producer, consumer) in links {
            if let Some(entry) = index.entries.get_mut(&producer) {
                entry.add_output(&consumer);
            }
        }

        Ok(index)
    }

    /// Build an index from a decoded GraphDef
    pub fn from_graph_def(graph: &GraphDef) -> Self {
        Self::build(graph.node.clone())
    }

    /// All nodes in index order
    pub fn dump(&self) -> Vec<NodeDef> {
        self.nodes().cloned().collect()
    }

    /// Consume the index, returning its nodes in index order
    pub fn into_nodes(self) -> Vec<NodeDef> {
        self.entries.into_values().map(|e| e.node).collect()
    }

    /// Dump into a GraphDef
    pub fn to_graph_def(&self) -> GraphDef {
        GraphDef::from_nodes(self.dump())
    }

    /// Names of the graph's entry and exit nodes
    ///
    /// Constants are skipped. A node with no inputs is an input, a node with
    /// no consumers is an output; a node with neither is isolated and left out.
    pub fn inputs_and_outputs(&self) -> (Vec<String>, Vec<String>) {
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();

        for (name, entry) in &self.entries {
            if entry.node.is_constant() {
                continue;
            }

            let no_inputs = entry.node.input.is_empty();
            let no_consumers = entry.outputs.is_empty();
            if no_inputs && no_consumers {
                tracing::debug!(node = %name, "skipping isolated node");
            } else if no_inputs {
                inputs.push(name.clone());
            } else if no_consumers {
                outputs.push(name.clone());
            }
        }

        tracing::debug!(?inputs, ?outputs, "graph boundary");
        (inputs, outputs)
    }

    /// The normalizer shared by this index
    pub fn normalizer(&self) -> &Rc<NameNormalizer> {
        &self.names
    }

    /// (producer, consumer) pairs for every input of every node, in order
    fn collect_links(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .flat_map(|(name, entry)| {
                entry
                    .node
                    .input
                    .iter()
                    .map(move |input| (self.names.node_name(input), name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::make_node;

    fn make_test_nodes() -> Vec<NodeDef> {
        vec![
            make_node("Placeholder", "x", &[]),
            make_node("Const", "w", &[]),
            make_node("Conv2D", "conv", &["x", "w"]),
            make_node("Relu", "relu", &["conv:0"]),
            make_node("Identity", "out", &["relu", "^conv"]),
        ]
    }

    #[test]
    fn test_build() {
        let index = GraphIndex::build(make_test_nodes());

        assert_eq!(index.len(), 5);
        assert_eq!(index.consumers("x"), &["conv".to_string()]);
        assert_eq!(index.consumers("w"), &["conv".to_string()]);
        assert_eq!(
            index.consumers("conv"),
            &["relu".to_string(), "out".to_string()]
        );
        assert!(index.consumers("out").is_empty());
    }

    #[test]
    fn test_build_skips_dangling_inputs() {
        let index = GraphIndex::build(vec![make_node("Relu", "relu", &["ghost"])]);
        assert_eq!(index.len(), 1);
        assert!(!index.has_node("ghost"));
    }

    #[test]
    fn test_try_build_rejects_dangling_inputs() {
        let result = GraphIndex::try_build(vec![make_node("Relu", "relu", &["ghost:1"])]);
        match result {
            Err(RewriteError::DanglingReference { node, missing }) => {
                assert_eq!(node, "relu");
                assert_eq!(missing, "ghost");
            }
            other => panic!("unexpected result {:?}", other.map(|i| i.len())),
        }
    }

    #[test]
    fn test_repeated_reference_records_one_output() {
        let index = GraphIndex::build(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Mul", "square", &["x", "x"]),
        ]);
        assert_eq!(index.consumers("x"), &["square".to_string()]);
    }

    #[test]
    fn test_dump_preserves_order() {
        let nodes = make_test_nodes();
        let index = GraphIndex::build(nodes.clone());
        assert_eq!(index.dump(), nodes);
        assert_eq!(index.to_graph_def().node, nodes);
        assert_eq!(index.into_nodes(), nodes);
    }

    #[test]
    fn test_inputs_and_outputs() {
        let mut nodes = make_test_nodes();
        nodes.push(make_node("Placeholder", "lonely", &[]));
        let index = GraphIndex::build(nodes);

        let (inputs, outputs) = index.inputs_and_outputs();
        assert_eq!(inputs, vec!["x"]);
        assert_eq!(outputs, vec!["out"]);
    }

    #[test]
    fn test_shared_normalizer() {
        let names = Rc::new(NameNormalizer::new());
        let a = GraphIndex::build_with(make_test_nodes(), Rc::clone(&names));
        let b = GraphIndex::build_with(make_test_nodes(), Rc::clone(&names));

        assert!(Rc::ptr_eq(a.normalizer(), b.normalizer()));
        assert!(names.cached() > 0);
    }
}
