//! GraphDef reader
//!
//! Load binary GraphDef files or bytes, rejecting attributes outside the
//! supported kinds.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use prost::Message;

use crate::error::{RewriteError, RewriteResult};
use crate::graph::GraphIndex;
use crate::proto::{GraphDef, NodeDef};

/// Load a GraphDef from a file path
///
/// # Example
///
/// ```ignore
/// use graphdef_rewriter::io::load_graph_def;
///
/// let graph = load_graph_def("frozen.pb")?;
/// println!("{} nodes", graph.node.len());
/// ```
pub fn load_graph_def<P: AsRef<Path>>(path: P) -> RewriteResult<GraphDef> {
    let path = path.as_ref();

    let file = File::open(path).inspect_err(|e| {
        tracing::debug!(path = %path.display(), error = %e, "failed to open graph file");
    })?;

    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    load_graph_def_from_bytes(&buffer)
}

/// Decode a GraphDef from bytes
pub fn load_graph_def_from_bytes(bytes: &[u8]) -> RewriteResult<GraphDef> {
    let graph = GraphDef::decode(bytes)?;
    for node in &graph.node {
        check_attributes(node)?;
    }
    tracing::debug!(nodes = graph.node.len(), bytes = bytes.len(), "decoded graph");
    Ok(graph)
}

/// Load only the node list of a GraphDef file
pub fn load_graph<P: AsRef<Path>>(path: P) -> RewriteResult<Vec<NodeDef>> {
    Ok(load_graph_def(path)?.node)
}

/// Load a GraphDef file straight into an index
pub fn load_index<P: AsRef<Path>>(path: P) -> RewriteResult<GraphIndex> {
    Ok(GraphIndex::build(load_graph(path)?))
}

fn check_attributes(node: &NodeDef) -> RewriteResult<()> {
    match node.attr.iter().find(|(_, value)| value.kind().is_none()) {
        Some((key, _)) => Err(RewriteError::UnsupportedAttribute {
            node: node.name.clone(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}
