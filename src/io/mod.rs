//! GraphDef I/O module
//!
//! Load and save binary GraphDef files, and move them in and out of a
//! [`GraphIndex`].
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::io::{load_index, store_index};
//!
//! let mut index = load_index("frozen.pb")?;
//! index.splice_single_input("identity")?;
//! store_index(&index, "rewritten.pb")?;
//! ```

pub mod reader;
pub mod writer;

// Re-exports
pub use reader::{load_graph, load_graph_def, load_graph_def_from_bytes, load_index};
pub use writer::{graph_def_to_bytes, save_graph_def, store_graph, store_index};

use std::path::Path;

use crate::error::RewriteResult;
use crate::graph::GraphIndex;
use crate::transformers::{PassPipeline, PassResult};

/// Load a graph file, run `pipeline` over it and save the result
///
/// Everything in the GraphDef besides the node list (versions, function
/// library, debug info) is written back unchanged. Returns the merged
/// statistics of every pass.
pub fn rewrite_file<P1: AsRef<Path>, P2: AsRef<Path>>(
    input: P1,
    output: P2,
    pipeline: &PassPipeline,
) -> RewriteResult<PassResult> {
    let mut graph = load_graph_def(input)?;
    let mut index = GraphIndex::build(std::mem::take(&mut graph.node));
    let node_count = index.len();

    let result = pipeline.run(&mut index)?;
    let after = index.len();
    graph.node = index.into_nodes();
    save_graph_def(&graph, output)?;

    tracing::debug!(
        before = node_count,
        after,
        applied = result.applied,
        "rewrote graph file"
    );
    Ok(result)
}
