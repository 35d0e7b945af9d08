//! # GraphDef Rewriter
//!
//! In-memory index over a TensorFlow GraphDef for graph surgery.
//!
//! This crate keeps a name-keyed node map together with per-node consumer
//! lists, and offers pattern matching and mutators that keep both directions
//! of adjacency consistent.
//!
//! ## Features
//!
//! - **Pattern Matching**: Find operator chains with optional positions
//! - **Graph Surgery**: Splice, replace, insert and constant-fold nodes
//! - **Analysis**: Prove non-negativity of node outputs for quantization
//!
//! ## Example
//!
//! ```ignore
//! use graphdef_rewriter::prelude::*;
//!
//! let mut index = load_index("frozen.pb")?;
//! PassPipeline::standard().run(&mut index)?;
//! store_index(&index, "rewritten.pb")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod analysis;
pub mod builder;
pub mod error;
pub mod graph;
pub mod io;
pub mod names;
pub mod pattern;
pub mod proto;
pub mod tensor;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use graphdef_rewriter::prelude::*`
pub mod prelude {
    pub use crate::analysis::PositivityAnalyzer;
    pub use crate::builder::{make_constant, make_node, Placement};
    pub use crate::error::{RewriteError, RewriteResult};
    pub use crate::graph::GraphIndex;
    pub use crate::io::{load_graph_def, load_index, save_graph_def, store_index};
    pub use crate::names::{NameNormalizer, TensorRef};
    pub use crate::pattern::{matcher, Pattern, PatternBuilder, PatternMatch, PatternMatcher};
    pub use crate::proto::{AttrValue, DataType, GraphDef, NodeDef, TensorProto};
    pub use crate::tensor::TensorValue;
    pub use crate::transformers::{GraphPass, PassPipeline, PassResult, PipelineConfig};
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{RewriteError, RewriteResult};
pub use graph::GraphIndex;

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_prelude_round_trip() {
        use crate::prelude::*;

        let index = GraphIndex::build(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Relu", "relu", &["x"]),
        ]);
        let graph: GraphDef = index.to_graph_def();
        assert_eq!(graph.node.len(), 2);
        assert!(index.has_provable_nonnegative_output("relu"));
    }
}
