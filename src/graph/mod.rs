//! Graph index for GraphDef rewriting
//!
//! This module provides the core infrastructure for editing a graph:
//!
//! - [`GraphIndex`]: Name-keyed node map with per-node consumer lists
//! - [`maps`]: Entry type and map builders
//! - [`mutators`]: Removal, splicing, replacement, insertion, constant folding
//! - [`validate`]: Adjacency consistency checks
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::graph::GraphIndex;
//!
//! let mut index = GraphIndex::build(graph_def.node);
//!
//! // Find nodes
//! let identities = index.find_nodes_by_op("Identity");
//!
//! // Traverse graph
//! let producer = index.producer_of("conv:0");
//! let consumers = index.consumers("conv");
//!
//! // Edit
//! index.splice_single_input("identity")?;
//! let nodes = index.dump();
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `entries` | node_name → GraphEntry (node + consumer names, order preserved) |
//! | normalizer caches | raw reference → parsed reference |

pub mod accessors;
pub mod index;
pub mod maps;
pub mod mutators;
pub mod validate;

// Re-export main types
pub use index::GraphIndex;
pub use maps::{GraphEntry, NodeMap, OutputList};
pub use validate::ValidationResult;
