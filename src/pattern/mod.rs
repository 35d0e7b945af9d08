//! Pattern matching over operator chains
//!
//! A [`Pattern`] is an ordered list of tokens, producer first. Each token is
//! either mandatory (one or more acceptable op types) or optional (may be
//! skipped). Matching aligns the last token with a node and walks backward
//! along each node's first input.
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::pattern::PatternBuilder;
//!
//! // Conv2D + BiasAdd + (Add | AddN)? + (Relu | Relu6)
//! let pattern = PatternBuilder::new()
//!     .op("Conv2D")
//!     .op("BiasAdd")
//!     .optional(&["Add", "AddN"])
//!     .any_of(&["Relu", "Relu6"])
//!     .build();
//!
//! for m in index.search_patterns(&pattern) {
//!     println!("{:?} matched {:?}", m.nodes, m.op_types);
//! }
//! ```

pub mod matcher;
pub mod ops;

// Re-export main types
pub use matcher::{matcher, PatternMatch, PatternMatcher};
pub use ops::{conv_bias_add_relu, matmul_bias_relu, Pattern, PatternBuilder, PatternToken};

// Re-export common op groups
pub use ops::{ADD_OPS, CONV_OPS, IDENTITY_OPS, POOL_OPS, RELU_OPS};
