//! Error types for graphdef-rewriter
//!
//! Every failure of a mutator or loader is reported through [`RewriteError`].
//! Query operations (pattern search, classification, positivity) never return
//! errors; they degrade to empty results instead.

use thiserror::Error;

/// Main error type for graph rewriting operations
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Referenced node is absent from the index
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Splice attempted on a node fed by more than one non-constant producer
    #[error("Cannot splice {node}: {count} non-constant inputs")]
    MultiInputSplice {
        /// Node that was to be spliced
        node: String,
        /// Number of non-constant producers found
        count: usize,
    },

    /// Splice attempted on a node without a data input at position 0
    #[error("Cannot splice {0}: no primary data input")]
    NoPrimaryInput(String),

    /// Operation requires a constant node
    #[error("Node {name} is not a constant (op: {op})")]
    NotConstant {
        /// Node name
        name: String,
        /// Actual op type
        op: String,
    },

    /// Folding requires every direct input to be constant
    #[error("Cannot fold into {end}: input {input} is not constant")]
    NonConstantSubgraph {
        /// End node of the would-be folded subgraph
        end: String,
        /// First offending input
        input: String,
    },

    /// An input names a node absent from the index
    #[error("Node {node} references missing node {missing}")]
    DanglingReference {
        /// Node holding the reference
        node: String,
        /// Name that could not be resolved
        missing: String,
    },

    /// Consumer does not reference the producer it was expected to
    #[error("Node {consumer} is not a consumer of {producer}")]
    NotConnected {
        /// Expected producer
        producer: String,
        /// Consumer that does not reference it
        consumer: String,
    },

    /// Inserted node would shadow a node taking part in the same edit
    #[error("Name conflict: {0}")]
    NameConflict(String),

    /// Outputs list disagrees with the inputs that reference its owner
    #[error("Outputs of {producer} are inconsistent with {consumer}")]
    InconsistentOutputs {
        /// Owner of the outputs list
        producer: String,
        /// Consumer that is missing or extra
        consumer: String,
    },

    /// Required attribute is missing
    #[error("Node {node} has no attribute {key}")]
    MissingAttribute {
        /// Node name
        node: String,
        /// Attribute key
        key: String,
    },

    /// Attribute holds a kind outside the supported set
    #[error("Unsupported attribute {key} on node {node}")]
    UnsupportedAttribute {
        /// Node name
        node: String,
        /// Attribute key
        key: String,
    },

    /// Invalid tensor data type
    #[error("Invalid data type: {0}")]
    InvalidDataType(i32),

    /// Tensor data does not fit the requested shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error
    #[error("Protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),
}

/// Result type alias for graph rewriting operations
pub type RewriteResult<T> = Result<T, RewriteError>;
