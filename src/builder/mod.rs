//! Node factory
//!
//! Utilities for constructing nodes and editing their attributes:
//!
//! - [`nodes`]: Node and constant construction, constant extraction, structural comparison
//! - [`attrs`]: Typed attribute setters
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::builder::{make_constant, make_node, set_attr_int_list, Placement};
//! use graphdef_rewriter::proto::DataType;
//! use graphdef_rewriter::tensor::TensorValue;
//!
//! let mut pool = make_node("MaxPool", "pool", &["relu"]);
//! set_attr_int_list(&mut pool, "ksize", vec![1, 2, 2, 1]);
//!
//! let zero = make_constant(
//!     "zero",
//!     &TensorValue::from(0.0f32),
//!     DataType::Float,
//!     Some(&[1, 4]),
//!     Placement::Cpu,
//! )?;
//! ```

pub mod attrs;
pub mod nodes;

pub use attrs::{
    copy_attr, set_attr_bool, set_attr_dtype, set_attr_float, set_attr_int, set_attr_int_list,
    set_attr_shape, set_attr_string, set_attr_tensor,
};
pub use nodes::{
    extract_constant_value, make_constant, make_node, nodes_structurally_equal, Placement,
    VALUE_ATTR,
};
