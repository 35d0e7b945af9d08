//! Tensor utilities for graph constants
//!
//! This module provides utilities for working with tensor literals:
//! - Data type mappings (`dtype`)
//! - Shape utilities (`shape`)
//! - Conversion between TensorProto and ndarray (`convert`)
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::tensor::{tensor_to_value, value_to_tensor, TensorValue};
//!
//! let value = tensor_to_value(&tensor)?;
//! let doubled = TensorValue::from(value.to_f32_array() * 2.0);
//! let output = value_to_tensor(&doubled, DataType::Float, None)?;
//! ```

pub mod convert;
pub mod dtype;
pub mod shape;

pub use convert::{tensor_to_value, value_to_tensor, TensorValue};
pub use dtype::{dtype_size, i32_to_dtype, is_float_type, is_int_type};
pub use shape::{broadcast_shape, element_count, is_dynamic, numel, tensor_dims};
