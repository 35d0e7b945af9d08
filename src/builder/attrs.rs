//! Typed attribute setters
//!
//! Each setter overwrites the attribute stored under `key`.

use crate::error::RewriteResult;
use crate::proto::{AttrValue, DataType, NodeDef};
use crate::tensor::{value_to_tensor, TensorValue};

/// Set an integer attribute
pub fn set_attr_int(node: &mut NodeDef, key: &str, value: i64) {
    node.attr.insert(key.to_string(), AttrValue::int(value));
}

/// Set a float attribute
pub fn set_attr_float(node: &mut NodeDef, key: &str, value: f32) {
    node.attr.insert(key.to_string(), AttrValue::float(value));
}

/// Set a boolean attribute
pub fn set_attr_bool(node: &mut NodeDef, key: &str, value: bool) {
    node.attr.insert(key.to_string(), AttrValue::bool(value));
}

/// Set a string attribute
pub fn set_attr_string(node: &mut NodeDef, key: &str, value: impl Into<Vec<u8>>) {
    node.attr.insert(key.to_string(), AttrValue::string(value));
}

/// Set an integer list attribute
pub fn set_attr_int_list(node: &mut NodeDef, key: &str, values: Vec<i64>) {
    node.attr.insert(key.to_string(), AttrValue::int_list(values));
}

/// Set a shape attribute
pub fn set_attr_shape(node: &mut NodeDef, key: &str, dims: &[i64]) {
    node.attr.insert(key.to_string(), AttrValue::shape(dims));
}

/// Set a dtype attribute
pub fn set_attr_dtype(node: &mut NodeDef, key: &str, dtype: DataType) {
    node.attr.insert(key.to_string(), AttrValue::dtype(dtype));
}

/// Set a tensor attribute built from `value`
///
/// Fails when the value cannot be cast to `dtype` or does not fit `shape`;
/// the node is left untouched in that case.
pub fn set_attr_tensor(
    node: &mut NodeDef,
    key: &str,
    value: &TensorValue,
    dtype: DataType,
    shape: Option<&[i64]>,
) -> RewriteResult<()> {
    let tensor = value_to_tensor(value, dtype, shape)?;
    node.attr.insert(key.to_string(), AttrValue::tensor(tensor));
    Ok(())
}

/// Copy an existing attribute value under `key`
pub fn copy_attr(node: &mut NodeDef, key: &str, value: &AttrValue) {
    node.attr.insert(key.to_string(), value.clone());
}
