//! Node construction and inspection

use crate::error::{RewriteError, RewriteResult};
use crate::proto::extensions::{CONST_OP, HOST_CONST_OP};
use crate::proto::{DataType, NodeDef};
use crate::tensor::{tensor_to_value, TensorValue};

use super::attrs::{set_attr_dtype, set_attr_tensor};

/// Attribute key holding the literal of a constant node
pub const VALUE_ATTR: &str = "value";

/// Attribute key holding the element type of a constant node
const DTYPE_ATTR: &str = "dtype";

/// Where a constant's data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Regular `Const`
    #[default]
    Cpu,
    /// `HostConst`, for graphs placed on an accelerator
    Accelerator,
}

impl Placement {
    /// Op type used for constants with this placement
    pub fn const_op(self) -> &'static str {
        match self {
            Placement::Cpu => CONST_OP,
            Placement::Accelerator => HOST_CONST_OP,
        }
    }
}

/// Create a node with no attributes
///
/// No schema check is performed on `op`.
pub fn make_node(op: &str, name: &str, inputs: &[&str]) -> NodeDef {
    NodeDef {
        name: name.to_string(),
        op: op.to_string(),
        input: inputs.iter().map(|s| s.to_string()).collect(),
        ..Default::default()
    }
}

/// Create a constant node holding `value`
///
/// Sets the `dtype` attribute and a `value` tensor attribute. With `shape`,
/// the value must have exactly that many elements or a single element to
/// broadcast.
pub fn make_constant(
    name: &str,
    value: &TensorValue,
    dtype: DataType,
    shape: Option<&[i64]>,
    placement: Placement,
) -> RewriteResult<NodeDef> {
    let mut node = make_node(placement.const_op(), name, &[]);
    set_attr_dtype(&mut node, DTYPE_ATTR, dtype);
    set_attr_tensor(&mut node, VALUE_ATTR, value, dtype, shape)?;
    Ok(node)
}

/// Decode the literal held by a constant node
pub fn extract_constant_value(node: &NodeDef) -> RewriteResult<TensorValue> {
    if !node.is_constant() {
        return Err(RewriteError::NotConstant {
            name: node.name.clone(),
            op: node.op.clone(),
        });
    }

    let tensor = node
        .get_attr(VALUE_ATTR)
        .and_then(|a| a.as_tensor())
        .ok_or_else(|| RewriteError::MissingAttribute {
            node: node.name.clone(),
            key: VALUE_ATTR.to_string(),
        })?;

    tensor_to_value(tensor)
}

/// Check whether two single-input nodes are interchangeable
///
/// Nodes with more than one input never compare equal. Otherwise the op, the
/// input list and every attribute must match.
pub fn nodes_structurally_equal(a: &NodeDef, b: &NodeDef) -> bool {
    if a.input.len() > 1 || b.input.len() > 1 {
        return false;
    }

    // BTreeMap equality covers both the key set and the values
    a.op == b.op && a.input == b.input && a.attr == b.attr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::attrs::{set_attr_int_list, set_attr_string};
    use crate::tensor::tensor_dims;

    #[test]
    fn test_make_node() {
        let node = make_node("BiasAdd", "bias", &["conv", "b"]);
        assert_eq!(node.op, "BiasAdd");
        assert_eq!(node.name, "bias");
        assert_eq!(node.input, vec!["conv", "b"]);
        assert!(node.attr.is_empty());
    }

    #[test]
    fn test_make_constant_placement() {
        let value = TensorValue::from(vec![1.0f32, 2.0]);

        let cpu = make_constant("c", &value, DataType::Float, None, Placement::Cpu).unwrap();
        assert_eq!(cpu.op, "Const");
        assert_eq!(cpu.get_attr_dtype("dtype"), Some(DataType::Float));
        assert!(cpu.input.is_empty());

        let host =
            make_constant("h", &value, DataType::Float, None, Placement::Accelerator).unwrap();
        assert_eq!(host.op, "HostConst");
    }

    #[test]
    fn test_make_constant_broadcast() {
        let node = make_constant(
            "zeros",
            &TensorValue::from(0i32),
            DataType::Int32,
            Some(&[2, 3]),
            Placement::Cpu,
        )
        .unwrap();

        let tensor = node.get_attr("value").and_then(|a| a.as_tensor()).unwrap();
        assert_eq!(tensor_dims(tensor), vec![2, 3]);
        assert_eq!(tensor.int_val, vec![0; 6]);
    }

    #[test]
    fn test_make_constant_shape_mismatch() {
        let result = make_constant(
            "bad",
            &TensorValue::from(vec![1i64, 2, 3]),
            DataType::Int64,
            Some(&[2, 2]),
            Placement::Cpu,
        );
        assert!(matches!(result, Err(RewriteError::ShapeMismatch(_))));
    }

    #[test]
    fn test_extract_constant_value() {
        let value = TensorValue::from(vec![3.0f32, 4.0]);
        let node = make_constant("c", &value, DataType::Float, None, Placement::Cpu).unwrap();
        assert_eq!(extract_constant_value(&node).unwrap(), value);

        let relu = make_node("Relu", "r", &["x"]);
        assert!(matches!(
            extract_constant_value(&relu),
            Err(RewriteError::NotConstant { .. })
        ));

        let empty = make_node("Const", "e", &[]);
        assert!(matches!(
            extract_constant_value(&empty),
            Err(RewriteError::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_nodes_structurally_equal() {
        let mut a = make_node("MaxPool", "a", &["x"]);
        let mut b = make_node("MaxPool", "b", &["x"]);
        set_attr_int_list(&mut a, "ksize", vec![1, 2, 2, 1]);
        set_attr_int_list(&mut b, "ksize", vec![1, 2, 2, 1]);
        assert!(nodes_structurally_equal(&a, &b));

        set_attr_string(&mut b, "padding", "SAME");
        assert!(!nodes_structurally_equal(&a, &b));

        set_attr_string(&mut a, "padding", "VALID");
        assert!(!nodes_structurally_equal(&a, &b));

        let c = make_node("Add", "c", &["x", "y"]);
        assert!(!nodes_structurally_equal(&c, &c.clone()));

        let d = make_node("AvgPool", "d", &["x"]);
        assert!(!nodes_structurally_equal(&make_node("MaxPool", "e", &["x"]), &d));
    }
}
