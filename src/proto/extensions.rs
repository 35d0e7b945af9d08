//! Extension methods for GraphDef protobuf types
//!
//! Provides convenient helper methods for working with the protobuf types.

use super::attr_value::{ListValue, Value};
use super::*;

/// Op type of a constant placed with the rest of the graph
pub const CONST_OP: &str = "Const";

/// Op type of a constant pinned to host memory
pub const HOST_CONST_OP: &str = "HostConst";

/// Check whether an op type designates a constant node
pub fn is_constant_op(op: &str) -> bool {
    op == CONST_OP || op == HOST_CONST_OP
}

/// The closed set of attribute kinds understood by the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// 64-bit integer
    Int,
    /// 32-bit float
    Float,
    /// Boolean
    Bool,
    /// Byte string
    String,
    /// List of 64-bit integers
    IntList,
    /// Tensor shape
    Shape,
    /// Element data type
    DType,
    /// Embedded tensor literal
    Tensor,
}

// ============================================================================
// AttrValue extensions
// ============================================================================

impl AttrValue {
    /// Create an integer attribute
    pub fn int(value: i64) -> Self {
        Self {
            value: Some(Value::I(value)),
        }
    }

    /// Create a float attribute
    pub fn float(value: f32) -> Self {
        Self {
            value: Some(Value::F(value)),
        }
    }

    /// Create a boolean attribute
    pub fn bool(value: bool) -> Self {
        Self {
            value: Some(Value::B(value)),
        }
    }

    /// Create a string attribute
    pub fn string(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: Some(Value::S(value.into())),
        }
    }

    /// Create an integer list attribute
    pub fn int_list(values: Vec<i64>) -> Self {
        Self {
            value: Some(Value::List(ListValue {
                i: values,
                ..Default::default()
            })),
        }
    }

    /// Create a shape attribute
    pub fn shape(dims: &[i64]) -> Self {
        Self {
            value: Some(Value::Shape(TensorShapeProto::from_dims(dims))),
        }
    }

    /// Create a dtype attribute
    pub fn dtype(dtype: DataType) -> Self {
        Self {
            value: Some(Value::Type(dtype as i32)),
        }
    }

    /// Create a tensor attribute
    pub fn tensor(tensor: TensorProto) -> Self {
        Self {
            value: Some(Value::Tensor(tensor)),
        }
    }

    /// Classify the held value
    ///
    /// Returns `None` for an empty attribute and for lists of anything other
    /// than integers. An empty list counts as an integer list.
    pub fn kind(&self) -> Option<AttrKind> {
        match self.value.as_ref()? {
            Value::I(_) => Some(AttrKind::Int),
            Value::F(_) => Some(AttrKind::Float),
            Value::B(_) => Some(AttrKind::Bool),
            Value::S(_) => Some(AttrKind::String),
            Value::Type(_) => Some(AttrKind::DType),
            Value::Shape(_) => Some(AttrKind::Shape),
            Value::Tensor(_) => Some(AttrKind::Tensor),
            Value::List(list) => {
                let only_ints = list.s.is_empty()
                    && list.f.is_empty()
                    && list.b.is_empty()
                    && list.r#type.is_empty()
                    && list.shape.is_empty()
                    && list.tensor.is_empty();
                only_ints.then_some(AttrKind::IntList)
            }
        }
    }

    /// Integer value, if this is an integer attribute
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            Some(Value::I(v)) => Some(v),
            _ => None,
        }
    }

    /// Float value, if this is a float attribute
    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            Some(Value::F(v)) => Some(v),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean attribute
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Some(Value::B(v)) => Some(v),
            _ => None,
        }
    }

    /// String bytes, if this is a string attribute
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            Some(Value::S(v)) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Integer list, if this is a list attribute
    pub fn as_int_list(&self) -> Option<&[i64]> {
        match &self.value {
            Some(Value::List(list)) => Some(list.i.as_slice()),
            _ => None,
        }
    }

    /// Data type, if this is a dtype attribute
    pub fn as_dtype(&self) -> Option<DataType> {
        match self.value {
            Some(Value::Type(v)) => DataType::try_from(v).ok(),
            _ => None,
        }
    }

    /// Shape, if this is a shape attribute
    pub fn as_shape(&self) -> Option<&TensorShapeProto> {
        match &self.value {
            Some(Value::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    /// Tensor, if this is a tensor attribute
    pub fn as_tensor(&self) -> Option<&TensorProto> {
        match &self.value {
            Some(Value::Tensor(tensor)) => Some(tensor),
            _ => None,
        }
    }
}

// ============================================================================
// NodeDef extensions
// ============================================================================

impl NodeDef {
    /// Get attribute by key
    pub fn get_attr(&self, key: &str) -> Option<&AttrValue> {
        self.attr.get(key)
    }

    /// Get integer attribute value
    pub fn get_attr_int(&self, key: &str) -> Option<i64> {
        self.get_attr(key).and_then(AttrValue::as_int)
    }

    /// Get float attribute value
    pub fn get_attr_float(&self, key: &str) -> Option<f32> {
        self.get_attr(key).and_then(AttrValue::as_float)
    }

    /// Get boolean attribute value
    pub fn get_attr_bool(&self, key: &str) -> Option<bool> {
        self.get_attr(key).and_then(AttrValue::as_bool)
    }

    /// Get string attribute value
    pub fn get_attr_string(&self, key: &str) -> Option<&[u8]> {
        self.get_attr(key).and_then(AttrValue::as_bytes)
    }

    /// Get integer list attribute
    pub fn get_attr_int_list(&self, key: &str) -> Option<&[i64]> {
        self.get_attr(key).and_then(AttrValue::as_int_list)
    }

    /// Get dtype attribute
    pub fn get_attr_dtype(&self, key: &str) -> Option<DataType> {
        self.get_attr(key).and_then(AttrValue::as_dtype)
    }

    /// Check if this node has a specific op type
    pub fn is_op(&self, op: &str) -> bool {
        self.op == op
    }

    /// Check if this node's op type is in the given list
    pub fn is_op_in(&self, ops: &[&str]) -> bool {
        ops.contains(&self.op.as_str())
    }

    /// Check if this node holds an embedded literal
    pub fn is_constant(&self) -> bool {
        is_constant_op(&self.op)
    }
}

// ============================================================================
// TensorShapeProto extensions
// ============================================================================

impl TensorShapeProto {
    /// Build a fully known shape from dimension sizes
    pub fn from_dims(dims: &[i64]) -> Self {
        Self {
            dim: dims
                .iter()
                .map(|&size| Dim {
                    size,
                    name: String::new(),
                })
                .collect(),
            unknown_rank: false,
        }
    }

    /// Dimension sizes, outermost first
    pub fn dims(&self) -> Vec<i64> {
        self.dim.iter().map(|d| d.size).collect()
    }
}

// ============================================================================
// GraphDef extensions
// ============================================================================

impl GraphDef {
    /// Wrap a flat node list
    pub fn from_nodes(node: Vec<NodeDef>) -> Self {
        Self {
            node,
            versions: None,
            ..Default::default()
        }
    }

    /// Find a node by name
    pub fn find_node(&self, name: &str) -> Option<&NodeDef> {
        self.node.iter().find(|n| n.name == name)
    }
}
