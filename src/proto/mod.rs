//! TensorFlow GraphDef protocol buffer types
//!
//! The subset of `tensorflow/core/framework/*.proto` needed to hold a graph in
//! memory and to round-trip it through the binary wire format. Field numbers
//! follow the upstream definitions so that files written by TensorFlow decode
//! here unchanged. Message fields the rewriter never looks inside (the
//! function library, debug info, resource handles) are declared as raw bytes
//! so that a load-then-store carries them through verbatim. Additional helper
//! methods live in [`extensions`].

#![allow(missing_docs)]

use std::collections::BTreeMap;

/// Element type of a tensor (`types.proto`)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DataType {
    Invalid = 0,
    Float = 1,
    Double = 2,
    Int32 = 3,
    Uint8 = 4,
    Int16 = 5,
    Int8 = 6,
    String = 7,
    Int64 = 9,
    Bool = 10,
    Qint8 = 11,
    Quint8 = 12,
    Qint32 = 13,
    Bfloat16 = 14,
    Half = 19,
}

/// One dimension of a tensor shape
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Dim {
    /// Size of the dimension, -1 when unknown
    #[prost(int64, tag = "1")]
    pub size: i64,
    /// Optional dimension name
    #[prost(string, tag = "2")]
    pub name: String,
}

/// Tensor shape (`tensor_shape.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorShapeProto {
    /// Dimensions, outermost first
    #[prost(message, repeated, tag = "2")]
    pub dim: Vec<Dim>,
    /// True when even the rank is unknown
    #[prost(bool, tag = "3")]
    pub unknown_rank: bool,
}

/// Tensor literal (`tensor.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TensorProto {
    #[prost(enumeration = "DataType", tag = "1")]
    pub dtype: i32,
    #[prost(message, optional, tag = "2")]
    pub tensor_shape: Option<TensorShapeProto>,
    #[prost(int32, tag = "3")]
    pub version_number: i32,
    /// Little-endian packed element bytes
    #[prost(bytes = "vec", tag = "4")]
    pub tensor_content: Vec<u8>,
    #[prost(float, repeated, tag = "5")]
    pub float_val: Vec<f32>,
    #[prost(double, repeated, tag = "6")]
    pub double_val: Vec<f64>,
    /// Also carries int16/int8/uint8 values
    #[prost(int32, repeated, tag = "7")]
    pub int_val: Vec<i32>,
    #[prost(bytes = "vec", repeated, tag = "8")]
    pub string_val: Vec<Vec<u8>>,
    /// Interleaved real and imaginary parts of complex64 values
    #[prost(float, repeated, tag = "9")]
    pub scomplex_val: Vec<f32>,
    #[prost(int64, repeated, tag = "10")]
    pub int64_val: Vec<i64>,
    #[prost(bool, repeated, tag = "11")]
    pub bool_val: Vec<bool>,
    /// Interleaved real and imaginary parts of complex128 values
    #[prost(double, repeated, tag = "12")]
    pub dcomplex_val: Vec<f64>,
    /// Raw IEEE half and bfloat16 bit patterns
    #[prost(int32, repeated, tag = "13")]
    pub half_val: Vec<i32>,
    /// Encoded `ResourceHandleProto` messages, kept opaque
    #[prost(bytes = "vec", repeated, tag = "14")]
    pub resource_handle_val: Vec<Vec<u8>>,
    /// Encoded `VariantTensorDataProto` messages, kept opaque
    #[prost(bytes = "vec", repeated, tag = "15")]
    pub variant_val: Vec<Vec<u8>>,
    #[prost(uint32, repeated, tag = "16")]
    pub uint32_val: Vec<u32>,
    #[prost(uint64, repeated, tag = "17")]
    pub uint64_val: Vec<u64>,
    /// One byte per float8 element
    #[prost(bytes = "vec", tag = "18")]
    pub float8_val: Vec<u8>,
}

/// Attribute value (`attr_value.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AttrValue {
    #[prost(oneof = "attr_value::Value", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub value: Option<attr_value::Value>,
}

/// Nested types of [`AttrValue`]
pub mod attr_value {
    /// List payload of an attribute
    ///
    /// Only integer lists are part of the supported attribute set; the other
    /// fields are decoded so that unsupported lists can be detected and rejected.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ListValue {
        #[prost(bytes = "vec", repeated, tag = "2")]
        pub s: Vec<Vec<u8>>,
        #[prost(int64, repeated, tag = "3")]
        pub i: Vec<i64>,
        #[prost(float, repeated, tag = "4")]
        pub f: Vec<f32>,
        #[prost(bool, repeated, tag = "5")]
        pub b: Vec<bool>,
        #[prost(enumeration = "super::DataType", repeated, tag = "6")]
        pub r#type: Vec<i32>,
        #[prost(message, repeated, tag = "7")]
        pub shape: Vec<super::TensorShapeProto>,
        #[prost(message, repeated, tag = "8")]
        pub tensor: Vec<super::TensorProto>,
    }

    /// The single value held by an attribute
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        List(ListValue),
        #[prost(bytes = "vec", tag = "2")]
        S(Vec<u8>),
        #[prost(int64, tag = "3")]
        I(i64),
        #[prost(float, tag = "4")]
        F(f32),
        #[prost(bool, tag = "5")]
        B(bool),
        #[prost(enumeration = "super::DataType", tag = "6")]
        Type(i32),
        #[prost(message, tag = "7")]
        Shape(super::TensorShapeProto),
        #[prost(message, tag = "8")]
        Tensor(super::TensorProto),
    }
}

/// A single operation instance (`node_def.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeDef {
    /// Unique node name
    #[prost(string, tag = "1")]
    pub name: String,
    /// Operation type
    #[prost(string, tag = "2")]
    pub op: String,
    /// Data references `name[:port]` followed by control references `^name`
    #[prost(string, repeated, tag = "3")]
    pub input: Vec<String>,
    /// Requested device placement, carried verbatim
    #[prost(string, tag = "4")]
    pub device: String,
    /// Attributes, ordered by key
    #[prost(btree_map = "string, message", tag = "5")]
    pub attr: BTreeMap<String, AttrValue>,
    /// Encoded `ExperimentalDebugInfo`, kept opaque
    #[prost(bytes = "vec", tag = "6")]
    pub experimental_debug_info: Vec<u8>,
    /// Encoded `FullTypeDef`, kept opaque
    #[prost(bytes = "vec", tag = "7")]
    pub experimental_type: Vec<u8>,
}

/// Graph version information (`versions.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VersionDef {
    #[prost(int32, tag = "1")]
    pub producer: i32,
    #[prost(int32, tag = "2")]
    pub min_consumer: i32,
    #[prost(int32, repeated, tag = "3")]
    pub bad_consumers: Vec<i32>,
}

/// A flat list of nodes (`graph.proto`)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GraphDef {
    #[prost(message, repeated, tag = "1")]
    pub node: Vec<NodeDef>,
    /// Encoded `FunctionDefLibrary`, kept opaque so functions survive a rewrite
    #[prost(bytes = "vec", tag = "2")]
    pub library: Vec<u8>,
    /// Deprecated single version number
    #[prost(int32, tag = "3")]
    pub version: i32,
    #[prost(message, optional, tag = "4")]
    pub versions: Option<VersionDef>,
    /// Encoded `GraphDebugInfo`, kept opaque
    #[prost(bytes = "vec", tag = "5")]
    pub debug_info: Vec<u8>,
}

/// Extension methods for the protobuf types
pub mod extensions;

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_node_def_default() {
        let node = NodeDef::default();
        assert!(node.input.is_empty());
        assert!(node.attr.is_empty());
    }

    #[test]
    fn test_dtype_accessor() {
        let tensor = TensorProto {
            dtype: DataType::Int64 as i32,
            ..Default::default()
        };
        assert_eq!(tensor.dtype(), DataType::Int64);
        assert_eq!(DataType::try_from(10), Ok(DataType::Bool));
        assert!(DataType::try_from(8).is_err());
    }

    #[test]
    fn test_node_def_wire_round_trip() {
        let mut node = NodeDef {
            name: "conv".to_string(),
            op: "Conv2D".to_string(),
            input: vec!["x".to_string(), "w:0".to_string(), "^init".to_string()],
            ..Default::default()
        };
        node.attr.insert(
            "strides".to_string(),
            AttrValue {
                value: Some(attr_value::Value::List(attr_value::ListValue {
                    i: vec![1, 1, 1, 1],
                    ..Default::default()
                })),
            },
        );

        let bytes = node.encode_to_vec();
        let decoded = NodeDef::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, node);
    }
}
