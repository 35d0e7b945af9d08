//! GraphDef data type mappings
//!
//! Maps between `DataType` enum values and Rust element types.

use crate::error::{RewriteError, RewriteResult};
use crate::proto::DataType;

/// Size in bytes of one element in `tensor_content`
pub fn dtype_size(dtype: DataType) -> RewriteResult<usize> {
    match dtype {
        DataType::Float | DataType::Int32 | DataType::Qint32 => Ok(4),
        DataType::Double | DataType::Int64 => Ok(8),
        DataType::Int16 | DataType::Half | DataType::Bfloat16 => Ok(2),
        DataType::Uint8 | DataType::Int8 | DataType::Bool | DataType::Qint8 | DataType::Quint8 => {
            Ok(1)
        }
        DataType::Invalid | DataType::String => Err(RewriteError::InvalidDataType(dtype as i32)),
    }
}

/// Convert i32 to DataType enum
pub fn i32_to_dtype(value: i32) -> RewriteResult<DataType> {
    DataType::try_from(value).map_err(|_| RewriteError::InvalidDataType(value))
}

/// Check if data type is floating point
pub fn is_float_type(dtype: DataType) -> bool {
    matches!(
        dtype,
        DataType::Float | DataType::Double | DataType::Half | DataType::Bfloat16
    )
}

/// Check if data type is a plain or quantized integer
pub fn is_int_type(dtype: DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Uint8
            | DataType::Qint8
            | DataType::Quint8
            | DataType::Qint32
    )
}
