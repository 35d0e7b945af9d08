//! Tensor conversion utilities
//!
//! Convert between `TensorProto` literals and ndarray-backed [`TensorValue`]s.

use ndarray::{ArrayD, IxDyn};

use crate::error::{RewriteError, RewriteResult};
use crate::proto::{DataType, TensorProto, TensorShapeProto};

use super::dtype::{dtype_size, i32_to_dtype};
use super::shape::{element_count, numel, tensor_dims};

/// Decoded value of a tensor literal
///
/// Narrow integer types (int8, int16, uint8 and the quantized variants) are
/// widened to `Int32`, matching how the wire format stores them.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    /// 32-bit floats
    Float(ArrayD<f32>),
    /// 64-bit floats
    Double(ArrayD<f64>),
    /// 32-bit (or narrower) integers
    Int32(ArrayD<i32>),
    /// 64-bit integers
    Int64(ArrayD<i64>),
    /// Booleans
    Bool(ArrayD<bool>),
}

/// Element storage used for a given dtype
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Storage {
    Float,
    Double,
    Int32,
    Int64,
    Bool,
}

fn storage_for(dtype: DataType) -> RewriteResult<Storage> {
    match dtype {
        DataType::Float => Ok(Storage::Float),
        DataType::Double => Ok(Storage::Double),
        DataType::Int32
        | DataType::Int16
        | DataType::Int8
        | DataType::Uint8
        | DataType::Qint8
        | DataType::Quint8
        | DataType::Qint32 => Ok(Storage::Int32),
        DataType::Int64 => Ok(Storage::Int64),
        DataType::Bool => Ok(Storage::Bool),
        _ => Err(RewriteError::InvalidDataType(dtype as i32)),
    }
}

impl TensorValue {
    /// Shape of the held array
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Float(a) => a.shape(),
            Self::Double(a) => a.shape(),
            Self::Int32(a) => a.shape(),
            Self::Int64(a) => a.shape(),
            Self::Bool(a) => a.shape(),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    /// Check if the value holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dtype this value is stored as
    pub fn natural_dtype(&self) -> DataType {
        match self {
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Bool(_) => DataType::Bool,
        }
    }

    /// Convert element-wise to the storage of `dtype`
    pub fn cast(&self, dtype: DataType) -> RewriteResult<TensorValue> {
        let value = match storage_for(dtype)? {
            Storage::Float => Self::Float(match self {
                Self::Float(a) => a.clone(),
                Self::Double(a) => a.mapv(|v| v as f32),
                Self::Int32(a) => a.mapv(|v| v as f32),
                Self::Int64(a) => a.mapv(|v| v as f32),
                Self::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
            }),
            Storage::Double => Self::Double(match self {
                Self::Float(a) => a.mapv(f64::from),
                Self::Double(a) => a.clone(),
                Self::Int32(a) => a.mapv(f64::from),
                Self::Int64(a) => a.mapv(|v| v as f64),
                Self::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
            }),
            Storage::Int32 => Self::Int32(match self {
                Self::Float(a) => a.mapv(|v| v as i32),
                Self::Double(a) => a.mapv(|v| v as i32),
                Self::Int32(a) => a.clone(),
                Self::Int64(a) => a.mapv(|v| v as i32),
                Self::Bool(a) => a.mapv(i32::from),
            }),
            Storage::Int64 => Self::Int64(match self {
                Self::Float(a) => a.mapv(|v| v as i64),
                Self::Double(a) => a.mapv(|v| v as i64),
                Self::Int32(a) => a.mapv(i64::from),
                Self::Int64(a) => a.clone(),
                Self::Bool(a) => a.mapv(i64::from),
            }),
            Storage::Bool => Self::Bool(match self {
                Self::Float(a) => a.mapv(|v| v != 0.0),
                Self::Double(a) => a.mapv(|v| v != 0.0),
                Self::Int32(a) => a.mapv(|v| v != 0),
                Self::Int64(a) => a.mapv(|v| v != 0),
                Self::Bool(a) => a.clone(),
            }),
        };
        Ok(value)
    }

    /// Reshape to `dims`, broadcasting a single element if necessary
    pub fn fit_to_shape(self, dims: &[i64]) -> RewriteResult<TensorValue> {
        if dims.iter().any(|&d| d < 0) {
            return Err(RewriteError::ShapeMismatch(format!(
                "Cannot build a constant with dynamic shape {:?}",
                dims
            )));
        }
        let shape: Vec<usize> = dims.iter().map(|&d| d as usize).collect();

        Ok(match self {
            Self::Float(a) => Self::Float(fit(a, &shape)?),
            Self::Double(a) => Self::Double(fit(a, &shape)?),
            Self::Int32(a) => Self::Int32(fit(a, &shape)?),
            Self::Int64(a) => Self::Int64(fit(a, &shape)?),
            Self::Bool(a) => Self::Bool(fit(a, &shape)?),
        })
    }

    /// Float view of the value, casting if needed
    pub fn to_f32_array(&self) -> ArrayD<f32> {
        match self {
            Self::Float(a) => a.clone(),
            Self::Double(a) => a.mapv(|v| v as f32),
            Self::Int32(a) => a.mapv(|v| v as f32),
            Self::Int64(a) => a.mapv(|v| v as f32),
            Self::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
        }
    }
}

impl From<f32> for TensorValue {
    fn from(value: f32) -> Self {
        Self::Float(ArrayD::from_elem(IxDyn(&[]), value))
    }
}

impl From<i32> for TensorValue {
    fn from(value: i32) -> Self {
        Self::Int32(ArrayD::from_elem(IxDyn(&[]), value))
    }
}

impl From<i64> for TensorValue {
    fn from(value: i64) -> Self {
        Self::Int64(ArrayD::from_elem(IxDyn(&[]), value))
    }
}

impl From<bool> for TensorValue {
    fn from(value: bool) -> Self {
        Self::Bool(ArrayD::from_elem(IxDyn(&[]), value))
    }
}

impl From<Vec<f32>> for TensorValue {
    fn from(values: Vec<f32>) -> Self {
        Self::Float(ndarray::Array1::from(values).into_dyn())
    }
}

impl From<Vec<i32>> for TensorValue {
    fn from(values: Vec<i32>) -> Self {
        Self::Int32(ndarray::Array1::from(values).into_dyn())
    }
}

impl From<Vec<i64>> for TensorValue {
    fn from(values: Vec<i64>) -> Self {
        Self::Int64(ndarray::Array1::from(values).into_dyn())
    }
}

impl From<ArrayD<f32>> for TensorValue {
    fn from(array: ArrayD<f32>) -> Self {
        Self::Float(array)
    }
}

/// Decode a tensor literal
///
/// Handles both `tensor_content` and the typed `*_val` fields. A typed field
/// shorter than the shape is padded with its last element; an empty one is
/// zero-filled.
pub fn tensor_to_value(tensor: &TensorProto) -> RewriteResult<TensorValue> {
    let dtype = i32_to_dtype(tensor.dtype)?;
    let dims = tensor_dims(tensor);
    let expected = numel(&dims)?;
    let shape: Vec<usize> = dims.iter().map(|&d| d.max(0) as usize).collect();

    let value = if !tensor.tensor_content.is_empty() {
        decode_content(&tensor.tensor_content, dtype, expected)?
    } else {
        match storage_for(dtype)? {
            Storage::Float => {
                TensorValue::Float(ndarray::Array1::from(tensor.float_val.clone()).into_dyn())
            }
            Storage::Double => {
                TensorValue::Double(ndarray::Array1::from(tensor.double_val.clone()).into_dyn())
            }
            Storage::Int32 => {
                TensorValue::Int32(ndarray::Array1::from(tensor.int_val.clone()).into_dyn())
            }
            Storage::Int64 => {
                TensorValue::Int64(ndarray::Array1::from(tensor.int64_val.clone()).into_dyn())
            }
            Storage::Bool => {
                TensorValue::Bool(ndarray::Array1::from(tensor.bool_val.clone()).into_dyn())
            }
        }
    };

    Ok(match value {
        TensorValue::Float(a) => TensorValue::Float(pad_to_shape(a, &shape)?),
        TensorValue::Double(a) => TensorValue::Double(pad_to_shape(a, &shape)?),
        TensorValue::Int32(a) => TensorValue::Int32(pad_to_shape(a, &shape)?),
        TensorValue::Int64(a) => TensorValue::Int64(pad_to_shape(a, &shape)?),
        TensorValue::Bool(a) => TensorValue::Bool(pad_to_shape(a, &shape)?),
    })
}

/// Build a tensor literal from a value
///
/// The value is cast to `dtype`; when `shape` is given it is reshaped (or a
/// single element broadcast) to it.
pub fn value_to_tensor(
    value: &TensorValue,
    dtype: DataType,
    shape: Option<&[i64]>,
) -> RewriteResult<TensorProto> {
    let mut value = value.cast(dtype)?;
    if let Some(dims) = shape {
        value = value.fit_to_shape(dims)?;
    }

    let dims: Vec<i64> = value.shape().iter().map(|&d| d as i64).collect();
    let mut tensor = TensorProto {
        dtype: dtype as i32,
        tensor_shape: Some(TensorShapeProto::from_dims(&dims)),
        ..Default::default()
    };

    match value {
        TensorValue::Float(a) => tensor.float_val = a.iter().copied().collect(),
        TensorValue::Double(a) => tensor.double_val = a.iter().copied().collect(),
        TensorValue::Int32(a) => tensor.int_val = a.iter().copied().collect(),
        TensorValue::Int64(a) => tensor.int64_val = a.iter().copied().collect(),
        TensorValue::Bool(a) => tensor.bool_val = a.iter().copied().collect(),
    }

    Ok(tensor)
}

// ============================================================================
// Internal helpers
// ============================================================================

fn fit<T: Clone>(array: ArrayD<T>, shape: &[usize]) -> RewriteResult<ArrayD<T>> {
    let expected = element_count(shape)?;

    if array.len() == expected {
        let data: Vec<T> = array.iter().cloned().collect();
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map_err(|e| RewriteError::ShapeMismatch(e.to_string()))
    } else if array.len() == 1 {
        let elem = array
            .iter()
            .next()
            .cloned()
            .ok_or_else(|| RewriteError::ShapeMismatch("empty value".to_string()))?;
        Ok(ArrayD::from_elem(IxDyn(shape), elem))
    } else {
        Err(RewriteError::ShapeMismatch(format!(
            "{} elements do not fit shape {:?}",
            array.len(),
            shape
        )))
    }
}

fn pad_to_shape<T: Clone + Default>(array: ArrayD<T>, shape: &[usize]) -> RewriteResult<ArrayD<T>> {
    let expected = element_count(shape)?;
    let mut data: Vec<T> = array.iter().cloned().collect();

    if data.len() > expected {
        return Err(RewriteError::ShapeMismatch(format!(
            "Data length {} exceeds shape {:?} (expected {})",
            data.len(),
            shape,
            expected
        )));
    }
    let filler = data.last().cloned().unwrap_or_default();
    data.resize(expected, filler);

    ArrayD::from_shape_vec(IxDyn(shape), data)
        .map_err(|e| RewriteError::ShapeMismatch(e.to_string()))
}

fn decode_content(raw: &[u8], dtype: DataType, expected: usize) -> RewriteResult<TensorValue> {
    let elem_size = dtype_size(dtype)?;
    if expected.checked_mul(elem_size) != Some(raw.len()) {
        return Err(RewriteError::ShapeMismatch(format!(
            "Content size {} does not match expected {} * {}",
            raw.len(),
            expected,
            elem_size
        )));
    }

    let value = match dtype {
        DataType::Float => TensorValue::Float(to_array(
            raw.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        )),
        DataType::Double => TensorValue::Double(to_array(raw.chunks_exact(8).map(|b| {
            f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }))),
        DataType::Int32 | DataType::Qint32 => TensorValue::Int32(to_array(
            raw.chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        )),
        DataType::Int16 => TensorValue::Int32(to_array(
            raw.chunks_exact(2)
                .map(|b| i32::from(i16::from_le_bytes([b[0], b[1]]))),
        )),
        DataType::Int8 | DataType::Qint8 => {
            TensorValue::Int32(to_array(raw.iter().map(|&b| i32::from(b as i8))))
        }
        DataType::Uint8 | DataType::Quint8 => {
            TensorValue::Int32(to_array(raw.iter().map(|&b| i32::from(b))))
        }
        DataType::Int64 => TensorValue::Int64(to_array(raw.chunks_exact(8).map(|b| {
            i64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }))),
        DataType::Bool => TensorValue::Bool(to_array(raw.iter().map(|&b| b != 0))),
        _ => return Err(RewriteError::InvalidDataType(dtype as i32)),
    };

    Ok(value)
}

fn to_array<T>(values: impl Iterator<Item = T>) -> ArrayD<T> {
    ndarray::Array1::from_iter(values).into_dyn()
}
