//! Shape utilities for tensors

use crate::error::{RewriteError, RewriteResult};
use crate::proto::TensorProto;

/// Calculate total number of elements from shape
///
/// Negative (unknown) dimensions count as zero and a scalar has one element.
/// Fails with `ShapeMismatch` when the count does not fit an allocation.
pub fn numel(shape: &[i64]) -> RewriteResult<usize> {
    let count = shape.iter().try_fold(1usize, |acc, &d| {
        usize::try_from(d.max(0)).ok().and_then(|d| acc.checked_mul(d))
    });
    count
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| overflow(shape))
}

/// [`numel`] over already non-negative dimensions
pub fn element_count(shape: &[usize]) -> RewriteResult<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| overflow(shape))
}

fn overflow<D: std::fmt::Debug>(shape: &[D]) -> RewriteError {
    RewriteError::ShapeMismatch(format!("element count of shape {:?} overflows", shape))
}

/// Dimension sizes of a tensor literal (empty for scalars)
pub fn tensor_dims(tensor: &TensorProto) -> Vec<i64> {
    tensor
        .tensor_shape
        .as_ref()
        .map(|s| s.dims())
        .unwrap_or_default()
}

/// Check if shape contains dynamic dimensions (negative values)
pub fn is_dynamic(shape: &[i64]) -> bool {
    shape.iter().any(|&d| d < 0)
}

/// Numpy-style broadcast of two static shapes
///
/// Returns `None` when the shapes are not broadcast-compatible.
pub fn broadcast_shape(shape_a: &[usize], shape_b: &[usize]) -> Option<Vec<usize>> {
    let rank = shape_a.len().max(shape_b.len());
    let mut result = vec![0; rank];

    for i in 0..rank {
        let a = if i < shape_a.len() {
            shape_a[shape_a.len() - 1 - i]
        } else {
            1
        };
        let b = if i < shape_b.len() {
            shape_b[shape_b.len() - 1 - i]
        } else {
            1
        };

        result[rank - 1 - i] = match (a, b) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => return None,
        };
    }

    Some(result)
}
