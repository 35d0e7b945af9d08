//! Constant Folding Transformer
//!
//! Evaluates element-wise binary ops whose inputs are both float constants
//! and replaces them with a single constant node.

use ndarray::{ArrayD, IxDyn, Zip};

use crate::builder::{extract_constant_value, make_constant, Placement};
use crate::error::RewriteResult;
use crate::graph::GraphIndex;
use crate::proto::extensions::HOST_CONST_OP;
use crate::proto::{DataType, NodeDef};
use crate::tensor::{broadcast_shape, TensorValue};

use super::common::{GraphPass, PassResult};

/// Binary ops this pass can evaluate
pub const FOLDABLE_OPS: &[&str] = &["Add", "AddV2", "Sub", "Mul"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    fn from_op(op: &str) -> Option<Self> {
        match op {
            "Add" | "AddV2" => Some(Self::Add),
            "Sub" => Some(Self::Sub),
            "Mul" => Some(Self::Mul),
            _ => None,
        }
    }

    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => a * b,
        }
    }
}

/// Fold `Add`/`AddV2`/`Sub`/`Mul` over two float constants
///
/// The folded constant keeps the name of the op it replaces, so consumers
/// need no rewriting. It is placed on the accelerator when either operand
/// was.
#[derive(Debug, Default)]
pub struct FoldBinaryConstants;

impl FoldBinaryConstants {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }

    /// Compute the folded constant for `node`, if it is foldable
    fn evaluate(&self, index: &GraphIndex, node: &NodeDef) -> Option<NodeDef> {
        let op = BinaryOp::from_op(&node.op)?;
        let [lhs, rhs] = node.input.as_slice() else {
            return None;
        };

        let names = index.normalizer();
        let (lhs, rhs) = (names.resolve(lhs), names.resolve(rhs));
        if !lhs.is_data() || !rhs.is_data() || lhs.port != 0 || rhs.port != 0 {
            return None;
        }

        let a_node = index.get_node(&lhs.node)?;
        let b_node = index.get_node(&rhs.node)?;
        let a = float_constant(a_node)?;
        let b = float_constant(b_node)?;

        let Some(shape) = broadcast_shape(a.shape(), b.shape()) else {
            tracing::debug!(
                node = %node.name,
                lhs = ?a.shape(),
                rhs = ?b.shape(),
                "operand shapes do not broadcast"
            );
            return None;
        };
        let a = a.broadcast(IxDyn(&shape))?;
        let b = b.broadcast(IxDyn(&shape))?;
        let folded: ArrayD<f32> = Zip::from(&a).and(&b).map_collect(|&x, &y| op.apply(x, y));

        let placement = if a_node.is_op(HOST_CONST_OP) || b_node.is_op(HOST_CONST_OP) {
            Placement::Accelerator
        } else {
            Placement::Cpu
        };

        make_constant(
            &node.name,
            &TensorValue::Float(folded),
            DataType::Float,
            None,
            placement,
        )
        .inspect_err(|e| {
            tracing::debug!(node = %node.name, error = %e, "cannot build folded constant");
        })
        .ok()
    }
}

/// Float literal of a constant node
fn float_constant(node: &NodeDef) -> Option<ArrayD<f32>> {
    match extract_constant_value(node).ok()? {
        TensorValue::Float(array) => Some(array),
        _ => None,
    }
}

impl GraphPass for FoldBinaryConstants {
    fn name(&self) -> &'static str {
        "FoldBinaryConstants"
    }

    fn run(&self, index: &mut GraphIndex) -> RewriteResult<PassResult> {
        let mut result = PassResult::new();

        let candidates: Vec<String> = index
            .find_nodes_by_ops(FOLDABLE_OPS)
            .into_iter()
            .map(|n| n.name.clone())
            .collect();

        for name in candidates {
            let Some(node) = index.get_node(&name) else {
                continue;
            };
            let Some(folded) = self.evaluate(index, node) else {
                continue;
            };
            result.matched += 1;

            let before = index.len();
            index.fold_constant_subgraph(folded, &name)?;
            let removed = before - index.len();
            result.record(&name, removed);
            tracing::debug!(node = %name, removed, "binary op folded");
        }

        Ok(result)
    }
}
