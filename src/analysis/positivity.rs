//! Provable non-negativity of node outputs
//!
//! A conservative check: `true` only when the producing chain guarantees the
//! output is never negative, e.g. a max-pool over a ReLU.

use rustc_hash::FxHashMap;

use crate::graph::GraphIndex;

/// Ops whose output is non-negative iff every data input is
pub const MERGE_OPS: &[&str] = &["Concat", "Add", "AddV2", "AddN"];

/// Ops that keep the sign guarantee of their first input
pub const SIGN_PRESERVING_OPS: &[&str] = &[
    "Conv2D",
    "DepthwiseConv2D",
    "DepthwiseConv2dNative",
    "QuantizeV2",
    "MaxPool",
    "AvgPool",
    "Requantize",
    "Pad",
    "CropAndResize",
    "Dequantize",
    "Mean",
    "MatMul",
];

/// How an op's sign depends on its inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignRule {
    /// Always non-negative
    NonNegative,
    /// Non-negative iff every data input is
    AllInputs,
    /// Non-negative iff the first input is
    FirstInput,
    /// Nothing can be proven
    Unknown,
}

/// Classify an op type
pub fn sign_rule(op: &str) -> SignRule {
    if op == "Relu" || op == "Relu6" || op.contains("AndRelu") {
        SignRule::NonNegative
    } else if op.starts_with("Quantized") {
        SignRule::Unknown
    } else if MERGE_OPS.contains(&op) {
        SignRule::AllInputs
    } else if SIGN_PRESERVING_OPS.contains(&op) {
        SignRule::FirstInput
    } else {
        SignRule::Unknown
    }
}

#[derive(Debug, Clone, Copy)]
enum Visit {
    InProgress,
    Done(bool),
}

/// Memoizing positivity evaluator
///
/// Results are cached by node name for the lifetime of the analyzer. A node
/// reached again while its own evaluation is in progress counts as `false`.
pub struct PositivityAnalyzer<'a> {
    index: &'a GraphIndex,
    memo: FxHashMap<String, Visit>,
}

impl<'a> PositivityAnalyzer<'a> {
    /// Create an analyzer with an empty memo
    pub fn new(index: &'a GraphIndex) -> Self {
        Self {
            index,
            memo: FxHashMap::default(),
        }
    }

    /// Check whether the output of `name` is provably non-negative
    pub fn is_nonnegative(&mut self, name: &str) -> bool {
        match self.memo.get(name) {
            Some(Visit::Done(result)) => return *result,
            Some(Visit::InProgress) => return false,
            None => {}
        }

        let index = self.index;
        let Some(node) = index.get_node(name) else {
            tracing::trace!(node = %name, "unresolved producer");
            return false;
        };

        self.memo.insert(name.to_string(), Visit::InProgress);
        let names = index.normalizer();
        let result = match sign_rule(&node.op) {
            SignRule::NonNegative => true,
            SignRule::Unknown => false,
            SignRule::AllInputs => node
                .input
                .iter()
                .map(|input| names.resolve(input))
                .filter(|r| r.is_data())
                .all(|r| self.is_nonnegative(&r.node)),
            SignRule::FirstInput => match node.input.first() {
                Some(input) => self.is_nonnegative(&names.node_name(input)),
                None => false,
            },
        };

        self.memo.insert(name.to_string(), Visit::Done(result));
        tracing::trace!(node = %name, op = %node.op, result, "positivity evaluated");
        result
    }
}

impl GraphIndex {
    /// Check whether the output of `name` is provably non-negative
    pub fn has_provable_nonnegative_output(&self, name: &str) -> bool {
        PositivityAnalyzer::new(self).is_nonnegative(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::make_node;
    use rstest::rstest;

    fn make_test_index() -> GraphIndex {
        GraphIndex::build(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Relu", "relu", &["x"]),
            make_node("Relu6", "relu6", &["x"]),
            make_node("MaxPool", "pool", &["relu"]),
            make_node("Conv2D", "conv_raw", &["x"]),
            make_node("Concat", "concat_pos", &["relu", "pool"]),
            make_node("Concat", "concat_mixed", &["relu", "conv_raw"]),
            make_node("AddN", "addn", &["relu6", "pool", "^conv_raw"]),
            make_node("QuantizedConv2DAndRelu", "qconv_relu", &["x"]),
            make_node("QuantizedConv2D", "qconv", &["relu"]),
            make_node("Requantize", "requant", &["qconv_relu"]),
            make_node("Mean", "orphan_mean", &["ghost"]),
            make_node("Pad", "no_input_pad", &[]),
        ])
    }

    #[rstest]
    #[case("relu", true)]
    #[case("relu6", true)]
    #[case("pool", true)]
    #[case("conv_raw", false)]
    #[case("concat_pos", true)]
    #[case("concat_mixed", false)]
    #[case("addn", true)]
    #[case("qconv_relu", true)]
    #[case("qconv", false)]
    #[case("requant", true)]
    #[case("orphan_mean", false)]
    #[case("no_input_pad", false)]
    #[case("x", false)]
    #[case("ghost", false)]
    fn test_has_provable_nonnegative_output(#[case] node: &str, #[case] expected: bool) {
        let index = make_test_index();
        assert_eq!(index.has_provable_nonnegative_output(node), expected);
    }

    #[test]
    fn test_cycle_counts_as_unproven() {
        let index = GraphIndex::build(vec![
            make_node("Relu", "relu", &[]),
            make_node("Add", "a", &["relu", "b"]),
            make_node("Add", "b", &["a"]),
        ]);
        assert!(!index.has_provable_nonnegative_output("a"));
    }

    #[test]
    fn test_memo_is_reused() {
        let index = make_test_index();
        let mut analyzer = PositivityAnalyzer::new(&index);
        assert!(analyzer.is_nonnegative("concat_pos"));
        assert!(analyzer.is_nonnegative("pool"));
        assert!(!analyzer.is_nonnegative("concat_mixed"));
    }

    #[test]
    fn test_sign_rule() {
        assert_eq!(sign_rule("Relu"), SignRule::NonNegative);
        assert_eq!(sign_rule("QuantizedMaxPool"), SignRule::Unknown);
        assert_eq!(sign_rule("AddV2"), SignRule::AllInputs);
        assert_eq!(sign_rule("MatMul"), SignRule::FirstInput);
        assert_eq!(sign_rule("Sigmoid"), SignRule::Unknown);
    }
}
