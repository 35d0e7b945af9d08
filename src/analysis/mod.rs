//! Static analyses over a graph index
//!
//! - [`positivity`]: provable non-negativity of node outputs, used to pick
//!   unsigned quantization ranges

pub mod positivity;

pub use positivity::{sign_rule, PositivityAnalyzer, SignRule, MERGE_OPS, SIGN_PRESERVING_OPS};
