//! Rewrite passes
//!
//! Ready-to-use passes over a [`GraphIndex`]:
//!
//! - **Elimination**: splice out pass-through nodes ([`RemoveIdentity`])
//! - **Constant folding**: evaluate binary ops over constants ([`FoldBinaryConstants`])
//!
//! Each pass implements the [`GraphPass`] trait and can be applied on its own
//! or through a [`PassPipeline`].
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::transformers::{GraphPass, PassPipeline, RemoveIdentity};
//!
//! let result = RemoveIdentity::new().run(&mut index)?;
//! println!("Removed {} nodes", result.removed);
//!
//! let total = PassPipeline::standard().run(&mut index)?;
//! ```

/// Common types
pub mod common;
/// Constant folding passes
pub mod constant_fold;
/// Elimination passes
pub mod eliminate;

pub use common::{run_passes, GraphPass, PassResult};
pub use constant_fold::{FoldBinaryConstants, FOLDABLE_OPS};
pub use eliminate::RemoveIdentity;

use crate::error::RewriteResult;
use crate::graph::GraphIndex;

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on full rounds over the pass list
    pub max_iterations: usize,
    /// Log a failing pass and carry on instead of returning its error
    pub continue_on_error: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            continue_on_error: false,
        }
    }
}

/// Ordered list of passes run to a fixed point
pub struct PassPipeline {
    passes: Vec<Box<dyn GraphPass>>,
    config: PipelineConfig,
}

impl Default for PassPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl PassPipeline {
    /// Create an empty pipeline
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            passes: Vec::new(),
            config,
        }
    }

    /// Constant folding followed by identity removal, default settings
    pub fn standard() -> Self {
        Self::default()
            .with_pass(FoldBinaryConstants::new())
            .with_pass(RemoveIdentity::new())
    }

    /// Append a pass
    pub fn with_pass<P: GraphPass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// The pipeline settings
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Names of the passes, in run order
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order until a round changes nothing
    ///
    /// Stops after `max_iterations` rounds at most.
    pub fn run(&self, index: &mut GraphIndex) -> RewriteResult<PassResult> {
        let mut total = PassResult::new();

        for iteration in 0..self.config.max_iterations {
            let mut round = PassResult::new();

            for pass in &self.passes {
                match pass.run(index) {
                    Ok(result) => {
                        tracing::debug!(
                            pass = pass.name(),
                            iteration,
                            applied = result.applied,
                            "pass finished"
                        );
                        round.merge(result);
                    }
                    Err(e) if self.config.continue_on_error => {
                        tracing::warn!(pass = pass.name(), error = %e, "pass failed, continuing");
                    }
                    Err(e) => return Err(e),
                }
            }

            let changed = round.changed();
            total.merge(round);
            if !changed {
                break;
            }
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{make_constant, make_node, Placement};
    use crate::error::RewriteError;
    use crate::proto::DataType;
    use crate::tensor::TensorValue;
    use std::cell::Cell;

    fn make_test_index() -> GraphIndex {
        let c = |name: &str, v: f32| {
            make_constant(name, &TensorValue::from(v), DataType::Float, None, Placement::Cpu)
                .unwrap()
        };
        GraphIndex::build(vec![
            c("one", 1.0),
            c("two", 2.0),
            make_node("Identity", "id", &["two"]),
            make_node("Add", "sum", &["one", "id"]),
            make_node("Relu", "relu", &["sum"]),
        ])
    }

    struct Failing;

    impl GraphPass for Failing {
        fn name(&self) -> &'static str {
            "Failing"
        }

        fn run(&self, _index: &mut GraphIndex) -> RewriteResult<PassResult> {
            Err(RewriteError::UnknownNode("missing".to_string()))
        }
    }

    struct Counting {
        runs: Cell<usize>,
    }

    impl GraphPass for Counting {
        fn name(&self) -> &'static str {
            "Counting"
        }

        fn run(&self, _index: &mut GraphIndex) -> RewriteResult<PassResult> {
            self.runs.set(self.runs.get() + 1);
            let mut result = PassResult::new();
            result.record("x", 0);
            Ok(result)
        }
    }

    #[test]
    fn test_standard_pipeline_reaches_fixed_point() {
        let mut index = make_test_index();
        let result = PassPipeline::standard().run(&mut index).unwrap();

        // Round 1 removes the identity, round 2 folds the add, round 3 is idle
        assert_eq!(result.applied, 2);
        assert_eq!(index.len(), 2);
        assert!(index.get_node("sum").unwrap().is_constant());
        assert_eq!(index.get_node("relu").unwrap().input, vec!["sum"]);
        index.check_consistency().unwrap();
    }

    #[test]
    fn test_error_propagates_by_default() {
        let mut index = make_test_index();
        let pipeline = PassPipeline::default().with_pass(Failing);
        assert!(pipeline.run(&mut index).is_err());
    }

    #[test]
    fn test_continue_on_error() {
        let mut index = make_test_index();
        let config = PipelineConfig {
            continue_on_error: true,
            ..Default::default()
        };
        let pipeline = PassPipeline::new(config)
            .with_pass(Failing)
            .with_pass(RemoveIdentity::new());

        let result = pipeline.run(&mut index).unwrap();
        assert_eq!(result.removed, 1);
        assert_eq!(pipeline.pass_names(), vec!["Failing", "RemoveIdentity"]);
    }

    #[test]
    fn test_iteration_cap() {
        let mut index = make_test_index();
        let config = PipelineConfig {
            max_iterations: 3,
            ..Default::default()
        };
        let pipeline = PassPipeline::new(config).with_pass(Counting { runs: Cell::new(0) });

        let result = pipeline.run(&mut index).unwrap();
        assert_eq!(result.applied, 3);
        assert_eq!(pipeline.config().max_iterations, 3);
    }
}
