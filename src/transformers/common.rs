//! Common types for rewrite passes

use crate::error::RewriteResult;
use crate::graph::GraphIndex;

/// Statistics of one or more pass runs
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PassResult {
    /// Number of candidate sites found
    pub matched: usize,
    /// Number of rewrites applied
    pub applied: usize,
    /// Number of nodes removed from the graph
    pub removed: usize,
    /// Names of the nodes rewritten, in application order
    pub touched: Vec<String>,
}

impl PassResult {
    /// Create empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rewrite at `node` that removed `removed` nodes
    pub fn record(&mut self, node: &str, removed: usize) {
        self.applied += 1;
        self.removed += removed;
        self.touched.push(node.to_string());
    }

    /// Whether the run changed the graph
    pub fn changed(&self) -> bool {
        self.applied > 0
    }

    /// Merge with another result
    pub fn merge(&mut self, other: PassResult) {
        self.matched += other.matched;
        self.applied += other.applied;
        self.removed += other.removed;
        self.touched.extend(other.touched);
    }
}

/// A rewrite over a whole graph index
pub trait GraphPass {
    /// Name of the pass, used in logs
    fn name(&self) -> &'static str;

    /// Apply the pass once
    fn run(&self, index: &mut GraphIndex) -> RewriteResult<PassResult>;
}

/// Run `passes` once each, in order
pub fn run_passes(index: &mut GraphIndex, passes: &[&dyn GraphPass]) -> RewriteResult<PassResult> {
    let mut total = PassResult::new();
    for pass in passes {
        let result = pass.run(index)?;
        tracing::debug!(pass = pass.name(), applied = result.applied, "pass finished");
        total.merge(result);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_result() {
        let mut result = PassResult::new();
        assert!(!result.changed());

        result.matched = 3;
        result.record("id_1", 1);
        result.record("add", 3);

        assert!(result.changed());
        assert_eq!(result.applied, 2);
        assert_eq!(result.removed, 4);
        assert_eq!(result.touched, vec!["id_1", "add"]);
    }

    #[test]
    fn test_merge() {
        let mut total = PassResult::new();
        let mut first = PassResult::new();
        first.record("a", 1);
        let mut second = PassResult {
            matched: 2,
            ..Default::default()
        };
        second.record("b", 2);

        total.merge(first);
        total.merge(second);

        assert_eq!(total.matched, 2);
        assert_eq!(total.applied, 2);
        assert_eq!(total.removed, 3);
        assert_eq!(total.touched, vec!["a", "b"]);
    }
}
