//! Elimination passes
//!
//! Passes that remove pass-through nodes from the graph.

use crate::error::RewriteResult;
use crate::graph::GraphIndex;
use crate::pattern::{PatternBuilder, IDENTITY_OPS};

use super::common::{GraphPass, PassResult};

/// Splice out `Identity`, `Snapshot` and `StopGradient` nodes
///
/// Nodes that cannot be spliced (several non-constant inputs, no data input)
/// are skipped.
#[derive(Debug, Default)]
pub struct RemoveIdentity;

impl RemoveIdentity {
    /// Create the pass
    pub fn new() -> Self {
        Self
    }
}

impl GraphPass for RemoveIdentity {
    fn name(&self) -> &'static str {
        "RemoveIdentity"
    }

    fn run(&self, index: &mut GraphIndex) -> RewriteResult<PassResult> {
        let mut result = PassResult::new();

        let pattern = PatternBuilder::new().any_of(IDENTITY_OPS).build();
        let candidates: Vec<String> = index
            .search_patterns(&pattern)
            .into_iter()
            .map(|m| m.last().to_string())
            .collect();
        result.matched = candidates.len();

        for name in candidates {
            match index.splice_single_input(&name) {
                Ok(()) => result.record(&name, 1),
                Err(e) => tracing::debug!(node = %name, error = %e, "identity kept"),
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::make_node;

    #[test]
    fn test_remove_identity_chain() {
        let mut index = GraphIndex::build(vec![
            make_node("Placeholder", "x", &[]),
            make_node("Identity", "id_1", &["x"]),
            make_node("Snapshot", "id_2", &["id_1"]),
            make_node("Relu", "relu", &["id_2", "^id_1"]),
        ]);

        let result = RemoveIdentity::new().run(&mut index).unwrap();

        assert_eq!(result.matched, 2);
        assert_eq!(result.removed, 2);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get_node("relu").unwrap().input, vec!["x", "^x"]);
        assert_eq!(index.consumers("x"), &["relu".to_string()]);
        index.check_consistency().unwrap();
    }

    #[test]
    fn test_unspliceable_identity_is_skipped() {
        let mut index = GraphIndex::build(vec![
            make_node("Placeholder", "a", &[]),
            make_node("Placeholder", "b", &[]),
            make_node("Identity", "id", &["a", "b"]),
            make_node("StopGradient", "sg", &["^a"]),
        ]);

        let result = RemoveIdentity::new().run(&mut index).unwrap();

        assert_eq!(result.matched, 2);
        assert!(!result.changed());
        assert_eq!(index.len(), 4);
    }
}
