//! Index consistency checks
//!
//! Verify that the outputs lists agree with the inputs that reference them.

use crate::error::{RewriteError, RewriteResult};

use super::index::GraphIndex;

/// Validation result with detailed issues
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Broken adjacency, in index order
    pub errors: Vec<RewriteError>,
    /// Non-critical findings such as isolated nodes
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Whether no errors were found
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add a warning
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

impl GraphIndex {
    /// Check the bidirectional adjacency invariant
    ///
    /// Returns the first violation found.
    pub fn check_consistency(&self) -> RewriteResult<()> {
        match self.validate().errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Collect every adjacency violation in the index
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (name, entry) in &self.entries {
            for input in &entry.node.input {
                let producer = self.names.node_name(input);
                match self.entries.get(&producer) {
                    None => result.errors.push(RewriteError::DanglingReference {
                        node: name.clone(),
                        missing: producer,
                    }),
                    Some(p) if !p.has_output(name) => {
                        result.errors.push(RewriteError::InconsistentOutputs {
                            producer,
                            consumer: name.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }

            for output in &entry.outputs {
                let linked = self
                    .get_node(output)
                    .map(|consumer| self.references(consumer, name))
                    .unwrap_or(false);
                if !linked {
                    result.errors.push(RewriteError::InconsistentOutputs {
                        producer: name.clone(),
                        consumer: output.clone(),
                    });
                }
            }

            if entry.node.input.is_empty() && entry.outputs.is_empty() && !entry.node.is_constant()
            {
                result.add_warning(format!("Node {} is isolated", name));
            }
        }

        result
    }
}
