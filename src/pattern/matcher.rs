//! Pattern matching engine for graph indexes
//!
//! Implements backward (consumer-to-producer) matching along first inputs,
//! with optional tokens and longest-match deduplication.

use rustc_hash::FxHashMap;

use crate::graph::GraphIndex;
use crate::proto::NodeDef;

use super::ops::Pattern;

/// Result of a successful pattern match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Matched node names, earliest producer first
    pub nodes: Vec<String>,
    /// Op types of the matched nodes, parallel to `nodes`
    pub op_types: Vec<String>,
}

impl PatternMatch {
    /// Name of the earliest matched producer (the deduplication key)
    pub fn first(&self) -> &str {
        self.nodes.first().map(String::as_str).unwrap_or_default()
    }

    /// Name of the last matched consumer (the anchor)
    pub fn last(&self) -> &str {
        self.nodes.last().map(String::as_str).unwrap_or_default()
    }

    /// Number of matched nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Pattern matcher over a [`GraphIndex`]
pub struct PatternMatcher<'a> {
    index: &'a GraphIndex,
}

impl<'a> PatternMatcher<'a> {
    /// Create a new pattern matcher
    pub fn new(index: &'a GraphIndex) -> Self {
        Self { index }
    }

    /// Match `pattern` ending at `node`
    ///
    /// The last token that can be aligned with `node` is found by scanning
    /// backward over optional tokens. From there the walk follows `input[0]`
    /// producers; a missing input or producer ends it.
    pub fn match_at(&self, node: &'a NodeDef, pattern: &Pattern) -> Option<PatternMatch> {
        let tokens = pattern.tokens();

        let mut aligned = None;
        for (i, token) in tokens.iter().enumerate().rev() {
            if token.accepts(&node.op) {
                aligned = Some(i);
                break;
            }
            if !token.is_optional() {
                break;
            }
        }
        let mut cursor = aligned?;

        let mut nodes = vec![node.name.clone()];
        let mut op_types = vec![node.op.clone()];
        let mut current = node;

        while cursor > 0 {
            let token = &tokens[cursor - 1];
            let Some(producer) = self.index.first_producer(current) else {
                tracing::trace!(node = %current.name, "walk ended: no first producer");
                break;
            };

            if token.accepts(&producer.op) {
                nodes.push(producer.name.clone());
                op_types.push(producer.op.clone());
                current = producer;
                cursor -= 1;
            } else if token.is_optional() {
                cursor -= 1;
            } else {
                break;
            }
        }

        if op_types.len() < pattern.mandatory_count() {
            tracing::trace!(anchor = %node.name, matched = op_types.len(), "too few nodes matched");
            return None;
        }

        nodes.reverse();
        op_types.reverse();
        Some(PatternMatch { nodes, op_types })
    }

    /// Find every match of `pattern` in the graph
    ///
    /// Matches sharing a first node are reduced to the longest; all matches
    /// tied at that length are kept. Results follow index order.
    pub fn search(&self, pattern: &Pattern) -> Vec<PatternMatch> {
        if pattern.is_empty() {
            return Vec::new();
        }

        let found: Vec<PatternMatch> = self
            .index
            .nodes()
            .filter_map(|node| self.match_at(node, pattern))
            .collect();

        let mut longest: FxHashMap<String, usize> = FxHashMap::default();
        for m in &found {
            let len = longest.entry(m.first().to_string()).or_insert(0);
            *len = (*len).max(m.len());
        }

        let matches: Vec<PatternMatch> = found
            .into_iter()
            .filter(|m| longest.get(m.first()) == Some(&m.len()))
            .collect();

        tracing::debug!(count = matches.len(), "pattern search finished");
        matches
    }

    /// Find every match that also satisfies `condition`
    pub fn search_where<F>(&self, pattern: &Pattern, condition: F) -> Vec<PatternMatch>
    where
        F: Fn(&PatternMatch) -> bool,
    {
        self.search(pattern)
            .into_iter()
            .filter(|m| condition(m))
            .collect()
    }
}

/// Convenience function to create a pattern matcher
pub fn matcher(index: &GraphIndex) -> PatternMatcher<'_> {
    PatternMatcher::new(index)
}

impl GraphIndex {
    /// Find every match of `pattern`; see [`PatternMatcher::search`]
    pub fn search_patterns(&self, pattern: &Pattern) -> Vec<PatternMatch> {
        PatternMatcher::new(self).search(pattern)
    }
}
