//! Graph mutation operations
//!
//! Methods for modifying the graph structure: removing, splicing, replacing,
//! inserting and folding nodes. Every mutator checks all of its preconditions
//! before the first edit, so an `Err` leaves the index untouched.

use std::rc::Rc;

use crate::error::{RewriteError, RewriteResult};
use crate::names::{format_ref, TensorRef};
use crate::proto::NodeDef;

use super::index::GraphIndex;
use super::maps::{GraphEntry, OutputList};

fn unknown(name: &str) -> RewriteError {
    RewriteError::UnknownNode(name.to_string())
}

fn log_rejected(op: &'static str, err: &RewriteError) {
    tracing::debug!(op, error = %err, "mutation rejected");
}

impl GraphIndex {
    // ========================================================================
    // Node removal
    // ========================================================================

    /// Remove a node and scrub it from its producers' outputs
    ///
    /// Consumers are NOT redirected; references to the removed node are left
    /// for the caller to rewrite.
    pub fn remove_node(&mut self, name: &str) -> RewriteResult<NodeDef> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| unknown(name))
            .inspect_err(|e| log_rejected("remove_node", e))?;

        if !entry.outputs.is_empty() {
            tracing::debug!(node = %name, consumers = ?entry.outputs, "removed node still has consumers");
        }

        let node = self.detach(name).ok_or_else(|| unknown(name))?;
        tracing::debug!(node = %name, "node removed");
        Ok(node)
    }

    /// Bypass a node that has a single non-constant input
    ///
    /// Every consumer's references to `name` are rewired onto the node's first
    /// input (control references stay control references), the consumers take
    /// `name`'s place in the producer's outputs, and `name` is removed.
    pub fn splice_single_input(&mut self, name: &str) -> RewriteResult<()> {
        let primary = self
            .validate_splice(name)
            .inspect_err(|e| log_rejected("splice_single_input", e))?;
        let top = self.names.resolve(&primary).node;

        let consumers: Vec<String> = self.consumers(name).to_vec();
        for consumer in &consumers {
            self.rewrite_references(consumer, name, |r| {
                if r.control {
                    format_ref(&top, 0, true)
                } else {
                    primary.clone()
                }
            });
        }

        if let Some(entry) = self.entries.get_mut(&top) {
            let previous = std::mem::take(&mut entry.outputs);
            for output in previous {
                if output == name {
                    for consumer in &consumers {
                        entry.add_output(consumer);
                    }
                } else {
                    entry.add_output(&output);
                }
            }
            for consumer in &consumers {
                entry.add_output(consumer);
            }
        }

        self.detach(name);
        tracing::debug!(node = %name, into = %top, "node spliced");
        Ok(())
    }

    // ========================================================================
    // Node replacement
    // ========================================================================

    /// Replace `old_name` with `new`, keeping its position in index order
    ///
    /// `consumers` must list every current consumer of `old_name`; their
    /// references are rewritten to `new` with port and control marker kept.
    pub fn replace_node<S: AsRef<str>>(
        &mut self,
        new: NodeDef,
        old_name: &str,
        consumers: &[S],
    ) -> RewriteResult<()> {
        let consumers: Vec<&str> = consumers.iter().map(AsRef::as_ref).collect();
        self.validate_replace(&new, old_name, &consumers)
            .inspect_err(|e| log_rejected("replace_node", e))?;
        self.apply_replace(new, old_name, &consumers);
        Ok(())
    }

    /// Insert `new` between `producer` and `consumers`
    ///
    /// Each consumer's references to `producer` become port-0 references to
    /// `new`. Without a producer the consumers must already reference `new`.
    /// A node already registered under `new`'s name is discarded first; its
    /// consumers carry over to `new`.
    pub fn insert_node<S: AsRef<str>>(
        &mut self,
        new: NodeDef,
        producer: Option<&str>,
        consumers: &[S],
    ) -> RewriteResult<()> {
        let consumers: Vec<&str> = consumers.iter().map(AsRef::as_ref).collect();
        self.validate_insert(&new, producer, &consumers)
            .inspect_err(|e| log_rejected("insert_node", e))?;

        let new_name = new.name.clone();
        let carried = self.discard_prior(&new_name, None);

        if let Some(producer) = producer {
            for &consumer in &consumers {
                self.rewrite_references(consumer, producer, |r| {
                    format_ref(&new_name, 0, r.control)
                });
                self.unlink(producer, consumer);
            }
        }

        let producers = self.producer_names(&new);
        let outputs = consumers
            .iter()
            .copied()
            .chain(carried.iter().map(String::as_str));
        self.entries
            .insert(new_name.clone(), GraphEntry::with_outputs(new, outputs));
        for p in producers {
            self.link(&p, &new_name);
        }

        tracing::debug!(node = %new_name, producer = ?producer, "node inserted");
        Ok(())
    }

    // ========================================================================
    // Constant handling
    // ========================================================================

    /// Point `consumers` at `new_const` instead of `old_const`
    ///
    /// `old_const` drops those consumers but stays in the index.
    pub fn replace_producer_constant<S: AsRef<str>>(
        &mut self,
        new_const: NodeDef,
        consumers: &[S],
        old_const: &str,
    ) -> RewriteResult<()> {
        let consumers: Vec<&str> = consumers.iter().map(AsRef::as_ref).collect();
        self.validate_constant_swap(&new_const, &consumers, old_const)
            .inspect_err(|e| log_rejected("replace_producer_constant", e))?;

        let new_name = new_const.name.clone();
        let carried = self.discard_prior(&new_name, None);

        for &consumer in &consumers {
            self.rewrite_references(consumer, old_const, |r| {
                format_ref(&new_name, r.port, r.control)
            });
            self.unlink(old_const, consumer);
        }

        let producers = self.producer_names(&new_const);
        let outputs = consumers
            .iter()
            .copied()
            .chain(carried.iter().map(String::as_str));
        let entry = GraphEntry::with_outputs(new_const, outputs);
        match self.position(old_const) {
            Some(position) => {
                self.entries.shift_insert(position, new_name.clone(), entry);
            }
            None => {
                self.entries.insert(new_name.clone(), entry);
            }
        }
        for p in producers {
            self.link(&p, &new_name);
        }

        tracing::debug!(old = %old_const, new = %new_name, "constant producer replaced");
        Ok(())
    }

    /// Replace an all-constant-input node with a single constant
    ///
    /// The input constants feeding only `end` are removed; constants shared
    /// with other consumers survive. `new_const` loses its inputs and takes
    /// `end`'s place with `end`'s consumers.
    pub fn fold_constant_subgraph(&mut self, mut new_const: NodeDef, end: &str) -> RewriteResult<()> {
        new_const.input.clear();
        let owned: Vec<String> = self.consumers(end).to_vec();
        let consumers: Vec<&str> = owned.iter().map(String::as_str).collect();

        self.validate_fold(&new_const, end)
            .and_then(|_| self.validate_replace(&new_const, end, &consumers))
            .inspect_err(|e| log_rejected("fold_constant_subgraph", e))?;

        let end_node = self.get_node(end).ok_or_else(|| unknown(end))?;
        let inputs = self.producer_names(end_node);
        for input in inputs {
            let only_feeds_end = self.consumers(&input).iter().all(|c| c == end);
            if only_feeds_end && input != end {
                self.detach(&input);
                tracing::debug!(node = %input, "folded constant removed");
            }
        }

        self.apply_replace(new_const, end, &consumers);
        tracing::debug!(node = %end, "constant subgraph folded");
        Ok(())
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Returns the primary input reference to splice onto
    fn validate_splice(&self, name: &str) -> RewriteResult<String> {
        let entry = self.get_entry(name).ok_or_else(|| unknown(name))?;

        let mut non_constant = 0;
        for input in &entry.node.input {
            let producer = self.names.node_name(input);
            let node = self
                .get_node(&producer)
                .ok_or_else(|| RewriteError::DanglingReference {
                    node: name.to_string(),
                    missing: producer.clone(),
                })?;
            if !node.is_constant() {
                non_constant += 1;
            }
        }
        if non_constant > 1 {
            return Err(RewriteError::MultiInputSplice {
                node: name.to_string(),
                count: non_constant,
            });
        }

        let primary = entry
            .node
            .input
            .first()
            .filter(|r| self.names.resolve(r).is_data())
            .ok_or_else(|| RewriteError::NoPrimaryInput(name.to_string()))?;
        if self.names.node_name(primary) == name {
            return Err(RewriteError::NoPrimaryInput(name.to_string()));
        }

        for consumer in &entry.outputs {
            if !self.has_node(consumer) {
                return Err(RewriteError::DanglingReference {
                    node: name.to_string(),
                    missing: consumer.clone(),
                });
            }
        }

        Ok(primary.clone())
    }

    fn validate_replace(
        &self,
        new: &NodeDef,
        old_name: &str,
        consumers: &[&str],
    ) -> RewriteResult<()> {
        let old = self.get_entry(old_name).ok_or_else(|| unknown(old_name))?;
        let renamed = new.name != old_name;

        for &consumer in consumers {
            if renamed && (consumer == new.name || consumer == old_name) {
                return Err(RewriteError::NameConflict(consumer.to_string()));
            }
            let node = self
                .get_node(consumer)
                .ok_or_else(|| RewriteError::DanglingReference {
                    node: old_name.to_string(),
                    missing: consumer.to_string(),
                })?;
            if !self.references(node, old_name) {
                return Err(RewriteError::NotConnected {
                    producer: old_name.to_string(),
                    consumer: consumer.to_string(),
                });
            }
        }

        for current in &old.outputs {
            let listed = consumers.contains(&current.as_str());
            if current != old_name && !listed {
                return Err(RewriteError::DanglingReference {
                    node: current.clone(),
                    missing: old_name.to_string(),
                });
            }
        }

        for input in &new.input {
            let producer = self.names.node_name(input);
            let present =
                producer == new.name || (producer != old_name && self.has_node(&producer));
            if !present {
                return Err(RewriteError::DanglingReference {
                    node: new.name.clone(),
                    missing: producer,
                });
            }
        }

        Ok(())
    }

    fn validate_insert(
        &self,
        new: &NodeDef,
        producer: Option<&str>,
        consumers: &[&str],
    ) -> RewriteResult<()> {
        if let Some(producer) = producer {
            if !self.has_node(producer) {
                return Err(unknown(producer));
            }
            if producer == new.name {
                return Err(RewriteError::NameConflict(new.name.clone()));
            }
        }

        for &consumer in consumers {
            if consumer == new.name {
                return Err(RewriteError::NameConflict(new.name.clone()));
            }
            let node = self.get_node(consumer).ok_or_else(|| unknown(consumer))?;
            let expected = producer.unwrap_or(&new.name);
            if !self.references(node, expected) {
                return Err(RewriteError::NotConnected {
                    producer: expected.to_string(),
                    consumer: consumer.to_string(),
                });
            }
        }

        self.check_inputs_present(new)
    }

    fn validate_constant_swap(
        &self,
        new_const: &NodeDef,
        consumers: &[&str],
        old_const: &str,
    ) -> RewriteResult<()> {
        if !new_const.is_constant() {
            return Err(RewriteError::NotConstant {
                name: new_const.name.clone(),
                op: new_const.op.clone(),
            });
        }
        if !self.has_node(old_const) {
            return Err(unknown(old_const));
        }
        if new_const.name == old_const {
            return Err(RewriteError::NameConflict(old_const.to_string()));
        }

        for &consumer in consumers {
            if consumer == new_const.name {
                return Err(RewriteError::NameConflict(consumer.to_string()));
            }
            let node = self.get_node(consumer).ok_or_else(|| unknown(consumer))?;
            if !self.references(node, old_const) {
                return Err(RewriteError::NotConnected {
                    producer: old_const.to_string(),
                    consumer: consumer.to_string(),
                });
            }
        }

        self.check_inputs_present(new_const)
    }

    fn validate_fold(&self, new_const: &NodeDef, end: &str) -> RewriteResult<()> {
        if !new_const.is_constant() {
            return Err(RewriteError::NotConstant {
                name: new_const.name.clone(),
                op: new_const.op.clone(),
            });
        }

        let end_node = self.get_node(end).ok_or_else(|| unknown(end))?;
        for input in &end_node.input {
            let producer = self.names.node_name(input);
            let node = self
                .get_node(&producer)
                .ok_or_else(|| RewriteError::DanglingReference {
                    node: end.to_string(),
                    missing: producer.clone(),
                })?;
            if !node.is_constant() {
                return Err(RewriteError::NonConstantSubgraph {
                    end: end.to_string(),
                    input: producer,
                });
            }
        }

        Ok(())
    }

    /// Every input of `node` must name a present node (or `node` itself)
    fn check_inputs_present(&self, node: &NodeDef) -> RewriteResult<()> {
        for input in &node.input {
            let producer = self.names.node_name(input);
            if producer != node.name && !self.has_node(&producer) {
                return Err(RewriteError::DanglingReference {
                    node: node.name.clone(),
                    missing: producer,
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // Map update helpers
    // ========================================================================

    /// Replace without validation; callers validate first
    fn apply_replace(&mut self, new: NodeDef, old_name: &str, consumers: &[&str]) {
        let new_name = new.name.clone();
        let carried = if new_name != old_name {
            self.discard_prior(&new_name, Some(old_name))
        } else {
            OutputList::new()
        };

        let Some(position) = self.position(old_name) else {
            return;
        };
        self.detach(old_name);

        let producers = self.producer_names(&new);
        let outputs = consumers
            .iter()
            .copied()
            .chain(carried.iter().map(String::as_str));
        let entry = GraphEntry::with_outputs(new, outputs);
        self.entries.shift_insert(position, new_name.clone(), entry);

        for &consumer in consumers {
            self.rewrite_references(consumer, old_name, |r| {
                format_ref(&new_name, r.port, r.control)
            });
        }
        for p in producers {
            self.link(&p, &new_name);
        }

        tracing::debug!(old = %old_name, new = %new_name, "node replaced");
    }

    /// Drop an entry about to be shadowed by a new node of the same name
    ///
    /// Returns the consumers that now resolve to the new node, minus `skip`.
    fn discard_prior(&mut self, name: &str, skip: Option<&str>) -> OutputList {
        let Some(outputs) = self.entries.get(name).map(|e| e.outputs.clone()) else {
            return OutputList::new();
        };
        tracing::debug!(node = %name, "discarding existing node with the same name");
        self.detach(name);
        outputs
            .into_iter()
            .filter(|o| Some(o.as_str()) != skip)
            .collect()
    }

    /// Remove an entry and scrub it from its producers' outputs
    fn detach(&mut self, name: &str) -> Option<NodeDef> {
        let entry = self.entries.shift_remove(name)?;
        for p in self.producer_names(&entry.node) {
            self.unlink(&p, name);
        }
        Some(entry.node)
    }

    fn link(&mut self, producer: &str, consumer: &str) {
        if let Some(entry) = self.entries.get_mut(producer) {
            entry.add_output(consumer);
        }
    }

    fn unlink(&mut self, producer: &str, consumer: &str) {
        if let Some(entry) = self.entries.get_mut(producer) {
            entry.remove_output(consumer);
        }
    }

    /// Rewrite every input of `consumer` resolving to `from`
    fn rewrite_references(
        &mut self,
        consumer: &str,
        from: &str,
        to: impl Fn(&TensorRef) -> String,
    ) -> usize {
        let names = Rc::clone(&self.names);
        let Some(entry) = self.entries.get_mut(consumer) else {
            return 0;
        };

        let mut rewritten = 0;
        for input in entry.node.input.iter_mut() {
            let r = names.resolve(input);
            if r.node == from {
                *input = to(&r);
                rewritten += 1;
            }
        }
        rewritten
    }
}
