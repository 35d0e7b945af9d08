//! Input reference normalization
//!
//! Node inputs are written as `name`, `name:port` or `^name` (a control
//! dependency). [`NameNormalizer`] parses these references and memoizes the
//! results for the lifetime of one rewriting session.
//!
//! # Example
//!
//! ```ignore
//! use graphdef_rewriter::names::NameNormalizer;
//!
//! let names = NameNormalizer::new();
//! let r = names.resolve("^conv:1");
//! assert_eq!(r.node, "conv");
//! assert!(r.control);
//! assert_eq!(r.port, 1);
//! ```

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

/// Prefix marking a control dependency
pub const CONTROL_PREFIX: char = '^';

/// A parsed input reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TensorRef {
    /// Bare name of the referenced node
    pub node: String,
    /// Whether this is a control dependency
    pub control: bool,
    /// Output port of the producer (0 when absent)
    pub port: u32,
}

impl TensorRef {
    /// Check if this is a positional data reference
    pub fn is_data(&self) -> bool {
        !self.control
    }
}

impl fmt::Display for TensorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_ref(&self.node, self.port, self.control))
    }
}

/// Memoizing parser for input references
///
/// One normalizer is created per rewriting session and shared (via `Rc`) by
/// every [`GraphIndex`](crate::graph::GraphIndex) built in that session.
#[derive(Debug, Default)]
pub struct NameNormalizer {
    resolved: RefCell<FxHashMap<String, TensorRef>>,
    canonical: RefCell<FxHashMap<String, String>>,
}

impl NameNormalizer {
    /// Create a normalizer with empty caches
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a reference into node name, control marker and port
    pub fn resolve(&self, reference: &str) -> TensorRef {
        if let Some(hit) = self.resolved.borrow().get(reference) {
            return hit.clone();
        }

        let parsed = parse_reference(reference);
        self.resolved
            .borrow_mut()
            .insert(reference.to_string(), parsed.clone());
        parsed
    }

    /// Bare node name of a reference
    pub fn node_name(&self, reference: &str) -> String {
        self.resolve(reference).node
    }

    /// Append `:0` to a reference that carries no port suffix
    pub fn canonicalize_port(&self, reference: &str) -> String {
        if let Some(hit) = self.canonical.borrow().get(reference) {
            return hit.clone();
        }

        let body = reference.strip_prefix(CONTROL_PREFIX).unwrap_or(reference);
        let canonical = if split_port(body).1.is_some() {
            reference.to_string()
        } else {
            format!("{}:0", reference)
        };

        self.canonical
            .borrow_mut()
            .insert(reference.to_string(), canonical.clone());
        canonical
    }

    /// Number of memoized references
    pub fn cached(&self) -> usize {
        self.resolved.borrow().len() + self.canonical.borrow().len()
    }

    /// Drop all memoized results
    pub fn clear(&self) {
        self.resolved.borrow_mut().clear();
        self.canonical.borrow_mut().clear();
    }
}

/// Identifier-safe form of a reference
///
/// `:` becomes `__port__` and `^` becomes `__hat__`. An underscore directly
/// followed by another underscore or by one of those markers is written as
/// `__us__`, so the output never contains a run of underscores that did not
/// come from a token and distinct references get distinct keys.
pub fn unique_key(reference: &str) -> String {
    let mut key = String::with_capacity(reference.len() + 8);
    let mut chars = reference.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ':' => key.push_str("__port__"),
            '^' => key.push_str("__hat__"),
            '_' if matches!(chars.peek(), Some('_' | ':' | '^')) => key.push_str("__us__"),
            other => key.push(other),
        }
    }
    key
}

/// Build a reference string
///
/// Port 0 data references are written without a suffix, control references
/// never carry one.
pub fn format_ref(node: &str, port: u32, control: bool) -> String {
    if control {
        format!("{}{}", CONTROL_PREFIX, node)
    } else if port == 0 {
        node.to_string()
    } else {
        format!("{}:{}", node, port)
    }
}

fn parse_reference(reference: &str) -> TensorRef {
    let (control, body) = match reference.strip_prefix(CONTROL_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, reference),
    };

    let (node, port) = split_port(body);
    TensorRef {
        node: node.to_string(),
        control,
        port: port.unwrap_or(0),
    }
}

/// Split off a trailing `:N` where N is all digits
///
/// A suffix too large for a port is still stripped; the port saturates.
fn split_port(body: &str) -> (&str, Option<u32>) {
    match body.rsplit_once(':') {
        Some((node, digits))
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            let port = digits.parse().unwrap_or_else(|_| {
                tracing::warn!(reference = %body, "port suffix out of range, saturating");
                u32::MAX
            });
            (node, Some(port))
        }
        _ => (body, None),
    }
}
