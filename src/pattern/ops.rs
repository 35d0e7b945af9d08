//! Pattern tokens and common op groups

/// Pass-through ops that forward their first input unchanged
pub const IDENTITY_OPS: &[&str] = &["Identity", "Snapshot", "StopGradient"];

/// Rectifying activations
pub const RELU_OPS: &[&str] = &["Relu", "Relu6"];

/// Element-wise additions
pub const ADD_OPS: &[&str] = &["Add", "AddV2", "AddN"];

/// Convolutions
pub const CONV_OPS: &[&str] = &["Conv2D", "DepthwiseConv2dNative"];

/// Pooling operations
pub const POOL_OPS: &[&str] = &["MaxPool", "AvgPool"];

/// One position of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Must match one of the op types
    Required(Vec<String>),
    /// May match one of the op types, or be skipped
    Optional(Vec<String>),
}

impl PatternToken {
    /// Mandatory token accepting any of `ops`
    pub fn required(ops: &[&str]) -> Self {
        Self::Required(ops.iter().map(|s| s.to_string()).collect())
    }

    /// Optional token accepting any of `ops`
    pub fn optional(ops: &[&str]) -> Self {
        Self::Optional(ops.iter().map(|s| s.to_string()).collect())
    }

    /// Check if the token accepts an op type
    pub fn accepts(&self, op: &str) -> bool {
        match self {
            Self::Required(ops) | Self::Optional(ops) => ops.iter().any(|o| o == op),
        }
    }

    /// Check if the token may be skipped
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Ordered token sequence, producer first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern {
    tokens: Vec<PatternToken>,
}

impl Pattern {
    /// Create a pattern from tokens
    pub fn new(tokens: Vec<PatternToken>) -> Self {
        Self { tokens }
    }

    /// Pattern of single mandatory op types
    pub fn chain(ops: &[&str]) -> Self {
        Self::new(ops.iter().map(|&op| PatternToken::required(&[op])).collect())
    }

    /// The tokens, producer first
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if the pattern has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Minimum number of nodes a match must contain
    pub fn mandatory_count(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_optional()).count()
    }
}

impl From<Vec<PatternToken>> for Pattern {
    fn from(tokens: Vec<PatternToken>) -> Self {
        Self::new(tokens)
    }
}

/// Pattern builder for creating custom patterns
#[derive(Debug, Clone, Default)]
pub struct PatternBuilder {
    tokens: Vec<PatternToken>,
}

impl PatternBuilder {
    /// Create a new pattern builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mandatory op type
    pub fn op(mut self, op: &str) -> Self {
        self.tokens.push(PatternToken::required(&[op]));
        self
    }

    /// Add a mandatory token accepting any of `ops`
    pub fn any_of(mut self, ops: &[&str]) -> Self {
        self.tokens.push(PatternToken::required(ops));
        self
    }

    /// Add an optional token accepting any of `ops`
    pub fn optional(mut self, ops: &[&str]) -> Self {
        self.tokens.push(PatternToken::optional(ops));
        self
    }

    /// Build the pattern
    pub fn build(self) -> Pattern {
        Pattern::new(self.tokens)
    }
}

/// Conv + BiasAdd + optional Add + Relu/Relu6
pub fn conv_bias_add_relu() -> Pattern {
    PatternBuilder::new()
        .any_of(CONV_OPS)
        .op("BiasAdd")
        .optional(ADD_OPS)
        .any_of(RELU_OPS)
        .build()
}

/// MatMul + BiasAdd + optional Relu/Relu6
pub fn matmul_bias_relu() -> Pattern {
    PatternBuilder::new()
        .op("MatMul")
        .op("BiasAdd")
        .optional(RELU_OPS)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_accepts() {
        let token = PatternToken::required(&["Relu", "Relu6"]);
        assert!(token.accepts("Relu6"));
        assert!(!token.accepts("Elu"));
        assert!(!token.is_optional());
        assert!(PatternToken::optional(&["Add"]).is_optional());
    }

    #[test]
    fn test_pattern_builder() {
        let pattern = PatternBuilder::new()
            .op("Conv2D")
            .any_of(&["BiasAdd"])
            .optional(&["Add", "AddN"])
            .any_of(&["Relu", "Relu6"])
            .build();

        assert_eq!(pattern.len(), 4);
        assert_eq!(pattern.mandatory_count(), 3);
        assert_eq!(pattern.tokens()[2], PatternToken::optional(&["Add", "AddN"]));
    }

    #[test]
    fn test_chain() {
        let pattern = Pattern::chain(&["MatMul", "BiasAdd"]);
        assert_eq!(pattern.mandatory_count(), 2);
        assert!(pattern.tokens()[0].accepts("MatMul"));
    }

    #[test]
    fn test_predefined_patterns() {
        assert_eq!(conv_bias_add_relu().mandatory_count(), 3);
        assert_eq!(matmul_bias_relu().len(), 3);
        assert!(Pattern::default().is_empty());
    }
}
