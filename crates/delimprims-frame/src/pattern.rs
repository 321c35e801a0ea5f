use crate::error::{FramerError, Result};

/// A begin/end delimiter pair marking message boundaries in a byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterPattern {
    /// Bytes that open a message frame.
    pub begin: Vec<u8>,
    /// Bytes that close a message frame.
    pub end: Vec<u8>,
}

impl DelimiterPattern {
    /// Create a pattern from begin/end byte sequences.
    pub fn new(begin: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self {
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// Create a pattern from single begin/end bytes.
    pub fn single(begin: u8, end: u8) -> Self {
        Self {
            begin: vec![begin],
            end: vec![end],
        }
    }
}

/// Validate a pattern set for framing.
///
/// The set must be non-empty, every sequence must be non-empty, and no begin
/// sequence may be a prefix of another begin sequence (unambiguous matching
/// requires prefix-free begins).
pub(crate) fn validate_patterns(patterns: &[DelimiterPattern]) -> Result<()> {
    if patterns.is_empty() {
        return Err(FramerError::EmptyPatternSet);
    }

    for (index, pattern) in patterns.iter().enumerate() {
        if pattern.begin.is_empty() || pattern.end.is_empty() {
            return Err(FramerError::EmptyDelimiter { pattern: index });
        }
    }

    for (prefix, a) in patterns.iter().enumerate() {
        for (index, b) in patterns.iter().enumerate() {
            if prefix != index && b.begin.starts_with(&a.begin) {
                return Err(FramerError::AmbiguousBegin {
                    prefix,
                    pattern: index,
                });
            }
        }
    }

    Ok(())
}
