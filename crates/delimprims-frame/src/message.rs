use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FramerError, Result};
use crate::pattern::DelimiterPattern;

/// A framed message extracted from (or destined for) a byte stream.
#[derive(Debug, Clone)]
pub struct Message {
    /// Index of the delimiter pattern that frames this message.
    pub pattern: usize,
    /// The message body, delimiters stripped.
    pub payload: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(pattern: usize, payload: impl Into<Bytes>) -> Self {
        Self {
            pattern,
            payload: payload.into(),
        }
    }

    /// The total wire size of this message when framed with `patterns`.
    ///
    /// Returns `None` when the pattern index is out of range.
    pub fn wire_size(&self, patterns: &[DelimiterPattern]) -> Option<usize> {
        let pattern = patterns.get(self.pattern)?;
        Some(pattern.begin.len() + self.payload.len() + pattern.end.len())
    }
}

/// Encode a payload into the wire format: begin + payload + end.
///
/// Fails when `index` names no configured pattern, or when the payload
/// contains that pattern's end sequence (the frame would be cut short on
/// extraction).
pub fn encode_message(
    patterns: &[DelimiterPattern],
    index: usize,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let Some(pattern) = patterns.get(index) else {
        return Err(FramerError::UnknownPattern {
            index,
            count: patterns.len(),
        });
    };

    if !pattern.end.is_empty()
        && payload.len() >= pattern.end.len()
        && payload
            .windows(pattern.end.len())
            .any(|window| window == pattern.end)
    {
        return Err(FramerError::EndDelimiterInPayload { pattern: index });
    }

    dst.reserve(pattern.begin.len() + payload.len() + pattern.end.len());
    dst.put_slice(&pattern.begin);
    dst.put_slice(payload);
    dst.put_slice(&pattern.end);
    Ok(())
}
