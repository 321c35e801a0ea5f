use bytes::BytesMut;
use tracing::trace;

use crate::error::{FramerError, Result};
use crate::pattern::{validate_patterns, DelimiterPattern};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Configuration for a [`Framer`].
#[derive(Debug, Clone, Default)]
pub struct FramerConfig {
    /// Maximum size of a single message body in bytes. `None` means unbounded.
    pub max_message_size: Option<usize>,
}

impl FramerConfig {
    /// Configuration with a message size cap.
    pub fn with_max_message_size(max: usize) -> Self {
        Self {
            max_message_size: Some(max),
        }
    }
}

/// Outcome of resuming a carried partial end match with a fresh chunk.
enum Resumed {
    /// The chunk extended the partial match without completing it.
    Exhausted,
    /// The end delimiter completed after `consumed` chunk bytes.
    Continue(usize),
    /// The partial match was falsified; the held bytes were message data and
    /// must be re-scanned together with the chunk.
    Rescan(Vec<u8>),
}

/// Incremental delimiter framer.
///
/// Turns an arbitrarily-chunked byte stream into discrete messages bounded by
/// configurable begin/end byte sequences. Feed chunks with
/// [`data_received`](Framer::data_received) as they arrive; complete messages
/// are handed to the callback in stream order, with delimiters stripped.
///
/// The framer is a single-stream, single-threaded state machine: it never
/// blocks, never spawns, and buffers nothing beyond the current in-progress
/// message plus at most one delimiter-length of look-back state.
///
/// If `data_received` returns an error, the framer is left in an undefined
/// internal state; call [`reset`](Framer::reset) before feeding more data.
#[derive(Debug)]
pub struct Framer {
    patterns: Vec<DelimiterPattern>,
    max_message_size: Option<usize>,
    /// Body bytes of the in-progress message (begin delimiter excluded).
    buf: BytesMut,
    /// Pattern index of the begin match for the in-progress message.
    matched: Option<usize>,
    /// Bytes of the end delimiter matched at the tail of processed data.
    partial_end: usize,
}

impl Framer {
    /// Create a framer over a set of delimiter patterns.
    ///
    /// The set is validated: it must be non-empty, every sequence must be
    /// non-empty, and no begin sequence may be a prefix of another begin
    /// sequence. When two distinct begins both match the same input, the
    /// first pattern in list order wins.
    pub fn new(patterns: Vec<DelimiterPattern>, config: FramerConfig) -> Result<Self> {
        validate_patterns(&patterns)?;
        Ok(Self::from_parts(patterns, config))
    }

    /// Create a framer with one multi-byte begin/end pair.
    pub fn single_pattern(
        begin: impl Into<Vec<u8>>,
        end: impl Into<Vec<u8>>,
        config: FramerConfig,
    ) -> Result<Self> {
        Self::new(vec![DelimiterPattern::new(begin, end)], config)
    }

    /// Create a framer with one single-byte begin/end pair.
    pub fn single_byte(begin: u8, end: u8, config: FramerConfig) -> Self {
        Self::from_parts(vec![DelimiterPattern::single(begin, end)], config)
    }

    fn from_parts(patterns: Vec<DelimiterPattern>, config: FramerConfig) -> Self {
        Self {
            patterns,
            max_message_size: config.max_message_size,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            matched: None,
            partial_end: 0,
        }
    }

    /// The configured delimiter patterns.
    pub fn patterns(&self) -> &[DelimiterPattern] {
        &self.patterns
    }

    /// The configured maximum message size, if any.
    pub fn max_message_size(&self) -> Option<usize> {
        self.max_message_size
    }

    /// True when no partial message or partial delimiter match is pending.
    pub fn is_idle(&self) -> bool {
        self.buf.is_empty() && self.matched.is_none() && self.partial_end == 0
    }

    /// Return the framer to its freshly-constructed state.
    ///
    /// Discards any partially accumulated message and partial delimiter
    /// matches. Required after `data_received` returns an error, before the
    /// framer is fed again.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.matched = None;
        self.partial_end = 0;
    }

    /// Feed the next chunk of the stream.
    ///
    /// Invokes `on_message(pattern_index, body)` zero or more times,
    /// synchronously and in stream order, before returning. The body slice is
    /// only valid for the duration of the callback and never aliases data
    /// from a previous `data_received` call. A zero-length chunk is a no-op.
    ///
    /// Fails with [`FramerError::UnrecognizedDelimiter`] when the stream
    /// cannot begin with any configured begin sequence, or with
    /// [`FramerError::MessageTooLarge`] when an accumulating message exceeds
    /// the configured maximum. Either error leaves the framer in an
    /// undefined state; [`reset`](Framer::reset) before continued use.
    pub fn data_received(
        &mut self,
        chunk: &[u8],
        mut on_message: impl FnMut(usize, &[u8]),
    ) -> Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }

        // A carried partial end match can only exist while a begin match is
        // active; it is resolved once, against the head of the new chunk.
        match (self.partial_end, self.matched) {
            (0, _) | (_, None) => self.run(chunk, &mut on_message),
            (_, Some(pattern)) => {
                match self.resume_end_match(pattern, chunk, &mut on_message)? {
                    Resumed::Exhausted => Ok(()),
                    Resumed::Continue(consumed) => self.run(&chunk[consumed..], &mut on_message),
                    Resumed::Rescan(held) => self.run(&held, &mut on_message),
                }
            }
        }
    }

    /// Process `data` with no carried partial end match at entry.
    fn run<F: FnMut(usize, &[u8])>(&mut self, data: &[u8], on_message: &mut F) -> Result<()> {
        let mut cursor = 0;
        while cursor != data.len() {
            cursor = match self.matched {
                None => self.seek_begin(data, cursor)?,
                Some(pattern) => self.seek_end(pattern, data, cursor, on_message)?,
            };
        }
        Ok(())
    }

    /// Phase A: match a begin delimiter at the start of the stream.
    ///
    /// Returns the new cursor position. Consumes the whole chunk (buffering
    /// it) when at least one pattern still needs more data to compare.
    fn seek_begin(&mut self, data: &[u8], cursor: usize) -> Result<usize> {
        let buffered = self.buf.len();
        let avail = data.len() - cursor;
        let mut awaiting_data = false;

        for index in 0..self.patterns.len() {
            let begin = &self.patterns[index].begin;
            let Some(needed) = begin.len().checked_sub(buffered) else {
                // Begin shorter than the buffered prefix: fully compared and
                // disproven in an earlier call.
                continue;
            };
            if avail < needed {
                // Not enough bytes yet to complete the comparison.
                awaiting_data = true;
                continue;
            }
            if self.buf[..] == begin[..buffered] && data[cursor..cursor + needed] == begin[buffered..]
            {
                trace!(pattern = index, "begin delimiter matched");
                self.matched = Some(index);
                self.buf.clear();
                return Ok(cursor + needed);
            }
        }

        if awaiting_data {
            self.buf.extend_from_slice(&data[cursor..]);
            return Ok(data.len());
        }

        Err(FramerError::UnrecognizedDelimiter)
    }

    /// Phase B: scan for the end delimiter of the matched pattern.
    fn seek_end<F: FnMut(usize, &[u8])>(
        &mut self,
        pattern: usize,
        data: &[u8],
        cursor: usize,
        on_message: &mut F,
    ) -> Result<usize> {
        let end = &self.patterns[pattern].end;
        let hay = &data[cursor..];

        if let Some(offset) = find_first(hay, end) {
            self.check_capacity(offset)?;
            let consumed = offset + end.len();
            self.buf.extend_from_slice(&hay[..offset]);
            trace!(pattern, len = self.buf.len(), "message complete");
            on_message(pattern, &self.buf);
            self.reset();
            return Ok(cursor + consumed);
        }

        // No full match: keep the longest chunk tail that could still open
        // the end delimiter, buffer everything before it.
        let partial = tail_overlap(hay, end);
        let body = hay.len() - partial;
        self.check_capacity(body)?;
        self.buf.extend_from_slice(&hay[..body]);
        self.partial_end = partial;
        Ok(data.len())
    }

    /// Resolve a partial end match carried over from the previous chunk.
    fn resume_end_match<F: FnMut(usize, &[u8])>(
        &mut self,
        pattern: usize,
        chunk: &[u8],
        on_message: &mut F,
    ) -> Result<Resumed> {
        let held = self.partial_end;
        let end = &self.patterns[pattern].end;
        let needed = end.len() - held;

        if chunk.len() >= needed {
            if chunk[..needed] == end[held..] {
                trace!(pattern, len = self.buf.len(), "message complete");
                on_message(pattern, &self.buf);
                self.reset();
                return Ok(Resumed::Continue(needed));
            }
        } else if chunk[..] == end[held..held + chunk.len()] {
            self.partial_end += chunk.len();
            return Ok(Resumed::Exhausted);
        }

        // Falsified: the held bytes were message data after all.
        let mut rescan = Vec::with_capacity(held + chunk.len());
        rescan.extend_from_slice(&end[..held]);
        rescan.extend_from_slice(chunk);
        self.partial_end = 0;
        Ok(Resumed::Rescan(rescan))
    }

    /// Enforce the size limit before growing the buffer by `additional` bytes.
    fn check_capacity(&self, additional: usize) -> Result<()> {
        if let Some(max) = self.max_message_size {
            // `buf` never exceeds `max`, so the subtraction cannot underflow.
            if additional > max - self.buf.len() {
                return Err(FramerError::MessageTooLarge {
                    size: self.buf.len().saturating_add(additional),
                    max,
                });
            }
        }
        Ok(())
    }
}

/// Offset of the first full occurrence of `needle` in `hay`, if any.
fn find_first(hay: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    hay.windows(needle.len()).position(|window| window == needle)
}

/// Length of the longest proper prefix of `needle` that ends `hay`.
///
/// This is the earliest position in `hay` that could still open an
/// occurrence of `needle` continuing into future data. Always 0 for a
/// one-byte `needle` (a full occurrence would have been found instead).
fn tail_overlap(hay: &[u8], needle: &[u8]) -> usize {
    let longest = needle.len().saturating_sub(1).min(hay.len());
    for len in (1..=longest).rev() {
        if hay[hay.len() - len..] == needle[..len] {
            return len;
        }
    }
    0
}
