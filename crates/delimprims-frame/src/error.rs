/// Errors that can occur during delimiter framing.
#[derive(Debug, thiserror::Error)]
pub enum FramerError {
    /// The stream does not begin with any configured begin delimiter.
    ///
    /// Raised only once no pattern can possibly still match with more data.
    #[error("stream matches no configured begin delimiter")]
    UnrecognizedDelimiter,

    /// An accumulating message exceeded the configured maximum size.
    #[error("message too large ({size} bytes, max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// A framer was configured with no delimiter patterns.
    #[error("at least one delimiter pattern is required")]
    EmptyPatternSet,

    /// A delimiter pattern has an empty begin or end sequence.
    #[error("pattern {pattern} has an empty begin or end sequence")]
    EmptyDelimiter { pattern: usize },

    /// One begin sequence is a prefix of another, making matching ambiguous.
    #[error("begin delimiter of pattern {prefix} is a prefix of pattern {pattern}")]
    AmbiguousBegin { prefix: usize, pattern: usize },

    /// A pattern index outside the configured pattern set.
    #[error("unknown pattern index {index} (configured patterns: {count})")]
    UnknownPattern { index: usize, count: usize },

    /// A payload contains its own end delimiter and cannot be framed.
    #[error("payload contains the end delimiter of pattern {pattern}")]
    EndDelimiterInPayload { pattern: usize },

    /// An I/O error occurred while reading or writing framed messages.
    #[error("framing I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream was closed before a complete message was received.
    #[error("connection closed (incomplete message)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FramerError>;
