//! Delimiter-based stream framing primitives.
//!
//! delimprims turns arbitrarily-chunked byte streams into discrete messages
//! bounded by configurable begin/end byte sequences — the framing layer for
//! text-ish wire protocols that delimit instead of length-prefixing.
//!
//! # Crate Structure
//!
//! - [`frame`] — The incremental framer state machine plus blocking
//!   reader/writer integration over any `Read`/`Write` stream.

/// Re-export frame types.
pub mod frame {
    pub use delimprims_frame::*;
}
