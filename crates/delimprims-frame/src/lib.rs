//! Delimiter-based incremental message framing for byte streams.
//!
//! The core type is [`Framer`]: a single-pass state machine that turns an
//! arbitrarily-chunked byte stream — as delivered by a socket or pipe — into
//! discrete messages bounded by configurable begin/end byte sequences. It
//! handles delimiters split across receive calls, multiple simultaneous
//! delimiter pairs, overflow-safe size limits, and false-positive partial
//! matches, without buffering anything beyond the current in-progress
//! message.
//!
//! [`MessageReader`] and [`MessageWriter`] wrap any `Read`/`Write` stream —
//! no partial reads, no buffer management in user code.

pub mod error;
pub mod framer;
pub mod message;
pub mod pattern;
pub mod reader;
pub mod writer;

pub use error::{FramerError, Result};
pub use framer::{Framer, FramerConfig};
pub use message::{encode_message, Message};
pub use pattern::DelimiterPattern;
pub use reader::MessageReader;
pub use writer::MessageWriter;
