use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::{FramerError, Result};
use crate::framer::Framer;
use crate::message::Message;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete delimited messages from any `Read` stream.
///
/// Handles partial reads internally — callers always get complete messages.
pub struct MessageReader<T> {
    inner: T,
    framer: Framer,
    decoded: VecDeque<Message>,
}

impl<T: Read> MessageReader<T> {
    /// Create a message reader driving the given framer.
    pub fn new(inner: T, framer: Framer) -> Self {
        Self {
            inner,
            framer,
            decoded: VecDeque::new(),
        }
    }

    /// Read the next complete message (blocking).
    ///
    /// Returns `Err(FramerError::ConnectionClosed)` when EOF is reached.
    /// A framing error (unrecognized delimiter, oversized message) taints
    /// the underlying framer; call [`framer_mut`](Self::framer_mut)`().reset()`
    /// before reading again.
    pub fn read_message(&mut self) -> Result<Message> {
        loop {
            if let Some(message) = self.decoded.pop_front() {
                return Ok(message);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FramerError::Io(err)),
            };

            if read == 0 {
                return Err(FramerError::ConnectionClosed);
            }

            let decoded = &mut self.decoded;
            self.framer.data_received(&chunk[..read], |pattern, body| {
                decoded.push_back(Message::new(pattern, Bytes::copy_from_slice(body)));
            })?;
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Borrow the driving framer.
    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Mutably borrow the driving framer (e.g. to `reset()` after an error).
    pub fn framer_mut(&mut self) -> &mut Framer {
        &mut self.framer
    }
}
