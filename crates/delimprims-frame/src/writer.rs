use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::error::{FramerError, Result};
use crate::framer::FramerConfig;
use crate::message::{encode_message, Message};
use crate::pattern::{validate_patterns, DelimiterPattern};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes delimited messages to any `Write` stream.
#[derive(Debug)]
pub struct MessageWriter<T> {
    inner: T,
    patterns: Vec<DelimiterPattern>,
    max_message_size: Option<usize>,
    buf: BytesMut,
}

impl<T: Write> MessageWriter<T> {
    /// Create a message writer with the given pattern set.
    ///
    /// The set is validated with the same rules as [`crate::Framer::new`],
    /// so anything this writer emits can be extracted on the other side.
    pub fn new(inner: T, patterns: Vec<DelimiterPattern>) -> Result<Self> {
        Self::with_config(inner, patterns, FramerConfig::default())
    }

    /// Create a message writer with explicit configuration.
    pub fn with_config(
        inner: T,
        patterns: Vec<DelimiterPattern>,
        config: FramerConfig,
    ) -> Result<Self> {
        validate_patterns(&patterns)?;
        Ok(Self {
            inner,
            patterns,
            max_message_size: config.max_message_size,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        })
    }

    /// Frame and send a payload using the pattern at `pattern` (blocking).
    pub fn send(&mut self, pattern: usize, payload: &[u8]) -> Result<()> {
        if let Some(max) = self.max_message_size {
            if payload.len() > max {
                return Err(FramerError::MessageTooLarge {
                    size: payload.len(),
                    max,
                });
            }
        }

        self.buf.clear();
        encode_message(&self.patterns, pattern, payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FramerError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FramerError::Io(err)),
            }
        }

        self.flush()
    }

    /// Write a complete message (blocking).
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        self.send(message.pattern, message.payload.as_ref())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FramerError::Io(err)),
            }
        }
    }

    /// The configured delimiter patterns.
    pub fn patterns(&self) -> &[DelimiterPattern] {
        &self.patterns
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::framer::Framer;

    fn test_patterns() -> Vec<DelimiterPattern> {
        vec![
            DelimiterPattern::new("<<", ">>"),
            DelimiterPattern::new("[[", "]]"),
        ]
    }

    fn extract_all(bytes: &[u8]) -> Vec<(usize, Vec<u8>)> {
        let mut framer = Framer::new(test_patterns(), FramerConfig::default()).unwrap();
        let mut messages = Vec::new();
        framer
            .data_received(bytes, |pattern, body| {
                messages.push((pattern, body.to_vec()));
            })
            .unwrap();
        messages
    }

    #[test]
    fn write_single_message() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::new(cursor, test_patterns()).unwrap();

        writer.send(0, b"hello").unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes, b"<<hello>>");
    }

    #[test]
    fn write_multiple_messages_across_patterns() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::new(cursor, test_patterns()).unwrap();

        writer.send(0, b"one").unwrap();
        writer.send(1, b"two").unwrap();
        writer.send(0, b"three").unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(
            extract_all(&bytes),
            vec![
                (0, b"one".to_vec()),
                (1, b"two".to_vec()),
                (0, b"three".to_vec())
            ]
        );
    }

    #[test]
    fn write_message_method() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::new(cursor, test_patterns()).unwrap();
        let message = Message::new(1, Bytes::from_static(b"abc"));

        writer.write_message(&message).unwrap();

        let bytes = writer.into_inner().into_inner();
        assert_eq!(bytes, b"[[abc]]");
    }

    #[test]
    fn payload_too_large_rejected() {
        let config = FramerConfig::with_max_message_size(4);
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::with_config(cursor, test_patterns(), config).unwrap();

        let err = writer.send(0, b"oversized").unwrap_err();
        assert!(matches!(err, FramerError::MessageTooLarge { .. }));
    }

    #[test]
    fn unknown_pattern_rejected() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::new(cursor, test_patterns()).unwrap();

        let err = writer.send(7, b"x").unwrap_err();
        assert!(matches!(err, FramerError::UnknownPattern { index: 7, .. }));
    }

    #[test]
    fn end_delimiter_in_payload_rejected() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut writer = MessageWriter::new(cursor, test_patterns()).unwrap();

        let err = writer.send(0, b"a>>b").unwrap_err();
        assert!(matches!(
            err,
            FramerError::EndDelimiterInPayload { pattern: 0 }
        ));
    }

    #[test]
    fn invalid_pattern_set_rejected() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let err = MessageWriter::new(cursor, Vec::new()).unwrap_err();
        assert!(matches!(err, FramerError::EmptyPatternSet));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = MessageWriter::new(sink, test_patterns()).unwrap();

        writer.send(0, b"x").unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let sink = RetryOnceWriter {
            kind: ErrorKind::Interrupted,
            wrote_once: false,
            flush_failed: false,
            data: Vec::new(),
        };
        let mut writer = MessageWriter::new(sink, test_patterns()).unwrap();

        writer.send(0, b"retry").unwrap();

        assert_eq!(writer.into_inner().data, b"<<retry>>");
    }

    #[test]
    fn handles_would_block_write_and_flush() {
        let sink = RetryOnceWriter {
            kind: ErrorKind::WouldBlock,
            wrote_once: false,
            flush_failed: false,
            data: Vec::new(),
        };
        let mut writer = MessageWriter::new(sink, test_patterns()).unwrap();

        writer.send(0, b"retry").unwrap();

        assert_eq!(writer.into_inner().data, b"<<retry>>");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = MessageWriter::new(ZeroWriter, test_patterns()).unwrap();
        let err = writer.send(0, b"x").unwrap_err();
        assert!(matches!(err, FramerError::ConnectionClosed));
    }

    #[test]
    fn short_writes_are_resumed() {
        let sink = OneBytePerWrite { data: Vec::new() };
        let mut writer = MessageWriter::new(sink, test_patterns()).unwrap();

        writer.send(0, b"drip").unwrap();

        assert_eq!(writer.into_inner().data, b"<<drip>>");
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RetryOnceWriter {
        kind: ErrorKind,
        wrote_once: bool,
        flush_failed: bool,
        data: Vec<u8>,
    }

    impl Write for RetryOnceWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(self.kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_failed {
                self.flush_failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct OneBytePerWrite {
        data: Vec<u8>,
    }

    impl Write for OneBytePerWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.is_empty() {
                return Ok(0);
            }
            self.data.push(buf[0]);
            Ok(1)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
