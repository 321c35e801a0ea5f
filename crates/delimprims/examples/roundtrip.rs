//! Frame two messages into a buffer, then extract them back.
//!
//! Run with: cargo run --example roundtrip

use bytes::BytesMut;
use delimprims_frame::{encode_message, DelimiterPattern, Framer, FramerConfig};

fn main() -> delimprims_frame::Result<()> {
    let patterns = vec![
        DelimiterPattern::new("<<", ">>"),
        DelimiterPattern::new("[[", "]]"),
    ];

    let mut wire = BytesMut::new();
    encode_message(&patterns, 0, b"first message", &mut wire)?;
    encode_message(&patterns, 1, b"second message", &mut wire)?;

    let mut framer = Framer::new(patterns, FramerConfig::default())?;

    // Feed the wire bytes in small chunks, as a socket would deliver them.
    for chunk in wire.chunks(5) {
        framer.data_received(chunk, |pattern, body| {
            println!("pattern {pattern}: {}", String::from_utf8_lossy(body));
        })?;
    }

    Ok(())
}
