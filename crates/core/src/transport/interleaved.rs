//! Interleaved binary framing (RFC 2326 §10.12).
//!
//! RTP and RTCP packets share the RTSP TCP connection, each wrapped in a
//! 4-byte frame header between control messages:
//!
//! ```text
//! +--------+---------+-------------------+-----------------+
//! | `$`    | channel | length (u16, BE)  | payload ...     |
//! +--------+---------+-------------------+-----------------+
//! ```
//!
//! By convention channel `2n` carries RTP for track `n` and `2n + 1` the
//! matching RTCP.

use std::io::{self, Read, Write};

/// Leading byte of every interleaved frame.
pub const FRAME_MAGIC: u8 = b'$';

/// Maximum payload a frame can carry (length field is u16).
pub const MAX_FRAME_LEN: usize = u16::MAX as usize;

/// Write one frame.
///
/// Fails with `InvalidInput` when the payload exceeds [`MAX_FRAME_LEN`];
/// packets that large cannot be represented in this framing.
pub fn write_frame(writer: &mut impl Write, channel: u8, payload: &[u8]) -> io::Result<()> {
    let len = u16::try_from(payload.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "interleaved payload exceeds 65535 bytes",
        )
    })?;

    let mut head = [0u8; 4];
    head[0] = FRAME_MAGIC;
    head[1] = channel;
    head[2..4].copy_from_slice(&len.to_be_bytes());

    writer.write_all(&head)?;
    writer.write_all(payload)
}

/// Read the remainder of a frame once the leading `$` byte has been
/// consumed by the caller's demultiplexing step.
pub fn read_frame_after_magic(reader: &mut impl Read) -> io::Result<(u8, Vec<u8>)> {
    let mut head = [0u8; 3];
    reader.read_exact(&mut head)?;
    let channel = head[0];
    let len = u16::from_be_bytes([head[1], head[2]]) as usize;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok((channel, payload))
}
