//! Zstandard-framed byte streams, per spec.md §4.5.1:
//! `VarInt(uncompressed_len), VarInt(compressed_len), raw bytes`.
//!
//! Per spec.md §4.5.1, nesting a frame inside another frame's payload is
//! forbidden. The codec never needs to nest frames by construction, but we
//! still enforce it defensively with a reentrancy flag, matching the
//! single-threaded, cooperatively-invoked concurrency model of spec.md §5:
//! a thread-local flag, rather than a global atomic, is the right tool.
use std::cell::Cell;
use std::io::{Read, Write};

use crate::error::{Error, Result};

use super::varint::{read_varint, write_varint};

thread_local! {
    static IN_FRAME: Cell<bool> = const { Cell::new(false) };
}

struct FrameGuard;

impl FrameGuard {
    fn enter() -> Result<Self> {
        let already = IN_FRAME.with(|f| f.get());
        if already {
            return Err(Error::NestedZstdFrame);
        }
        IN_FRAME.with(|f| f.set(true));
        Ok(Self)
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        IN_FRAME.with(|f| f.set(false));
    }
}

pub fn write_zstd_frame<W: Write>(w: &mut W, level: i32, payload: &[u8]) -> Result<()> {
    let _guard = FrameGuard::enter()?;
    let compressed = zstd::stream::encode_all(payload, level).map_err(|e| Error::Zstd(e.to_string()))?;
    write_varint(w, payload.len() as u32)?;
    write_varint(w, compressed.len() as u32)?;
    w.write_all(&compressed)?;
    Ok(())
}

pub fn read_zstd_frame<R: Read>(r: &mut R) -> Result<Vec<u8>> {
    let _guard = FrameGuard::enter()?;
    let uncompressed_len = read_varint(r)? as usize;
    let compressed_len = read_varint(r)? as usize;
    let mut compressed = vec![0u8; compressed_len];
    r.read_exact(&mut compressed)?;
    let decompressed =
        zstd::stream::decode_all(compressed.as_slice()).map_err(|e| Error::Zstd(e.to_string()))?;
    if decompressed.len() != uncompressed_len {
        return Err(Error::LengthMismatch { expected: uncompressed_len, actual: decompressed.len() });
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_arbitrary_payload() {
        let payload = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let mut buf = Vec::new();
        write_zstd_frame(&mut buf, 3, &payload).unwrap();
        let back = read_zstd_frame(&mut Cursor::new(buf)).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn round_trips_empty_payload() {
        let mut buf = Vec::new();
        write_zstd_frame(&mut buf, 3, &[]).unwrap();
        let back = read_zstd_frame(&mut Cursor::new(buf)).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn nesting_is_rejected() {
        let payload = b"abc".repeat(10);
        let mut buf = Vec::new();
        write_zstd_frame(&mut buf, 3, &payload).unwrap();

        let _outer = FrameGuard::enter().unwrap();
        let err = read_zstd_frame(&mut Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, Error::NestedZstdFrame));
    }
}
