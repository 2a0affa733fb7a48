//! NBT list form, per spec.md §4.5.2: `VarInt(count)` followed, if non-zero,
//! by a single Zstd frame wrapping `count` compounds. An empty list writes
//! only the `VarInt(0)` (one `0x00` byte).
//!
//! Each compound inside the frame is prefixed with its own `VarInt` byte
//! length. `fastnbt::from_bytes` only decodes a complete, already-bounded
//! slice (there is no reader-based entry point that reports how much it
//! consumed), so a length prefix is the only way to pull `count` compounds
//! back out of one shared buffer.
use std::io::{Read, Write};

use crate::error::Result;
use crate::nbt::Compound;

use super::varint::{read_varint, write_varint};
use super::zstd_frame::{read_zstd_frame, write_zstd_frame};

pub fn write_nbt_list<W: Write>(w: &mut W, list: &[Compound], zstd_level: i32) -> Result<()> {
    write_varint(w, list.len() as u32)?;
    if list.is_empty() {
        return Ok(());
    }

    let mut payload = Vec::new();
    for compound in list {
        let bytes = compound.write()?;
        write_varint(&mut payload, bytes.len() as u32)?;
        payload.extend_from_slice(&bytes);
    }
    write_zstd_frame(w, zstd_level, &payload)
}

pub fn read_nbt_list<R: Read>(r: &mut R) -> Result<Vec<Compound>> {
    let count = read_varint(r)? as usize;
    if count == 0 {
        return Ok(Vec::new());
    }

    let payload = read_zstd_frame(r)?;
    let mut cursor: &[u8] = &payload;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let len = read_varint(&mut cursor)? as usize;
        if cursor.len() < len {
            return Err(crate::error::Error::Corrupt("nbt list entry length exceeds remaining buffer"));
        }
        let (doc, rest) = cursor.split_at(len);
        out.push(Compound::read(doc)?);
        cursor = rest;
    }
    Ok(out)
}
