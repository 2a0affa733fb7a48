//! The `.ooze` container format, per spec.md §4.5:
//!
//! ```text
//! header
//! u8 width, u8 depth
//! i16 min_chunk_x, i16 min_chunk_z
//! bitset(width*depth) chunk_mask
//! zstd_frame { chunk_payload for every set bit, row-major (x outer, z inner) }
//! nbt_list block_entities
//! nbt_list entities
//! u8 has_custom
//! if has_custom: zstd_frame { nbt_compound custom }
//! ```
use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, BE};

use crate::error::{Error, Result};
use crate::model::{Level, Location2D};

use super::bitset::{read_bitset, write_bitset};
use super::chunk_io::{read_chunk_payload, write_chunk_payload};
use super::nbt_list::{read_nbt_list, write_nbt_list};
use super::varint::{read_varint, write_varint};
use super::zstd_frame::{read_zstd_frame, write_zstd_frame};

/// `0x610BB10B`, read big-endian off the wire.
pub const MAGIC: u32 = 0x610B_B10B;
pub const FORMAT_VERSION: u32 = 0;

/// Write-time knobs that aren't part of the wire format itself. Per
/// spec.md §9 there is no config-file layer for a library, but the Zstd
/// compression level used for every frame is a real knob callers need.
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions {
    pub zstd_level: i32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { zstd_level: 3 }
    }
}

fn write_header<W: Write>(w: &mut W) -> Result<()> {
    w.write_u32::<BE>(MAGIC)?;
    write_varint(w, FORMAT_VERSION)?;
    Ok(())
}

fn read_header<R: Read>(r: &mut R) -> Result<()> {
    let magic = r.read_u32::<BE>()?;
    if magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }
    let version = read_varint(r)?;
    if version > FORMAT_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(())
}

pub fn write_level<W: Write>(w: &mut W, level: &Level, options: WriteOptions) -> Result<()> {
    write_header(w)?;

    let width = level.width();
    let depth = level.depth();
    if width > 255 || depth > 255 {
        return Err(Error::Corrupt("level spans more than 255 chunks on an axis; cannot encode as .ooze"));
    }
    w.write_u8(width as u8)?;
    w.write_u8(depth as u8)?;

    let (min_x, min_z) = match level.bounds() {
        Some((lo_x, _, lo_z, _)) => (lo_x as i16, lo_z as i16),
        None => (0, 0),
    };
    w.write_i16::<BE>(min_x)?;
    w.write_i16::<BE>(min_z)?;

    let mut mask = vec![false; (width * depth) as usize];
    for dx in 0..width {
        for dz in 0..depth {
            let location = Location2D::new(min_x as i32 + dx as i32, min_z as i32 + dz as i32);
            mask[(dx * depth + dz) as usize] = level.chunk_at(location).is_some();
        }
    }
    write_bitset(w, &mask)?;

    let mut chunk_stream = Vec::new();
    for dx in 0..width {
        for dz in 0..depth {
            if !mask[(dx * depth + dz) as usize] {
                continue;
            }
            let location = Location2D::new(min_x as i32 + dx as i32, min_z as i32 + dz as i32);
            let chunk = level.chunk_at(location).expect("mask bit was set for this location");
            write_chunk_payload(&mut chunk_stream, chunk)?;
        }
    }
    write_zstd_frame(w, options.zstd_level, &chunk_stream)?;

    write_nbt_list(w, level.world_block_entities(), options.zstd_level)?;
    write_nbt_list(w, level.world_entities(), options.zstd_level)?;

    match level.custom() {
        None => {
            w.write_u8(0)?;
        }
        Some(custom) => {
            w.write_u8(1)?;
            let payload = custom.write()?;
            write_zstd_frame(w, options.zstd_level, &payload)?;
        }
    }

    Ok(())
}

pub fn read_level<R: Read>(r: &mut R) -> Result<Level> {
    read_header(r)?;

    let width = r.read_u8()? as u32;
    let depth = r.read_u8()? as u32;
    let min_x = r.read_i16::<BE>()?;
    let min_z = r.read_i16::<BE>()?;

    let mask = read_bitset(r, (width * depth) as usize)?;

    let chunk_stream = read_zstd_frame(r)?;
    let mut cursor = Cursor::new(chunk_stream);

    let mut level = Level::new();
    for dx in 0..width {
        for dz in 0..depth {
            if !mask[(dx * depth + dz) as usize] {
                continue;
            }
            let location = Location2D::new(min_x as i32 + dx as i32, min_z as i32 + dz as i32);
            let chunk = read_chunk_payload(&mut cursor, location)?;
            level.store_chunk(chunk)?;
        }
    }

    let block_entities = read_nbt_list(r)?;
    level.load_world_block_entities(block_entities);
    let entities = read_nbt_list(r)?;
    level.load_world_entities(entities);

    let has_custom = r.read_u8()?;
    match has_custom {
        0 => level.set_custom(None),
        1 => {
            let payload = read_zstd_frame(r)?;
            let custom = crate::nbt::Compound::read(&payload)?;
            level.set_custom(Some(custom));
        }
        _ => return Err(Error::Corrupt("has_custom flag byte was neither 0 nor 1")),
    }

    Ok(level)
}
