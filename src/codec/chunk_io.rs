//! Chunk payload encoding, per spec.md §4.5:
//!
//! ```text
//! VarInt data_version
//! VarInt chunk_height_in_sections
//! VarInt min_section_altitude
//! bitset(chunk_height) non_empty_sections
//! if any bit set:
//!   palette_blob
//!   for bit i set (low -> high): compact_int_array_blob(size=4096, max_value=palette.size()-1)
//! ```
//!
//! A chunk with no resident sections collapses to its three leading VarInts
//! (all zero for a never-populated placeholder chunk) with no bitset: the
//! bitset only has meaning once there is at least one altitude to describe.
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::intarray::{AnyIntArray, BitCompactIntArray, IntArray};
use crate::model::chunk::Chunk;
use crate::model::section::Section;
use crate::model::Location2D;
use crate::palette::BlockPalette;

use super::bitset::{read_bitset, write_bitset};
use super::palette_io::{read_palette, write_palette};
use super::varint::{read_varint, read_varint_i32, write_varint, write_varint_i32};

fn write_compact_blob<W: Write>(w: &mut W, array: &BitCompactIntArray) -> Result<()> {
    write_varint(w, array.size() as u32)?;
    write_varint(w, array.max_value() as u32)?;
    w.write_all(array.raw_bytes())?;
    Ok(())
}

fn read_compact_blob<R: Read>(r: &mut R) -> Result<BitCompactIntArray> {
    let size = read_varint(r)? as usize;
    let max_value = read_varint(r)? as u64;
    let byte_len = (size as u64 * crate::intarray::bits_needed(max_value).max(1) as u64).div_ceil(8) as usize;
    let mut bytes = vec![0u8; byte_len];
    r.read_exact(&mut bytes)?;
    BitCompactIntArray::from_raw_bytes(&bytes, size, max_value)
}

pub fn write_chunk_payload<W: Write>(w: &mut W, chunk: &Chunk) -> Result<()> {
    write_varint_i32(w, chunk.data_version())?;

    let (min_altitude, max_altitude) = match (chunk.min_altitude(), chunk.max_altitude()) {
        (Some(lo), Some(hi)) => (lo, hi),
        _ => {
            write_varint(w, 0)?; // chunk_height_in_sections
            write_varint_i32(w, 0)?; // min_section_altitude
            return Ok(());
        }
    };

    let height = (max_altitude - min_altitude + 1) as usize;
    write_varint(w, height as u32)?;
    write_varint_i32(w, min_altitude)?;

    let palette = chunk.palette();
    let mut non_empty = vec![false; height];
    for i in 0..height {
        let altitude = min_altitude + i as i32;
        if let Some(section) = chunk.section_at(altitude) {
            non_empty[i] = !section.is_empty(palette);
        }
    }
    write_bitset(w, &non_empty)?;

    if non_empty.iter().any(|&b| b) {
        write_palette(w, palette)?;
        for (i, &set) in non_empty.iter().enumerate() {
            if !set {
                continue;
            }
            let altitude = min_altitude + i as i32;
            let section = chunk
                .section_at(altitude)
                .expect("bit was only set for a resident section");
            let mut compact = BitCompactIntArray::from_any(section.storage());
            // spec.md §4.5 specifies max_value = palette.size() - 1; the
            // section's own storage may have a looser max_value than that
            // (e.g. left over from a palette merge), so pin it down to the
            // chunk palette's size before writing the blob.
            let palette_max = palette.size() as u64 - 1;
            if compact.max_value() != palette_max {
                compact.set_max_value(palette_max)?;
            }
            write_compact_blob(w, &compact)?;
        }
    }

    Ok(())
}

pub fn read_chunk_payload<R: Read>(r: &mut R, location: Location2D) -> Result<Chunk> {
    let data_version = read_varint_i32(r)?;
    let height = read_varint(r)? as usize;
    let min_altitude = read_varint_i32(r)?;

    let mut chunk = Chunk::new(location, data_version);
    if height == 0 {
        return Ok(chunk);
    }

    let non_empty = read_bitset(r, height)?;
    if !non_empty.iter().any(|&b| b) {
        return Ok(chunk);
    }

    let palette = read_palette(r)?;
    for (i, &set) in non_empty.iter().enumerate() {
        if !set {
            continue;
        }
        let altitude = min_altitude + i as i32;
        let compact = read_compact_blob(r)?;
        if compact.size() != 4096 {
            return Err(Error::WrongSectionVolume(compact.size()));
        }
        let section = Section::new(altitude, AnyIntArray::Compact(compact))?;
        chunk.set_section(section, &palette)?;
    }

    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockState;
    use crate::resource::ResourceLocation;
    use std::io::Cursor;

    #[test]
    fn sectionless_chunk_round_trips_to_three_varints() {
        let chunk = Chunk::new(Location2D::new(0, 0), 0);
        let mut buf = Vec::new();
        write_chunk_payload(&mut buf, &chunk).unwrap();
        assert_eq!(buf, vec![0u8, 0u8, 0u8]);

        let back = read_chunk_payload(&mut Cursor::new(buf), Location2D::new(0, 0)).unwrap();
        assert_eq!(back.section_count(), 0);
    }

    #[test]
    fn all_air_section_round_trips_to_no_resident_section() {
        let mut chunk = Chunk::new(Location2D::new(0, 0), 3700);
        let local_palette = BlockPalette::new();
        let storage = AnyIntArray::Compact(BitCompactIntArray::new(4096, 0));
        let section = Section::new(0, storage).unwrap();
        chunk.set_section(section, &local_palette).unwrap();

        let mut buf = Vec::new();
        write_chunk_payload(&mut buf, &chunk).unwrap();
        let back = read_chunk_payload(&mut Cursor::new(buf), Location2D::new(0, 0)).unwrap();

        assert_eq!(back.data_version(), 3700);
        assert!(back.get_block_at(0, 0, 0).unwrap().is_air());
    }

    #[test]
    fn populated_section_round_trips_block_for_block() {
        let mut chunk = Chunk::new(Location2D::new(1, -2), 3700);
        let mut local_palette = BlockPalette::new();
        let stone = BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), None);
        let stone_id = local_palette.add_state(stone.clone());
        let mut storage = AnyIntArray::Compact(BitCompactIntArray::new(4096, stone_id as u64));
        for i in 0..4096 {
            if i % 3 == 0 {
                storage.set(i, stone_id as u64).unwrap();
            }
        }
        let section = Section::new(0, storage).unwrap();
        chunk.set_section(section, &local_palette).unwrap();

        let mut buf = Vec::new();
        write_chunk_payload(&mut buf, &chunk).unwrap();
        let back = read_chunk_payload(&mut Cursor::new(buf), Location2D::new(1, -2)).unwrap();

        for y in 0..16 {
            for z in 0..16 {
                for x in 0..16 {
                    let idx = y * 256 + z * 16 + x;
                    let expect_stone = idx % 3 == 0;
                    let got = back.get_block_at(x, y as i32, z).unwrap();
                    assert_eq!(got.is_air(), !expect_stone);
                }
            }
        }
    }
}
