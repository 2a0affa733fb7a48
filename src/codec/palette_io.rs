//! Palette binary form, per spec.md §4.2: `VarInt(size)`, then per entry a
//! length/flags byte, the ASCII name, and an optional unnamed NBT compound
//! of properties.
//!
//! The properties compound is length-prefixed with its own `VarInt` byte
//! length before its bytes. `fastnbt`'s serde surface (`from_bytes`/
//! `to_bytes`) only decodes a complete, already-bounded slice, so the only
//! way to pull a compound out of the middle of a shared buffer and still
//! know where the next palette entry's flags byte starts is to record its
//! length ourselves, the same way the region file header length-prefixes
//! each chunk's NBT payload (spec.md §4.6).
use std::io::{Read, Write};

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::palette::BlockPalette;
use crate::resource::ResourceLocation;

use super::varint::{read_varint, write_varint};

const MAX_NAME_LEN: usize = 127;

pub fn write_palette<W: Write>(w: &mut W, palette: &BlockPalette) -> Result<()> {
    write_varint(w, palette.size() as u32)?;
    for state in palette.states() {
        let name = state.name().to_string();
        if name.len() > MAX_NAME_LEN {
            return Err(Error::Corrupt("palette entry name exceeds 127 bytes"));
        }
        let has_properties = state.properties().is_some();
        let flags_and_len = ((name.len() as u8) << 1) | (has_properties as u8);
        w.write_all(&[flags_and_len])?;
        w.write_all(name.as_bytes())?;
        if let Some(properties) = state.properties() {
            let bytes = properties.write()?;
            write_varint(w, bytes.len() as u32)?;
            w.write_all(&bytes)?;
        }
    }
    Ok(())
}

pub fn read_palette<R: Read>(r: &mut R) -> Result<BlockPalette> {
    let size = read_varint(r)? as usize;
    if size == 0 {
        return Err(Error::Corrupt("palette blob declares zero entries"));
    }

    let mut states = Vec::with_capacity(size);
    for _ in 0..size {
        let mut flags_and_len = [0u8; 1];
        r.read_exact(&mut flags_and_len)?;
        let has_properties = flags_and_len[0] & 1 != 0;
        let name_len = (flags_and_len[0] >> 1) as usize;

        let mut name_bytes = vec![0u8; name_len];
        r.read_exact(&mut name_bytes)?;
        let name = String::from_utf8(name_bytes)
            .map_err(|_| Error::Corrupt("palette entry name is not valid utf-8"))?;
        let location = ResourceLocation::parse(&name)?;

        let properties = if has_properties {
            let len = read_varint(r)? as usize;
            let mut bytes = vec![0u8; len];
            r.read_exact(&mut bytes)?;
            Some(crate::nbt::Compound::read(&bytes)?)
        } else {
            None
        };

        states.push(BlockState::new(location, properties));
    }

    let mut iter = states.into_iter();
    let mut palette = BlockPalette::with_default(iter.next().expect("size > 0"));
    for state in iter {
        palette.add_state(state);
    }
    Ok(palette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_palette_with_and_without_properties() {
        let mut palette = BlockPalette::new();
        palette.add_state(BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), None));
        let mut props = crate::nbt::Compound::new();
        props.insert("axis", fastnbt::Value::String("y".into()));
        palette.add_state(BlockState::new(ResourceLocation::parse("minecraft:oak_log").unwrap(), Some(props)));

        let mut buf = Vec::new();
        write_palette(&mut buf, &palette).unwrap();
        let back = read_palette(&mut Cursor::new(buf)).unwrap();

        assert_eq!(back.size(), palette.size());
        for i in 0..palette.size() {
            assert_eq!(back.get_state(i), palette.get_state(i));
        }
    }

    #[test]
    fn rejects_name_over_127_bytes() {
        let long_path = "a".repeat(200);
        let mut palette = BlockPalette::new();
        palette.add_state(BlockState::new(ResourceLocation::new("minecraft", long_path).unwrap(), None));
        let mut buf = Vec::new();
        assert!(write_palette(&mut buf, &palette).is_err());
    }
}
