//! Builds an in-memory [`Level`] from a region directory, per spec.md §4.6's
//! "Level assembly" and §6.5's `LevelBuilder`.
use std::collections::{BTreeSet, HashMap};

use fastnbt::Value;

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::intarray::{AnyIntArray, BitCompactIntArray, IntArray, WordedIntArray};
use crate::legacy;
use crate::model::chunk::Chunk;
use crate::model::section::Section;
use crate::model::{Level, Location2D};
use crate::nbt::Compound;
use crate::palette::BlockPalette;
use crate::resource::ResourceLocation;

use super::loader::RegionDirectoryLoader;

const DEFAULT_DATA_VERSION: i32 = 99;
/// The flattening (8-bit id -> `(name, properties)`) landed in 1.13,
/// DataVersion 1451.
const FLATTENING_DATA_VERSION: i32 = 1451;
/// 1.16 switched block-state long arrays from the straddling ("legacy")
/// packing to word-aligned padding, DataVersion 2527.
const PADDED_LONG_ARRAY_DATA_VERSION: i32 = 2527;

fn get_nibble(data: &[i8], index: usize) -> u8 {
    let byte = data[index / 2] as u8;
    if index % 2 == 0 {
        byte & 0x0F
    } else {
        (byte >> 4) & 0x0F
    }
}

fn decode_nbt_palette(list: &[Value]) -> Result<BlockPalette> {
    let compounds = Compound::as_compound_elements(list)
        .ok_or(Error::WrongNbtType("Palette"))?;
    let mut iter = compounds.into_iter();
    let first = iter.next().ok_or(Error::Corrupt("Palette list is empty"))?;
    let mut palette = BlockPalette::with_default(decode_nbt_palette_entry(&first)?);
    for entry in iter {
        palette.add_state(decode_nbt_palette_entry(&entry)?);
    }
    Ok(palette)
}

fn decode_nbt_palette_entry(entry: &Compound) -> Result<BlockState> {
    let name = entry.get_string("Name").ok_or(Error::MissingNbtField("Name"))?;
    let location = ResourceLocation::parse(name)?;
    let properties = entry.get_compound("Properties");
    Ok(BlockState::new(location, properties))
}

fn decode_modern_section(y: i8, section_nbt: &Compound, data_version: i32) -> Result<Option<(Section, BlockPalette)>> {
    let palette_list = match section_nbt.get_list("Palette") {
        Some(l) => l,
        None => return Ok(None),
    };
    let longs = match section_nbt.get_long_array("BlockStates") {
        Some(l) => l,
        None => return Ok(None),
    };

    let palette = decode_nbt_palette(palette_list)?;
    let max_value = (palette.size() - 1) as u64;

    let raw: Vec<u8> = longs.iter().flat_map(|l| (*l as u64).to_le_bytes()).collect();
    let legacy_packing = data_version < PADDED_LONG_ARRAY_DATA_VERSION;
    let worded = WordedIntArray::from_raw(&raw, 4096, max_value, legacy_packing)?;

    let section = Section::new(y as i32, AnyIntArray::Worded(worded))?;
    Ok(Some((section, palette)))
}

fn decode_legacy_section(y: i8, section_nbt: &Compound) -> Result<Option<(Section, BlockPalette)>> {
    let blocks = match section_nbt.get_byte_array("Blocks") {
        Some(b) if b.len() == 4096 => b,
        Some(_) => return Err(Error::Corrupt("legacy Blocks array is not 4096 bytes")),
        None => return Ok(None),
    };
    let add = section_nbt.get_byte_array("Add");
    let data = section_nbt.get_byte_array("Data");

    let mut palette = BlockPalette::new();
    let mut cache: HashMap<u16, u64> = HashMap::new();
    let mut ids = vec![0u64; 4096];

    for i in 0..4096 {
        let base_id = blocks[i] as u8 as u16;
        let overflow = add.map(|a| get_nibble(a, i) as u16).unwrap_or(0);
        let block_id = base_id | (overflow << 8);
        let block_data = data.map(|d| get_nibble(d, i)).unwrap_or(0);
        let key = legacy::legacy_key(block_id, block_data);

        let id = *cache.entry(key).or_insert_with(|| {
            let state = legacy::get_block_state_from_legacy(block_id, block_data);
            palette.add_state(state) as u64
        });
        ids[i] = id;
    }

    let max_value = palette.size() as u64 - 1;
    let mut storage = AnyIntArray::Compact(BitCompactIntArray::new(4096, max_value));
    for (i, id) in ids.into_iter().enumerate() {
        storage.set(i, id)?;
    }

    let section = Section::new(y as i32, storage)?;
    Ok(Some((section, palette)))
}

/// Decodes a single chunk's already-loaded NBT into a [`Chunk`], per
/// spec.md §4.6's "Level assembly".
pub fn decode_chunk_nbt(location: Location2D, root: &Compound) -> Result<Chunk> {
    let data_version = root.get_int("DataVersion", DEFAULT_DATA_VERSION);
    let level = root.get_compound("Level").ok_or(Error::MissingNbtField("Level"))?;

    if !level.contains_key("xPos") || !level.contains_key("zPos") {
        return Err(Error::MissingNbtField("xPos/zPos"));
    }

    let mut chunk = Chunk::new(location, data_version);

    if let Some(sections) = level.get_list("Sections").or_else(|| root.get_list("sections")) {
        let sections = Compound::as_compound_elements(sections).ok_or(Error::WrongNbtType("Sections"))?;
        for section_nbt in &sections {
            let y = section_nbt.get_int("Y", i32::MIN);
            if !(0..=15).contains(&y) {
                continue;
            }
            let y = y as i8;

            let decoded = if data_version > FLATTENING_DATA_VERSION {
                decode_modern_section(y, section_nbt, data_version)?
            } else {
                decode_legacy_section(y, section_nbt)?
            };

            if let Some((section, source_palette)) = decoded {
                chunk.set_section(section, &source_palette)?;
            }
        }
    }

    if let Some(entities) = level.get_list("Entities").or_else(|| root.get_list("Entities")) {
        let entities = Compound::as_compound_elements(entities).ok_or(Error::WrongNbtType("Entities"))?;
        chunk.set_entities_raw(entities);
    }
    if let Some(block_entities) = level.get_list("TileEntities").or_else(|| root.get_list("block_entities")) {
        let block_entities =
            Compound::as_compound_elements(block_entities).ok_or(Error::WrongNbtType("TileEntities"))?;
        chunk.set_block_entities_raw(block_entities);
    }

    Ok(chunk)
}

/// Loads one chunk from a region directory and decodes it, returning `None`
/// if the chunk isn't present in any region file.
pub fn load_chunk(loader: &mut RegionDirectoryLoader, x: i32, z: i32) -> Result<Option<Chunk>> {
    let Some(root) = loader.load_chunk(x, z)? else {
        log::trace!("chunk ({x}, {z}) absent from region directory");
        return Ok(None);
    };
    let chunk = decode_chunk_nbt(Location2D::new(x, z), &root)?;
    Ok(Some(chunk))
}

/// Builds a [`Level`] by ingesting a caller-specified set of chunk
/// coordinates out of a region directory, per spec.md §6.5.
pub struct LevelBuilder<'a> {
    loader: &'a mut RegionDirectoryLoader,
    coords: BTreeSet<(i32, i32)>,
}

impl<'a> LevelBuilder<'a> {
    pub fn new(loader: &'a mut RegionDirectoryLoader) -> Self {
        Self { loader, coords: BTreeSet::new() }
    }

    pub fn add_chunk(mut self, x: i32, z: i32) -> Self {
        self.coords.insert((x, z));
        self
    }

    pub fn add_rect(mut self, x0: i32, z0: i32, x1: i32, z1: i32) -> Self {
        let (lo_x, hi_x) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (lo_z, hi_z) = if z0 <= z1 { (z0, z1) } else { (z1, z0) };
        for x in lo_x..=hi_x {
            for z in lo_z..=hi_z {
                self.coords.insert((x, z));
            }
        }
        self
    }

    pub fn build(self) -> Result<Level> {
        let mut level = Level::new();
        let LevelBuilder { loader, coords } = self;
        for (x, z) in coords {
            let Some(chunk) = load_chunk(loader, x, z)? else {
                continue;
            };
            let location = chunk.location();
            let entities = chunk.entities().to_vec();
            let block_entities = chunk.block_entities().to_vec();
            level.store_chunk(chunk)?;
            level.set_entities(location, entities);
            level.set_block_entities(location, block_entities);
        }
        Ok(level)
    }
}
