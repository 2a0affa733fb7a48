//! A 16-wide x 16-deep column of [`Section`]s sharing a single palette. See
//! spec.md §3/§4.4.
use std::collections::BTreeMap;

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::intarray::{AnyIntArray, BitCompactIntArray, IntArray};
use crate::nbt::Compound;
use crate::palette::BlockPalette;

use super::section::Section;
use super::Location2D;

#[derive(Debug, Clone)]
pub struct Chunk {
    location: Location2D,
    palette: BlockPalette,
    sections: BTreeMap<i32, Section>,
    data_version: i32,
    entities: Vec<Compound>,
    block_entities: Vec<Compound>,
}

impl Chunk {
    pub fn new(location: Location2D, data_version: i32) -> Self {
        Self {
            location,
            palette: BlockPalette::new(),
            sections: BTreeMap::new(),
            data_version,
            entities: Vec::new(),
            block_entities: Vec::new(),
        }
    }

    pub fn location(&self) -> Location2D {
        self.location
    }

    pub fn data_version(&self) -> i32 {
        self.data_version
    }

    pub fn set_data_version(&mut self, version: i32) {
        self.data_version = version;
    }

    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }

    pub fn entities(&self) -> &[Compound] {
        &self.entities
    }

    pub fn block_entities(&self) -> &[Compound] {
        &self.block_entities
    }

    pub fn set_entities_raw(&mut self, entities: Vec<Compound>) {
        self.entities = entities;
    }

    pub fn set_block_entities_raw(&mut self, block_entities: Vec<Compound>) {
        self.block_entities = block_entities;
    }

    pub fn min_altitude(&self) -> Option<i32> {
        self.sections.keys().next().copied()
    }

    pub fn max_altitude(&self) -> Option<i32> {
        self.sections.keys().next_back().copied()
    }

    /// `16 * (max - min + 1)` when any section is present, else 0.
    pub fn height(&self) -> usize {
        match (self.min_altitude(), self.max_altitude()) {
            (Some(lo), Some(hi)) => 16 * (hi - lo + 1) as usize,
            _ => 0,
        }
    }

    pub fn section_at(&self, altitude: i32) -> Option<&Section> {
        self.sections.get(&altitude)
    }

    /// Sections in ascending altitude order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Inserts `section`, whose cells are currently indexed against
    /// `source_palette` (not necessarily this chunk's palette). Fails if a
    /// section already occupies that altitude. The section's palette is
    /// merged into the chunk's shared palette and its storage rewritten
    /// through the resulting upgrader, per spec.md §4.4.
    pub fn set_section(&mut self, section: Section, source_palette: &BlockPalette) -> Result<()> {
        if self.sections.contains_key(&section.altitude()) {
            return Err(Error::DuplicateAltitude(section.altitude()));
        }

        let mut storage = AnyIntArray::Compact(BitCompactIntArray::from_any(section.storage()));
        let upgrader = self.palette.add_all(source_palette);
        if !upgrader.no_changes() {
            upgrader.upgrade_array(&mut storage)?;
        }

        let merged = Section::new(section.altitude(), storage)?;
        self.sections.insert(merged.altitude(), merged);
        Ok(())
    }

    /// Requires `0 <= x,z < 16`; `y` may be any altitude. Locates the section
    /// by `floor(y/16)`; returns the default (air) state if no section is
    /// resident at that altitude.
    pub fn get_block_at(&self, x: usize, y: i32, z: usize) -> Result<&BlockState> {
        if x >= 16 || z >= 16 {
            return Err(Error::IndexOutOfBounds { index: (x.max(z)) as i64, size: 16 });
        }
        let altitude = y.div_euclid(16);
        match self.sections.get(&altitude) {
            None => Ok(BlockState::default_state()),
            Some(section) => {
                let local_y = y.rem_euclid(16) as usize;
                section.get_block_at(&self.palette, x, local_y, z)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intarray::BitCompactIntArray;
    use crate::resource::ResourceLocation;

    fn all_air_section(altitude: i32) -> (Section, BlockPalette) {
        let palette = BlockPalette::new();
        let storage = AnyIntArray::Compact(BitCompactIntArray::new(4096, 0));
        (Section::new(altitude, storage).unwrap(), palette)
    }

    #[test]
    fn fresh_chunk_is_airy_everywhere() {
        let chunk = Chunk::new(Location2D::new(0, 0), 3700);
        assert!(chunk.get_block_at(0, 0, 0).unwrap().is_air());
        assert_eq!(chunk.height(), 0);
    }

    #[test]
    fn inserting_at_duplicate_altitude_fails() {
        let mut chunk = Chunk::new(Location2D::new(0, 0), 3700);
        let (s1, p1) = all_air_section(0);
        chunk.set_section(s1, &p1).unwrap();
        let (s2, p2) = all_air_section(0);
        assert!(chunk.set_section(s2, &p2).is_err());
    }

    #[test]
    fn height_reflects_min_and_max_altitude() {
        let mut chunk = Chunk::new(Location2D::new(0, 0), 3700);
        let (s0, p0) = all_air_section(-2);
        let (s1, p1) = all_air_section(3);
        chunk.set_section(s0, &p0).unwrap();
        chunk.set_section(s1, &p1).unwrap();
        assert_eq!(chunk.min_altitude(), Some(-2));
        assert_eq!(chunk.max_altitude(), Some(3));
        assert_eq!(chunk.height(), 16 * 6);
    }

    #[test]
    fn inserted_section_resolves_block_through_chunk_palette() {
        let mut chunk = Chunk::new(Location2D::new(0, 0), 3700);
        let mut local_palette = BlockPalette::new();
        let stone = BlockState::new(ResourceLocation::parse("minecraft:stone").unwrap(), None);
        let stone_id = local_palette.add_state(stone.clone());
        let mut storage = AnyIntArray::Compact(BitCompactIntArray::new(4096, stone_id as u64));
        storage.set(0, stone_id as u64).unwrap();
        let section = Section::new(0, storage).unwrap();

        chunk.set_section(section, &local_palette).unwrap();
        assert_eq!(chunk.get_block_at(0, 0, 0).unwrap(), &stone);
    }

    #[test]
    fn out_of_range_xz_is_rejected() {
        let chunk = Chunk::new(Location2D::new(0, 0), 3700);
        assert!(chunk.get_block_at(16, 0, 0).is_err());
    }
}
