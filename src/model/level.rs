//! A sparse map of [`Chunk`]s plus world-level NBT, per spec.md §3/§4.4.
use std::collections::HashMap;

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::nbt::Compound;

use super::chunk::Chunk;
use super::Location2D;

/// Chunk coordinates are representable as signed 16-bit, and a level's
/// chunk-grid span may not exceed this on either axis (spec.md §3).
const MAX_SPAN: i64 = 65_535;

#[derive(Debug, Clone)]
pub struct Level {
    chunks: HashMap<Location2D, Chunk>,
    low_x: i32,
    high_x: i32,
    low_z: i32,
    high_z: i32,
    entities: Vec<Compound>,
    block_entities: Vec<Compound>,
    custom: Option<Compound>,
}

impl Level {
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
            low_x: 0,
            high_x: -1,
            low_z: 0,
            high_z: -1,
            entities: Vec::new(),
            block_entities: Vec::new(),
            custom: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_at(&self, location: Location2D) -> Option<&Chunk> {
        self.chunks.get(&location)
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&Location2D, &Chunk)> {
        self.chunks.iter()
    }

    pub fn world_entities(&self) -> &[Compound] {
        &self.entities
    }

    pub fn world_block_entities(&self) -> &[Compound] {
        &self.block_entities
    }

    pub fn custom(&self) -> Option<&Compound> {
        self.custom.as_ref()
    }

    pub fn set_custom(&mut self, custom: Option<Compound>) {
        self.custom = custom;
    }

    /// `high_x - low_x + 1`, or 0 if the level has no chunks.
    pub fn width(&self) -> u32 {
        if self.chunks.is_empty() {
            0
        } else {
            (self.high_x - self.low_x + 1) as u32
        }
    }

    /// `high_z - low_z + 1`, or 0 if the level has no chunks.
    pub fn depth(&self) -> u32 {
        if self.chunks.is_empty() {
            0
        } else {
            (self.high_z - self.low_z + 1) as u32
        }
    }

    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        if self.chunks.is_empty() {
            None
        } else {
            Some((self.low_x, self.high_x, self.low_z, self.high_z))
        }
    }

    fn in_bounds(&self, location: Location2D) -> bool {
        if location.x < i16::MIN as i32
            || location.x > i16::MAX as i32
            || location.z < i16::MIN as i32
            || location.z > i16::MAX as i32
        {
            return false;
        }

        let new_low_x = self.low_x.min(location.x) as i64;
        let new_high_x = self.high_x.max(location.x) as i64;
        let new_low_z = self.low_z.min(location.z) as i64;
        let new_high_z = self.high_z.max(location.z) as i64;

        if self.chunks.is_empty() {
            return true;
        }

        new_high_x - new_low_x + 1 <= MAX_SPAN && new_high_z - new_low_z + 1 <= MAX_SPAN
    }

    /// Inserts (or replaces) a chunk. Fails if the chunk's location cannot be
    /// represented within the level's bounds (spec.md §3).
    pub fn store_chunk(&mut self, chunk: Chunk) -> Result<()> {
        let location = chunk.location();
        if !self.in_bounds(location) {
            return Err(Error::ChunkOutOfBounds { x: location.x, z: location.z });
        }

        if self.chunks.is_empty() {
            self.low_x = location.x;
            self.high_x = location.x;
            self.low_z = location.z;
            self.high_z = location.z;
        } else {
            self.low_x = self.low_x.min(location.x);
            self.high_x = self.high_x.max(location.x);
            self.low_z = self.low_z.min(location.z);
            self.high_z = self.high_z.max(location.z);
        }

        self.chunks.insert(location, chunk);
        Ok(())
    }

    /// `(floor(x/16), floor(z/16))` and the within-chunk remainder, for a
    /// world block coordinate.
    pub fn coord_to_chunk(x: i32, z: i32) -> (Location2D, (usize, usize)) {
        (Location2D::new(x >> 4, z >> 4), ((x & 15) as usize, (z & 15) as usize))
    }

    pub fn block_at(&self, x: i32, y: i32, z: i32) -> Result<&BlockState> {
        let (loc, (lx, lz)) = Self::coord_to_chunk(x, z);
        match self.chunks.get(&loc) {
            None => Ok(BlockState::default_state()),
            Some(chunk) => chunk.get_block_at(lx, y, lz),
        }
    }

    fn entity_chunk(entity: &Compound) -> Option<Location2D> {
        let pos = entity.get_list("Pos")?;
        if pos.len() != 3 {
            return None;
        }
        let x = as_f64(&pos[0])?;
        let z = as_f64(&pos[2])?;
        Some(Location2D::new((x / 16.0).floor() as i32, (z / 16.0).floor() as i32))
    }

    fn block_entity_chunk(entity: &Compound) -> Location2D {
        let x = entity.get_int("x", 0);
        let z = entity.get_int("z", 0);
        Location2D::new(x.div_euclid(16), z.div_euclid(16))
    }

    /// The subset of the world-wide entity list whose `Pos` falls inside
    /// `location`.
    pub fn entities_for_chunk(&self, location: Location2D) -> Vec<Compound> {
        self.entities
            .iter()
            .filter(|e| Self::entity_chunk(e) == Some(location))
            .cloned()
            .collect()
    }

    /// The subset of the world-wide block-entity list whose `x`/`z` fall
    /// inside `location`.
    pub fn block_entities_for_chunk(&self, location: Location2D) -> Vec<Compound> {
        self.block_entities
            .iter()
            .filter(|e| Self::block_entity_chunk(e) == location)
            .cloned()
            .collect()
    }

    /// Replaces every world-wide entity belonging to `location` with `list`.
    /// Fails if `list` is non-empty and contains anything but compounds:
    /// that check is the caller's responsibility before calling this with
    /// raw NBT list content; here every element is already a [`Compound`].
    pub fn set_entities(&mut self, location: Location2D, list: Vec<Compound>) {
        self.entities.retain(|e| Self::entity_chunk(e) != Some(location));
        self.entities.extend(list);
    }

    pub fn set_block_entities(&mut self, location: Location2D, list: Vec<Compound>) {
        self.block_entities.retain(|e| Self::block_entity_chunk(e) != location);
        self.block_entities.extend(list);
    }

    /// Bulk-assigns the world-wide entity list wholesale, bypassing the
    /// per-chunk diff of [`Self::set_entities`]: used when the codec
    /// deserializes a level from scratch and there is nothing to diff
    /// against.
    pub fn load_world_entities(&mut self, list: Vec<Compound>) {
        self.entities = list;
    }

    pub fn load_world_block_entities(&mut self, list: Vec<Compound>) {
        self.block_entities = list;
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::new()
    }
}

fn as_f64(value: &fastnbt::Value) -> Option<f64> {
    use fastnbt::Value;
    match value {
        Value::Double(d) => Some(*d),
        Value::Float(f) => Some(*f as f64),
        Value::Int(i) => Some(*i as f64),
        Value::Long(l) => Some(*l as f64),
        _ => None,
    }
}
