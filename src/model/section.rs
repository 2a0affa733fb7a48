//! A 16x16x16 block volume. Per spec.md §9's re-architecture guidance, a
//! `Section` does not own a palette: it borrows whichever [`BlockPalette`]
//! currently resolves its ids: a section-local palette while being built
//! standalone, or the owning [`super::Chunk`]'s shared palette once inserted.
use std::cell::Cell;

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::intarray::{AnyIntArray, IntArray};
use crate::palette::BlockPalette;

#[derive(Debug, Clone)]
pub struct Section {
    altitude: i32,
    storage: AnyIntArray,
    empty_cache: Cell<Option<bool>>,
}

impl Section {
    /// `storage` must describe exactly 4096 cells (a 16x16x16 volume).
    pub fn new(altitude: i32, storage: AnyIntArray) -> Result<Self> {
        if storage.size() != 4096 {
            return Err(Error::WrongSectionVolume(storage.size()));
        }
        Ok(Self { altitude, storage, empty_cache: Cell::new(None) })
    }

    pub fn altitude(&self) -> i32 {
        self.altitude
    }

    pub fn storage(&self) -> &AnyIntArray {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut AnyIntArray {
        self.empty_cache.set(None);
        &mut self.storage
    }

    fn index(x: usize, y: usize, z: usize) -> Result<usize> {
        if x >= 16 || y >= 16 || z >= 16 {
            return Err(Error::IndexOutOfBounds { index: (x.max(y).max(z)) as i64, size: 16 });
        }
        Ok(y * 256 + z * 16 + x)
    }

    pub fn get_block_at<'p>(&self, palette: &'p BlockPalette, x: usize, y: usize, z: usize) -> Result<&'p BlockState> {
        let idx = Self::index(x, y, z)?;
        let id = self.storage.get(idx)? as usize;
        Ok(palette.get_state(id).unwrap_or_else(|| BlockState::default_state()))
    }

    /// Ensures `state` is present in `palette` (adding it if needed), writes
    /// its id, and invalidates the cached empty flag.
    pub fn set_block_at(&mut self, palette: &mut BlockPalette, x: usize, y: usize, z: usize, state: BlockState) -> Result<()> {
        let idx = Self::index(x, y, z)?;
        let id = palette.add_state(state);
        self.storage.set(idx, id as u64)?;
        self.empty_cache.set(None);
        Ok(())
    }

    /// True iff every stored cell resolves to an air state via `palette`.
    /// Memoized until the next mutation.
    pub fn is_empty(&self, palette: &BlockPalette) -> bool {
        if let Some(cached) = self.empty_cache.get() {
            return cached;
        }
        let empty = (0..self.storage.size()).all(|i| {
            let id = self.storage.get(i).expect("index within size") as usize;
            palette.get_state(id).map(|s| s.is_air()).unwrap_or(true)
        });
        self.empty_cache.set(Some(empty));
        empty
    }
}
