//! Memoizes opened [`RegionFile`] handles across a region directory, keyed
//! by region coordinates, per spec.md §4.6.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::nbt::Compound;

use super::file::RegionFile;

fn region_coords(chunk_x: i32, chunk_z: i32) -> (i32, i32) {
    (chunk_x.div_euclid(32), chunk_z.div_euclid(32))
}

/// Not safe to share across writers without external synchronization
/// (spec.md §5): each instance owns an exclusive cache of file handles.
pub struct RegionDirectoryLoader {
    dir: PathBuf,
    cache: HashMap<(i32, i32), RegionFile>,
}

impl RegionDirectoryLoader {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf(), cache: HashMap::new() }
    }

    fn region_path(&self, region_x: i32, region_z: i32) -> Option<PathBuf> {
        for ext in ["mca", "mcr"] {
            let candidate = self.dir.join(format!("r.{region_x}.{region_z}.{ext}"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Loads a chunk's NBT, opening (and caching) its region file on first
    /// access. Returns `None` if the region file itself, or the chunk slot
    /// within it, doesn't exist.
    pub fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<Option<Compound>> {
        let key = region_coords(chunk_x, chunk_z);
        if !self.cache.contains_key(&key) {
            match self.region_path(key.0, key.1) {
                Some(path) => {
                    log::debug!("opening region file {}", path.display());
                    self.cache.insert(key, RegionFile::open(path)?);
                }
                None => {
                    log::trace!("no region file covers chunk ({chunk_x}, {chunk_z})");
                    return Ok(None);
                }
            }
        }

        let region = self.cache.get_mut(&key).expect("inserted above if absent");
        region.load_chunk(chunk_x, chunk_z)
    }

    /// Releases every cached handle. If closing more than one handle fails,
    /// the first error is returned but every handle is still closed.
    pub fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        for (_, region) in self.cache.drain() {
            if let Err(e) = region.close() {
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_region_file_returns_none_without_erroring() {
        let dir = std::env::temp_dir().join(format!("ooze-loader-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let mut loader = RegionDirectoryLoader::new(&dir);
        assert!(loader.load_chunk(5, 5).unwrap().is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn region_coords_use_floor_division() {
        assert_eq!(region_coords(-1, -1), (-1, -1));
        assert_eq!(region_coords(31, 31), (0, 0));
        assert_eq!(region_coords(32, 32), (1, 1));
    }
}
