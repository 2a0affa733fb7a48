//! A single Minecraft region (`.mca`/`.mcr`) file reader, per spec.md §4.6.
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use flate2::read::{GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};
use crate::nbt::Compound;

const SECTOR_SIZE: u64 = 4096;
const LOCATION_TABLE_ENTRIES: usize = 1024;

fn decompress(tag: u8, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match tag & 0x7F {
        1 => {
            GzDecoder::new(data).read_to_end(&mut out)?;
        }
        2 => {
            ZlibDecoder::new(data).read_to_end(&mut out)?;
        }
        3 => out.extend_from_slice(data),
        other => return Err(Error::UnknownCompression(other)),
    }
    Ok(out)
}

/// A single opened region file. The 4096-byte location table is read once,
/// on open, and cached for the lifetime of this handle.
pub struct RegionFile {
    file: File,
    location_table: Vec<(u32, u8)>,
    dir: PathBuf,
}

impl RegionFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % SECTOR_SIZE != 0 {
            return Err(Error::Corrupt("region file size is not a multiple of 4096"));
        }

        let mut header = [0u8; SECTOR_SIZE as usize];
        file.read_exact(&mut header)?;

        let mut location_table = Vec::with_capacity(LOCATION_TABLE_ENTRIES);
        for i in 0..LOCATION_TABLE_ENTRIES {
            let entry = &header[i * 4..i * 4 + 4];
            let sector_offset = u32::from_be_bytes([0, entry[0], entry[1], entry[2]]);
            let sector_count = entry[3];
            location_table.push((sector_offset, sector_count));
        }

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self { file, location_table, dir })
    }

    /// Loads the NBT compound for `(chunk_x, chunk_z)` (region-relative or
    /// absolute, only the low 5 bits of each matter), or `None` if the slot
    /// is unoccupied.
    pub fn load_chunk(&mut self, chunk_x: i32, chunk_z: i32) -> Result<Option<Compound>> {
        let index = ((chunk_x & 31) | ((chunk_z & 31) << 5)) as usize;
        let (sector_offset, sector_count) = self.location_table[index];
        if sector_count == 0 {
            return Ok(None);
        }

        self.file.seek(SeekFrom::Start(sector_offset as u64 * SECTOR_SIZE))?;
        let mut sectors = vec![0u8; sector_count as usize * SECTOR_SIZE as usize];
        self.file.read_exact(&mut sectors)?;

        if sectors.len() < 5 {
            return Err(Error::Corrupt("region chunk sector is smaller than its own header"));
        }
        let length = u32::from_be_bytes([sectors[0], sectors[1], sectors[2], sectors[3]]) as usize;
        if length == 0 {
            return Err(Error::Corrupt("region chunk declares zero length"));
        }
        let tag = sectors[4];
        let external = tag & 0x80 != 0;

        if external {
            let path = self.dir.join(format!("c.{}.{}.mcc", chunk_x, chunk_z));
            let data = match std::fs::read(&path) {
                Ok(data) => data,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    log::warn!("external chunk file {} referenced but missing", path.display());
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            log::trace!("loaded external chunk ({chunk_x}, {chunk_z}) from {}", path.display());
            let nbt_bytes = decompress(tag, &data)?;
            return Ok(Some(Compound::read(&nbt_bytes)?));
        }

        let payload_len = length - 1; // length includes the compression tag byte
        if 5 + payload_len > sectors.len() {
            return Err(Error::Corrupt("region chunk payload exceeds its allocated sectors"));
        }
        let payload = &sectors[5..5 + payload_len];
        let nbt_bytes = decompress(tag, payload)?;
        Ok(Some(Compound::read(&nbt_bytes)?))
    }

    /// Read-only handles have nothing to flush; this exists so
    /// [`super::loader::RegionDirectoryLoader::close`] has a uniform
    /// per-file operation to call and propagate errors from.
    pub fn close(self) -> Result<()> {
        Ok(())
    }
}
