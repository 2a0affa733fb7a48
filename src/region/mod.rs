//! Minecraft region/anvil ingest: reading `.mca`/`.mcr` files and decoding
//! their chunk NBT into the voxel model, per spec.md §4.6.
pub mod file;
pub mod ingest;
pub mod loader;

pub use file::RegionFile;
pub use ingest::{decode_chunk_nbt, load_chunk, LevelBuilder};
pub use loader::RegionDirectoryLoader;
