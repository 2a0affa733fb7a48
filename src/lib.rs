//! `ooze`, a compact on-disk format for Minecraft-style voxel worlds, and
//! the codec machinery that converts between that format, in-memory world
//! state, and the legacy region/anvil format Minecraft itself uses.
//!
//! The crate is organized leaves-first, matching spec.md's component list:
//!
//! - [`resource`]: `namespace:path` identifiers.
//! - [`block`]: block states built on top of a [`resource::ResourceLocation`].
//! - [`intarray`]: the two bit-packed integer array layouts.
//! - [`palette`]: block-state deduplication and upgrader remapping.
//! - [`legacy`]: pre-flattening block decoding.
//! - [`model`]: sections, chunks, and levels.
//! - [`codec`]: the `.ooze` binary container format.
//! - [`region`]: the Minecraft region/anvil file reader.
//!
//! I/O is synchronous and every type here is meant to be owned by a single
//! writer at a time; see spec.md §5 for the full concurrency model.
pub mod block;
pub mod codec;
pub mod error;
pub mod intarray;
pub mod legacy;
pub mod model;
pub mod nbt;
pub mod palette;
pub mod region;
pub mod resource;

pub use block::BlockState;
pub use codec::{read_level, write_level, WriteOptions, FORMAT_VERSION, MAGIC};
pub use error::{Error, Result};
pub use model::{Chunk, Level, Location2D, Section};
pub use palette::{BlockPalette, PaletteUpgrader};
pub use region::{LevelBuilder, RegionDirectoryLoader};
pub use resource::ResourceLocation;
