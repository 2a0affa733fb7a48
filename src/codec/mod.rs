//! The binary container format of spec.md §4.5: header, VarInt, BitSet,
//! palette blob, Zstd frames, chunk payload, NBT list form, and the
//! top-level level reader/writer.
pub mod bitset;
pub mod chunk_io;
pub mod level_io;
pub mod nbt_list;
pub mod palette_io;
pub mod varint;
pub mod zstd_frame;

pub use level_io::{read_level, write_level, WriteOptions, FORMAT_VERSION, MAGIC};
