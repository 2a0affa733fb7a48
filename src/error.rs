//! Contains the [`Error`] and [`Result`] types used throughout the crate.
use std::fmt::Display;

/// Every way a fallible operation in this crate can fail, grouped the way
/// spec.md §7 lays the taxonomy out.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// A coordinate or array index fell outside its valid range.
    IndexOutOfBounds { index: i64, size: usize },
    /// A value passed to `set` was negative or exceeded an array's `max_value`.
    ValueOutOfRange { value: i64, max_value: u64 },
    /// The on-disk magic number didn't match `0x610BB10B`.
    BadMagic(u32),
    /// The stream declared a format version this implementation can't read.
    UnsupportedVersion(u32),
    /// A VarInt was longer than 5 bytes, or otherwise malformed.
    BadVarInt,
    /// A decoded length disagreed with the data actually present.
    LengthMismatch { expected: usize, actual: usize },
    /// Region file size was not a multiple of 4096, or a similar structural
    /// corruption.
    Corrupt(&'static str),
    /// A nested Zstd frame was encountered; nesting is forbidden.
    NestedZstdFrame,
    /// An unrecognised compression tag byte in a region file.
    UnknownCompression(u8),
    /// A resource location string was not valid `namespace:path`.
    InvalidResourceLocation(String),
    /// Attempted to mutate a [`crate::palette::PaletteUpgrader`] after `lock()`.
    UpgraderLocked,
    /// Attempted to remove the palette's default entry (id 0).
    RemovingDefaultState,
    /// A `set_max_value` shrink would have discarded a stored value.
    ShrinkWouldLoseData,
    /// Inserting a section at an altitude that is already occupied.
    DuplicateAltitude(i32),
    /// A section's storage did not describe exactly 16x16x16 cells.
    WrongSectionVolume(usize),
    /// A chunk location could not be represented in the level's bounds.
    ChunkOutOfBounds { x: i32, z: i32 },
    /// A required NBT field was absent where spec.md says it is mandatory.
    MissingNbtField(&'static str),
    /// An NBT field was present but had the wrong tag type.
    WrongNbtType(&'static str),
    /// Failure from the underlying NBT codec.
    Nbt(String),
    /// Failure from the underlying Zstd codec.
    Zstd(String),
    /// Wrapped I/O failure.
    Io(std::sync::Arc<std::io::Error>),
}

/// Convenience alias, mirroring `fastnbt::error::Result`.
pub type Result<T> = std::result::Result<T, Error>;

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IndexOutOfBounds { index, size } => {
                write!(f, "index {} out of bounds for array of size {}", index, size)
            }
            Error::ValueOutOfRange { value, max_value } => {
                write!(f, "value {} out of range for max_value {}", value, max_value)
            }
            Error::BadMagic(got) => write!(f, "bad ooze magic: 0x{:08X}", got),
            Error::UnsupportedVersion(v) => write!(f, "unsupported ooze format version {}", v),
            Error::BadVarInt => write!(f, "malformed VarInt"),
            Error::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {}, got {}", expected, actual)
            }
            Error::Corrupt(msg) => write!(f, "corrupt data: {}", msg),
            Error::NestedZstdFrame => write!(f, "nested zstd frames are not permitted"),
            Error::UnknownCompression(tag) => write!(f, "unknown region compression tag {}", tag),
            Error::InvalidResourceLocation(s) => write!(f, "invalid resource location: {:?}", s),
            Error::UpgraderLocked => write!(f, "palette upgrader already locked"),
            Error::RemovingDefaultState => write!(f, "cannot remove the palette's default state"),
            Error::ShrinkWouldLoseData => {
                write!(f, "shrinking the array would discard an existing value")
            }
            Error::DuplicateAltitude(y) => write!(f, "a section already exists at altitude {}", y),
            Error::WrongSectionVolume(n) => {
                write!(f, "section storage has {} cells, expected 4096", n)
            }
            Error::ChunkOutOfBounds { x, z } => {
                write!(f, "chunk ({}, {}) is out of the level's representable bounds", x, z)
            }
            Error::MissingNbtField(name) => write!(f, "missing required nbt field {:?}", name),
            Error::WrongNbtType(name) => write!(f, "nbt field {:?} has unexpected type", name),
            Error::Nbt(msg) => write!(f, "nbt error: {}", msg),
            Error::Zstd(msg) => write!(f, "zstd error: {}", msg),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(std::sync::Arc::new(e))
    }
}

impl From<fastnbt::error::Error> for Error {
    fn from(e: fastnbt::error::Error) -> Self {
        Error::Nbt(e.to_string())
    }
}
