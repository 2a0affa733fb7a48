//! Decodes pre-flattening blocks (8-bit id + optional 4-bit overflow + 4-bit
//! data) into the modern `(name, properties)` model, per spec.md §4.3.
//!
//! The table is a process-wide singleton, built once from an embedded JSON
//! resource under a single-initialization guard, spec.md §9's "Lazy global
//! legacy table", the same pattern `fastnbt`'s `Biome` lookup table and
//! similar one-shot resource tables use.
use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;

use crate::block::BlockState;
use crate::nbt::{Compound, Value};
use crate::resource::ResourceLocation;

const LEGACY_TABLE_JSON: &str = include_str!("legacy_blocks.json");

#[derive(Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    properties: HashMap<String, String>,
}

struct LegacyTable {
    entries: HashMap<u16, BlockState>,
    max_compound_id: u16,
}

fn build_table() -> LegacyTable {
    let raw: HashMap<String, RawEntry> =
        serde_json::from_str(LEGACY_TABLE_JSON).expect("embedded legacy block table is valid json");

    let mut entries = HashMap::with_capacity(raw.len());
    let mut max_compound_id = 0u16;

    for (key, entry) in raw {
        let key: u16 = key.parse().expect("legacy table keys are decimal integers");
        let name = ResourceLocation::parse(&entry.name).expect("legacy table names are valid resource locations");

        let properties = if entry.properties.is_empty() {
            None
        } else {
            let mut compound = Compound::new();
            for (k, v) in entry.properties {
                compound.insert(k, Value::String(v));
            }
            Some(compound)
        };

        max_compound_id = max_compound_id.max(key);
        entries.insert(key, BlockState::new(name, properties));
    }

    LegacyTable { entries, max_compound_id }
}

fn table() -> &'static LegacyTable {
    static TABLE: OnceLock<LegacyTable> = OnceLock::new();
    TABLE.get_or_init(build_table)
}

/// Packs a legacy `(id, data)` pair into the table's key space: `id` may
/// use up to 12 bits (8-bit id plus 4-bit `Add` overflow), `data` uses the
/// low 4 bits.
pub fn legacy_key(id: u16, data: u8) -> u16 {
    ((id & 0x0FFF) << 4) | (data as u16 & 0xF)
}

/// Looks up the modern block state for a legacy `(id, data)` pair, falling
/// back to [`BlockState::default_state`] if the table has no entry.
pub fn get_block_state_from_legacy(id: u16, data: u8) -> BlockState {
    table()
        .entries
        .get(&legacy_key(id, data))
        .cloned()
        .unwrap_or_else(|| BlockState::default_state().clone())
}

/// The highest encoded `(id, data)` key present in the table.
pub fn max_compound_id() -> u16 {
    table().max_compound_id
}
