//! The NBT query surface spec.md §6.1 asks for, built as a thin layer over
//! the external `fastnbt` crate. `fastnbt` itself (tag parsing, the wire
//! format, compression-agnostic (de)serialization) is the black box; this
//! module only adds the accessor ergonomics the rest of the codec leans on.
use std::collections::HashMap;

pub use fastnbt::Value;

use crate::error::{Error, Result};

/// An owned NBT compound, i.e. `{String: Value}`.
///
/// Per spec.md §9 ("Mutable vs. immutable NBT"), queries that hand back a
/// nested compound or list clone it: callers never alias into this
/// compound's storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound(HashMap<String, Value>);

impl Compound {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn from_map(map: HashMap<String, Value>) -> Self {
        Self(map)
    }

    pub fn into_map(self) -> HashMap<String, Value> {
        self.0
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.0.get(key) {
            Some(Value::Int(v)) => *v,
            Some(Value::Byte(v)) => *v as i32,
            Some(Value::Short(v)) => *v as i32,
            Some(Value::Long(v)) => *v as i32,
            _ => default,
        }
    }

    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        match self.0.get(key) {
            Some(Value::Long(v)) => *v,
            Some(Value::Int(v)) => *v as i64,
            _ => default,
        }
    }

    pub fn get_double(&self, key: &str, default: f64) -> f64 {
        match self.0.get(key) {
            Some(Value::Double(v)) => *v,
            Some(Value::Float(v)) => *v as f64,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_byte_array(&self, key: &str) -> Option<&[i8]> {
        match self.0.get(key) {
            Some(Value::ByteArray(a)) => Some(a.iter().as_slice()),
            _ => None,
        }
    }

    pub fn get_long_array(&self, key: &str) -> Option<&[i64]> {
        match self.0.get(key) {
            Some(Value::LongArray(a)) => Some(a.iter().as_slice()),
            _ => None,
        }
    }

    pub fn get_int_array(&self, key: &str) -> Option<&[i32]> {
        match self.0.get(key) {
            Some(Value::IntArray(a)) => Some(a.iter().as_slice()),
            _ => None,
        }
    }

    pub fn get_list(&self, key: &str) -> Option<&Vec<Value>> {
        match self.0.get(key) {
            Some(Value::List(l)) => Some(l),
            _ => None,
        }
    }

    pub fn get_compound(&self, key: &str) -> Option<Compound> {
        match self.0.get(key) {
            Some(Value::Compound(c)) => Some(Compound(c.clone())),
            _ => None,
        }
    }

    /// True iff `list` is non-empty and every element is a compound; an
    /// empty list has no content tag to check and is treated as "fine".
    pub fn is_compound_list(list: &[Value]) -> bool {
        list.iter().all(|v| matches!(v, Value::Compound(_)))
    }

    pub fn as_compound_elements(list: &[Value]) -> Option<Vec<Compound>> {
        if !Self::is_compound_list(list) {
            return None;
        }
        Some(
            list.iter()
                .map(|v| match v {
                    Value::Compound(c) => Compound(c.clone()),
                    _ => unreachable!(),
                })
                .collect(),
        )
    }

    /// Decodes a complete NBT compound document from `bytes` (with or
    /// without an outer name, per the caller's framing) that has already
    /// been decompressed. `fastnbt`'s serde surface is slice-based, so this
    /// is the only read entry point this module offers; a caller pulling
    /// more than one compound out of a shared buffer (e.g. an NBT list
    /// blob, §4.5.2, or a palette entry's properties, §4.2) is responsible
    /// for slicing out each document's own bytes first.
    pub fn read(bytes: &[u8]) -> Result<Compound> {
        let map: HashMap<String, Value> = fastnbt::from_bytes(bytes)?;
        Ok(Compound(map))
    }

    /// Encodes this compound as an unnamed NBT compound document.
    pub fn write(&self) -> Result<Vec<u8>> {
        fastnbt::to_bytes(&self.0).map_err(Error::from)
    }
}

impl From<Compound> for Value {
    fn from(c: Compound) -> Self {
        Value::Compound(c.0)
    }
}
