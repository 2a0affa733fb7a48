//! [`BlockPalette`] deduplicates block states within a volume;
//! [`PaletteUpgrader`] records how a palette mutation remaps dependent
//! storage arrays. See spec.md §3/§4.2.
use std::collections::{BTreeSet, HashMap};

use crate::block::BlockState;
use crate::error::{Error, Result};
use crate::intarray::{AnyIntArray, BitCompactIntArray, IntArray, WordedIntArray};

/// Ordered, deduplicated sequence of block states. Index 0 is always the
/// palette's default state, and can never be removed.
#[derive(Debug, Clone)]
pub struct BlockPalette {
    states: Vec<BlockState>,
}

impl BlockPalette {
    /// An empty palette, seeded with [`BlockState::default_state`] at id 0.
    pub fn new() -> Self {
        Self::with_default(BlockState::default_state().clone())
    }

    /// An empty palette seeded with a caller-chosen default state at id 0.
    pub fn with_default(default: BlockState) -> Self {
        Self { states: vec![default] }
    }

    pub fn size(&self) -> usize {
        self.states.len()
    }

    pub fn default_state(&self) -> &BlockState {
        &self.states[0]
    }

    pub fn get_state(&self, id: usize) -> Option<&BlockState> {
        self.states.get(id)
    }

    pub fn states(&self) -> &[BlockState] {
        &self.states
    }

    /// Returns the existing id if `state` is already present, otherwise
    /// appends it and returns its new id.
    pub fn add_state(&mut self, state: BlockState) -> usize {
        if let Some(pos) = self.states.iter().position(|s| s == &state) {
            return pos;
        }
        self.states.push(state);
        self.states.len() - 1
    }

    /// Removes the entry at `id`. Fails if `id` is the default (0). An
    /// out-of-range `id` is a no-op that still returns a (trivial, locked)
    /// upgrader.
    pub fn remove(&mut self, id: usize) -> Result<PaletteUpgrader> {
        if id == 0 {
            return Err(Error::RemovingDefaultState);
        }
        let mut upgrader = PaletteUpgrader::new();
        if id >= self.states.len() {
            upgrader.lock();
            return Ok(upgrader);
        }

        let old_len = self.states.len();
        self.states.remove(id);
        for j in (id + 1)..old_len {
            upgrader.register_change(j as u64, (j - 1) as u64)?;
        }
        upgrader.lock();
        Ok(upgrader)
    }

    /// Merges every state of `other` into `self`, returning the upgrader a
    /// caller needs to translate any storage array tied to `other`'s ids.
    /// Idempotent: merging the same palette twice changes nothing the
    /// second time.
    pub fn add_all(&mut self, other: &BlockPalette) -> PaletteUpgrader {
        let mut upgrader = PaletteUpgrader::new();
        for (old_id, state) in other.states.iter().enumerate() {
            let new_id = self.add_state(state.clone());
            upgrader
                .register_change(old_id as u64, new_id as u64)
                .expect("fresh upgrader is never locked");
        }
        upgrader.lock();
        upgrader
    }

    /// Builds a new, minimal palette containing only the states `data`
    /// actually references, seeded with this palette's default state, and
    /// rewrites `data` in place to index into the new palette.
    pub fn extract(&self, data: &mut AnyIntArray) -> Result<(BlockPalette, PaletteUpgrader)> {
        let mut referenced = BTreeSet::new();
        for i in 0..data.size() {
            referenced.insert(data.get(i)?);
        }

        let mut new_palette = BlockPalette::with_default(self.default_state().clone());
        let mut upgrader = PaletteUpgrader::new();

        for old_id in referenced {
            if old_id == 0 {
                upgrader.register_change(0, 0)?;
                continue;
            }
            let state = self
                .get_state(old_id as usize)
                .ok_or(Error::IndexOutOfBounds { index: old_id as i64, size: self.size() })?
                .clone();
            let new_id = new_palette.add_state(state);
            upgrader.register_change(old_id, new_id as u64)?;
        }

        upgrader.lock();
        upgrader.upgrade_array(data)?;
        Ok((new_palette, upgrader))
    }
}

impl Default for BlockPalette {
    fn default() -> Self {
        Self::new()
    }
}

/// A builder that transitions, once, into an immutable remap table: a
/// two-state type per spec.md §9 ("Upgrader with mutate-then-lock").
/// `register_change` is only available before `lock()`; `upgrade` only makes
/// sense after.
#[derive(Debug, Clone)]
pub struct PaletteUpgrader {
    changes: HashMap<u64, u64>,
    locked: bool,
    no_changes: bool,
}

impl PaletteUpgrader {
    pub fn new() -> Self {
        Self { changes: HashMap::new(), locked: false, no_changes: false }
    }

    /// Records `old -> new`. Fails if this upgrader is already locked.
    pub fn register_change(&mut self, old: u64, new: u64) -> Result<()> {
        if self.locked {
            return Err(Error::UpgraderLocked);
        }
        self.changes.insert(old, new);
        Ok(())
    }

    /// Snapshots the upgrader as immutable. Sets the `no_changes` fast-path
    /// flag iff every registered pair maps an id to itself.
    pub fn lock(&mut self) {
        self.no_changes = self.changes.iter().all(|(old, new)| old == new);
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True iff every registered change is the identity: a fast-path skip
    /// signal for callers about to walk a large storage array.
    pub fn no_changes(&self) -> bool {
        self.locked && self.no_changes
    }

    /// Identity if `id` was never registered, otherwise the mapped id.
    pub fn upgrade(&self, id: u64) -> u64 {
        *self.changes.get(&id).unwrap_or(&id)
    }

    /// Rewrites every cell of `array` through [`Self::upgrade`], resizing the
    /// array first if the new maximum id would not fit, and shrinking it
    /// afterwards if every resulting id permits a smaller width.
    pub fn upgrade_array(&self, array: &mut AnyIntArray) -> Result<()> {
        if self.no_changes() {
            return Ok(());
        }

        match array {
            AnyIntArray::Worded(w) => {
                let mut upgraded = Vec::with_capacity(w.size());
                let mut max_actual = 0u64;
                for i in 0..w.size() {
                    let v = self.upgrade(w.get(i)?);
                    max_actual = max_actual.max(v);
                    upgraded.push(v);
                }
                let mut rebuilt = WordedIntArray::new(w.size(), max_actual);
                for (i, v) in upgraded.into_iter().enumerate() {
                    rebuilt.set(i, v)?;
                }
                *w = rebuilt;
            }
            AnyIntArray::Compact(c) => {
                let mut max_new = c.max_value();
                for i in 0..c.size() {
                    max_new = max_new.max(self.upgrade(c.get(i)?));
                }
                if max_new > c.max_value() {
                    c.set_max_value(max_new)?;
                }
                for i in 0..c.size() {
                    let old = c.get(i)?;
                    c.set(i, self.upgrade(old))?;
                }
                let actual_max = (0..c.size()).try_fold(0u64, |acc, i| c.get(i).map(|v| acc.max(v)))?;
                if actual_max < c.max_value() {
                    // Shrinking here can never fail: every stored value is
                    // already <= actual_max by construction.
                    c.set_max_value(actual_max).expect("actual_max fits every stored cell");
                }
            }
        }
        Ok(())
    }
}

impl Default for PaletteUpgrader {
    fn default() -> Self {
        Self::new()
    }
}
