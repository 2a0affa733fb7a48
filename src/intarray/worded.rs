//! The "worded" layout of spec.md §4.1: cells never straddle a 64-bit word,
//! so each word wastes a few tail bits as padding. A *legacy* raw form with
//! no such padding (cells straddle consecutive words) is also supported, for
//! compatibility with pre-1.16 Minecraft block-state long arrays.
use super::bits::{self, bits_needed};
use super::{check_index, check_value, AnyIntArray, IntArray};
use crate::error::{Error, Result};

fn mask_for(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordedIntArray {
    size: usize,
    max_value: u64,
    bits_per_cell: u32,
    cells_per_word: usize,
    words: Vec<u64>,
}

impl WordedIntArray {
    /// Allocates a new array of `size` cells, all zero, able to hold values
    /// up to `max_value`.
    pub fn new(size: usize, max_value: u64) -> Self {
        let bits_per_cell = bits_needed(max_value).max(4);
        let cells_per_word = (64 / bits_per_cell) as usize;
        let words_needed = size.div_ceil(cells_per_word);
        Self {
            size,
            max_value,
            bits_per_cell,
            cells_per_word,
            words: vec![0u64; words_needed],
        }
    }

    pub fn bits_per_cell(&self) -> u32 {
        self.bits_per_cell
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Builds a worded array from any int array, returning the input as-is
    /// (a clone) if it is already worded, otherwise copying cell by cell.
    pub fn from_any(other: &AnyIntArray) -> WordedIntArray {
        match other {
            AnyIntArray::Worded(w) => w.clone(),
            AnyIntArray::Compact(c) => {
                let mut out = WordedIntArray::new(c.size(), c.max_value());
                for i in 0..c.size() {
                    out.set(i, c.get(i).expect("index within size")).expect("value within max");
                }
                out
            }
        }
    }

    /// Serializes this array's raw bytes. `legacy = false` emits the padded
    /// word-aligned form; `legacy = true` emits the straddling form used by
    /// Minecraft before 1.16.
    pub fn to_raw(&self, legacy: bool) -> Vec<u8> {
        if !legacy {
            let mut out = Vec::with_capacity(self.words.len() * 8);
            for w in &self.words {
                out.extend_from_slice(&w.to_le_bytes());
            }
            out
        } else {
            let bits_total = self.size as u64 * self.bits_per_cell as u64;
            let bytes_needed = (bits_total.div_ceil(64) * 8) as usize;
            let mut buf = vec![0u8; bytes_needed];
            for i in 0..self.size {
                let v = self.get(i).expect("index within size");
                bits::write_bits(&mut buf, i * self.bits_per_cell as usize, self.bits_per_cell, v);
            }
            buf
        }
    }

    /// Parses a raw byte stream of `size` cells with the given `max_value`,
    /// in either the padded or legacy straddling form. Byte length is
    /// inferred from `size`/`max_value`/`legacy`, so a mismatched buffer is a
    /// corruption error.
    pub fn from_raw(bytes: &[u8], size: usize, max_value: u64, legacy: bool) -> Result<Self> {
        let bits_per_cell = bits_needed(max_value).max(4);
        let cells_per_word = (64 / bits_per_cell) as usize;

        if !legacy {
            let words_needed = size.div_ceil(cells_per_word);
            let expected = words_needed * 8;
            if bytes.len() != expected {
                return Err(Error::LengthMismatch { expected, actual: bytes.len() });
            }
            let mut words = Vec::with_capacity(words_needed);
            for chunk in bytes.chunks_exact(8) {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(chunk);
                words.push(u64::from_le_bytes(arr));
            }
            Ok(Self { size, max_value, bits_per_cell, cells_per_word, words })
        } else {
            let bits_total = size as u64 * bits_per_cell as u64;
            let words_needed = bits_total.div_ceil(64) as usize;
            let expected = words_needed * 8;
            if bytes.len() != expected {
                return Err(Error::LengthMismatch { expected, actual: bytes.len() });
            }
            let mut out = Self::new(size, max_value);
            for i in 0..size {
                let v = bits::read_bits(bytes, i * bits_per_cell as usize, bits_per_cell);
                out.set(i, v)?;
            }
            Ok(out)
        }
    }
}

impl IntArray for WordedIntArray {
    fn size(&self) -> usize {
        self.size
    }

    fn max_value(&self) -> u64 {
        self.max_value
    }

    fn get(&self, index: usize) -> Result<u64> {
        check_index(index, self.size)?;
        let word_index = index / self.cells_per_word;
        let bit_start = self.bits_per_cell as usize * (index % self.cells_per_word);
        Ok((self.words[word_index] >> bit_start) & mask_for(self.bits_per_cell))
    }

    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        check_index(index, self.size)?;
        check_value(value, self.max_value)?;
        let word_index = index / self.cells_per_word;
        let bit_start = self.bits_per_cell as usize * (index % self.cells_per_word);
        let mask = mask_for(self.bits_per_cell);
        self.words[word_index] &= !(mask << bit_start);
        self.words[word_index] |= (value & mask) << bit_start;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut a = WordedIntArray::new(20, 15);
        for i in 0..20 {
            a.set(i, (i % 16) as u64).unwrap();
        }
        for i in 0..20 {
            assert_eq!(a.get(i).unwrap(), (i % 16) as u64);
        }
    }

    #[test]
    fn rejects_value_above_max() {
        let mut a = WordedIntArray::new(4, 3);
        assert!(a.set(0, 4).is_err());
        assert!(a.set(0, 3).is_ok());
    }

    #[test]
    fn rejects_out_of_bounds_index() {
        let a = WordedIntArray::new(4, 3);
        assert!(a.get(4).is_err());
    }

    #[test]
    fn minimum_bits_per_cell_is_four() {
        let a = WordedIntArray::new(64, 1);
        assert_eq!(a.bits_per_cell(), 4);
    }

    #[test]
    fn legacy_and_padded_raw_round_trip_independently() {
        let mut a = WordedIntArray::new(100, 1000);
        for i in 0..100 {
            a.set(i, (i * 7 % 1001) as u64).unwrap();
        }

        let padded = a.to_raw(false);
        let back = WordedIntArray::from_raw(&padded, 100, 1000, false).unwrap();
        for i in 0..100 {
            assert_eq!(back.get(i).unwrap(), a.get(i).unwrap());
        }

        let legacy = a.to_raw(true);
        let back_legacy = WordedIntArray::from_raw(&legacy, 100, 1000, true).unwrap();
        for i in 0..100 {
            assert_eq!(back_legacy.get(i).unwrap(), a.get(i).unwrap());
        }
    }

    #[test]
    fn legacy_packs_tighter_than_padded_when_cells_straddle() {
        // 5 bits per cell: 64/5 = 12 cells per word when padded, wasting 4
        // bits per word; legacy has no such waste.
        let a = WordedIntArray::new(13, 31);
        let padded = a.to_raw(false);
        let legacy = a.to_raw(true);
        assert!(legacy.len() <= padded.len());
    }
}
