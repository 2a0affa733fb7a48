//! The "compact" layout of spec.md §4.1: a tightly packed bitstream over a
//! byte buffer, cells may cross byte boundaries, and the array supports
//! in-place resizing via [`BitCompactIntArray::set_max_value`].
use super::bits::{self, bits_needed};
use super::{check_index, check_value, AnyIntArray, IntArray};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitCompactIntArray {
    size: usize,
    max_value: u64,
    bits_per_cell: u32,
    data: Vec<u8>,
}

fn bytes_needed(size: usize, bits_per_cell: u32) -> usize {
    (size as u64 * bits_per_cell as u64).div_ceil(8) as usize
}

impl BitCompactIntArray {
    pub fn new(size: usize, max_value: u64) -> Self {
        let bits_per_cell = bits_needed(max_value).max(1);
        Self {
            size,
            max_value,
            bits_per_cell,
            data: vec![0u8; bytes_needed(size, bits_per_cell)],
        }
    }

    pub fn bits_per_cell(&self) -> u32 {
        self.bits_per_cell
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Builds a compact array from any int array, returning the input as-is
    /// (a clone) if it is already compact, otherwise copying cell by cell.
    pub fn from_any(other: &AnyIntArray) -> BitCompactIntArray {
        match other {
            AnyIntArray::Compact(c) => c.clone(),
            AnyIntArray::Worded(w) => {
                let mut out = BitCompactIntArray::new(w.size(), w.max_value());
                for i in 0..w.size() {
                    out.set(i, w.get(i).expect("index within size")).expect("value within max");
                }
                out
            }
        }
    }

    /// Grows or shrinks the array's max value, repacking every cell.
    /// Shrinking fails without modifying the array if any existing value
    /// would no longer fit.
    pub fn set_max_value(&mut self, new_max: u64) -> Result<()> {
        let new_bits = bits_needed(new_max).max(1);

        if new_bits == self.bits_per_cell {
            self.max_value = new_max;
            return Ok(());
        }

        if new_bits < self.bits_per_cell {
            for i in 0..self.size {
                if self.get(i)? > new_max {
                    return Err(Error::ShrinkWouldLoseData);
                }
            }
        }

        let mut new_data = vec![0u8; bytes_needed(self.size, new_bits)];
        for i in 0..self.size {
            let v = self.get(i)?;
            bits::write_bits(&mut new_data, i * new_bits as usize, new_bits, v);
        }

        self.data = new_data;
        self.bits_per_cell = new_bits;
        self.max_value = new_max;
        Ok(())
    }

    /// Encodes as `VarInt(size), VarInt(max_value), raw bytes` per spec.md
    /// §4.1. The VarInt framing itself lives in [`crate::codec::varint`]; this
    /// just hands back the raw payload bytes.
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn from_raw_bytes(bytes: &[u8], size: usize, max_value: u64) -> Result<Self> {
        let bits_per_cell = bits_needed(max_value).max(1);
        let expected = bytes_needed(size, bits_per_cell);
        if bytes.len() != expected {
            return Err(Error::LengthMismatch { expected, actual: bytes.len() });
        }
        Ok(Self {
            size,
            max_value,
            bits_per_cell,
            data: bytes.to_vec(),
        })
    }
}

impl IntArray for BitCompactIntArray {
    fn size(&self) -> usize {
        self.size
    }

    fn max_value(&self) -> u64 {
        self.max_value
    }

    fn get(&self, index: usize) -> Result<u64> {
        check_index(index, self.size)?;
        Ok(bits::read_bits(&self.data, index * self.bits_per_cell as usize, self.bits_per_cell))
    }

    fn set(&mut self, index: usize, value: u64) -> Result<()> {
        check_index(index, self.size)?;
        check_value(value, self.max_value)?;
        bits::write_bits(&mut self.data, index * self.bits_per_cell as usize, self.bits_per_cell, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_across_byte_boundaries() {
        let mut a = BitCompactIntArray::new(8, 3);
        for i in 0..8 {
            a.set(i, 3).unwrap();
        }
        for i in 0..8 {
            assert_eq!(a.get(i).unwrap(), 3);
        }
    }

    #[test]
    fn resize_up_preserves_values() {
        let mut a = BitCompactIntArray::new(8, 3);
        for i in 0..8 {
            a.set(i, 3).unwrap();
        }
        a.set_max_value(1023).unwrap();
        assert_eq!(a.max_value(), 1023);
        for i in 0..8 {
            assert_eq!(a.get(i).unwrap(), 3);
        }
    }

    #[test]
    fn resize_down_that_would_lose_data_fails() {
        let mut a = BitCompactIntArray::new(8, 3);
        a.set(0, 3).unwrap();
        assert!(a.set_max_value(1).is_err());
        // array is untouched after the failed shrink
        assert_eq!(a.get(0).unwrap(), 3);
        assert_eq!(a.max_value(), 3);
    }

    #[test]
    fn resize_down_that_fits_succeeds() {
        let mut a = BitCompactIntArray::new(8, 15);
        for i in 0..8 {
            a.set(i, 1).unwrap();
        }
        a.set_max_value(1).unwrap();
        for i in 0..8 {
            assert_eq!(a.get(i).unwrap(), 1);
        }
    }

    #[test]
    fn rejects_negative_equivalent_and_over_max_value() {
        let mut a = BitCompactIntArray::new(4, 5);
        assert!(a.set(0, 6).is_err());
        assert!(a.set(0, 5).is_ok());
    }
}
