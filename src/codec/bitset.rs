//! Fixed-length bit sets, per spec.md §4.5: `ceil(bits/8)` little-endian
//! bytes, bit `i` is bit `i mod 8` of byte `i/8`. A zero-bit request still
//! writes (and expects) one zero byte.
use std::io::{Read, Write};

use crate::error::Result;

pub fn write_bitset<W: Write>(w: &mut W, bits: &[bool]) -> Result<()> {
    let byte_len = bits.len().div_ceil(8).max(1);
    let mut buf = vec![0u8; byte_len];
    for (i, &set) in bits.iter().enumerate() {
        if set {
            buf[i / 8] |= 1 << (i % 8);
        }
    }
    w.write_all(&buf)?;
    Ok(())
}

pub fn read_bitset<R: Read>(r: &mut R, bit_count: usize) -> Result<Vec<bool>> {
    let byte_len = bit_count.div_ceil(8).max(1);
    let mut buf = vec![0u8; byte_len];
    r.read_exact(&mut buf)?;
    Ok((0..bit_count).map(|i| buf[i / 8] & (1 << (i % 8)) != 0).collect())
}
