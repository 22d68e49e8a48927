use crate::{bits_to_store, ceiling_div, n_lowest_bits, BitAccess, BitVec as _};
use dyn_size_of::GetSize;

/// Fixed-width array of integers, packed little-endian-within-word.
///
/// The width is chosen once, from the largest value the vector will ever
/// hold, and every element occupies exactly that many bits; reads and writes
/// that straddle a 64-bit word boundary are spliced together by [`BitAccess`].
pub struct PackedIntVec {
    words: Box<[u64]>,
    len: usize,
    bits_per_value: u8,
}

impl PackedIntVec {
    /// Reserves storage for `n` elements, each wide enough to hold `max_value`.
    /// `max_value == 0` still reserves 1 bit per element.
    pub fn with_capacity_and_max(n: usize, max_value: u64) -> Self {
        let bits_per_value = bits_to_store(max_value).max(1);
        assert!(bits_per_value <= 63, "PackedIntVec supports widths up to 63 bits, got {bits_per_value}");
        Self {
            words: Box::<[u64]>::with_zeroed_bits(n * bits_per_value as usize),
            len: 0,
            bits_per_value,
        }
    }

    /// Number of elements currently stored.
    #[inline] pub fn len(&self) -> usize { self.len }

    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Bit width of each packed element.
    #[inline] pub fn bits_per_value(&self) -> u8 { self.bits_per_value }

    /// Extracts the `i`-th w-bit field.
    ///
    /// # Panics
    /// If `i >= len()`.
    #[inline] pub fn get(&self, i: usize) -> u64 {
        assert!(i < self.len, "index {i} out of bounds (len {})", self.len);
        self.words.get_fragment(i, self.bits_per_value)
    }

    /// Writes `v` into the `i`-th w-bit field, masking it to the field width.
    ///
    /// # Panics
    /// If `i >= len()` or `v` does not fit in `bits_per_value()` bits.
    pub fn set(&mut self, i: usize, v: u64) {
        assert!(i < self.len, "index {i} out of bounds (len {})", self.len);
        assert!(v <= n_lowest_bits(self.bits_per_value), "value {v} exceeds packed width {}", self.bits_per_value);
        self.words.set_fragment(i, v, self.bits_per_value);
    }

    /// Appends `v`, growing storage by a word whenever the new field would cross one.
    ///
    /// # Panics
    /// If `v` does not fit in `bits_per_value()` bits.
    pub fn push(&mut self, v: u64) {
        assert!(v <= n_lowest_bits(self.bits_per_value), "value {v} exceeds packed width {}", self.bits_per_value);
        let needed_words = ceiling_div((self.len + 1) * self.bits_per_value as usize, 64);
        if needed_words > self.words.len() {
            let mut grown = Box::<[u64]>::with_zeroed_64bit_segments(needed_words);
            grown[..self.words.len()].copy_from_slice(&self.words);
            self.words = grown;
        }
        self.words.init_fragment(self.len, v, self.bits_per_value);
        self.len += 1;
    }
}

impl GetSize for PackedIntVec {
    fn size_bytes_dyn(&self) -> usize { self.words.size_bytes_dyn() }
    const USES_DYN_MEM: bool = true;
}
