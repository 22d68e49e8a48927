use crate::{BitAccess, BitVec as _, RankSelect101111, BitArrayWithRank, ArrayWithRank101111Select,
    Select, Select0, BinaryRankSearch};
use dyn_size_of::GetSize;

/// Either the growable, word-backed buffer an unfrozen vector writes into,
/// or the rank/select index produced once it is [`BitVector::build`]t.
enum Storage<S> {
    Mutable(Box<[u64]>),
    Frozen(RankSelect101111<S>),
}

/// A bit vector that can be grown one bit at a time and then frozen into a
/// structure supporting constant-time `rank` and (near-)constant-time `select`.
///
/// Mirrors the construction-state split the rest of the crate uses for its
/// rank/select structures: `add`/`set` are legal only before [`build`](Self::build),
/// `rank1`/`rank0`/`select1`/`select0` only after.
pub struct BitVector<S = BinaryRankSearch> {
    storage: Storage<S>,
    len: usize,
}

impl<S> Default for BitVector<S> {
    #[inline] fn default() -> Self { Self::new() }
}

impl<S> BitVector<S> {
    /// Constructs an empty, mutable bit vector.
    pub fn new() -> Self {
        Self { storage: Storage::Mutable(Box::new([])), len: 0 }
    }

    /// Number of bits stored.
    #[inline] pub fn len(&self) -> usize { self.len }

    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// `true` once [`build`](Self::build) has been called.
    #[inline] pub fn is_frozen(&self) -> bool { matches!(self.storage, Storage::Frozen(_)) }

    #[inline] fn content(&self) -> &[u64] {
        match &self.storage {
            Storage::Mutable(w) => w,
            Storage::Frozen(r) => r.content(),
        }
    }

    /// Returns the raw 64-bit words backing this vector, for bulk scans
    /// (e.g. finding the next 1-bit word-at-a-time instead of bit-by-bit).
    #[inline] pub fn words(&self) -> &[u64] { self.content() }

    /// Appends one bit. Amortised O(1); grows storage by a 256-bit block
    /// whenever `len` crosses a 256-bit boundary.
    ///
    /// # Panics
    /// If called after [`build`](Self::build).
    pub fn add(&mut self, bit: bool) {
        let Storage::Mutable(words) = &mut self.storage else {
            panic!("cannot add to a BitVector that has already been built");
        };
        if self.len % 256 == 0 {
            let mut grown = Box::<[u64]>::with_zeroed_64bit_segments(words.len() + 4);
            grown[..words.len()].copy_from_slice(words);
            *words = grown;
        }
        if bit { words.set_bit(self.len); }
        self.len += 1;
    }

    /// Overwrites bit `i` in place. Legal only before [`build`](Self::build).
    ///
    /// # Panics
    /// If `i >= len()` or the vector has already been built.
    pub fn set(&mut self, i: usize, bit: bool) {
        assert!(i < self.len, "bit index {i} out of bounds (len {})", self.len);
        let Storage::Mutable(words) = &mut self.storage else {
            panic!("cannot set a bit of a BitVector that has already been built");
        };
        words.set_bit_to(i, bit);
    }

    /// Returns bit `i`.
    ///
    /// # Panics
    /// If `i >= len()`.
    #[inline] pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "bit index {i} out of bounds (len {})", self.len);
        self.content().get_bit(i)
    }
}

impl<S: ArrayWithRank101111Select> BitVector<S> {
    /// Builds the rank/select index over the bits added so far. A single linear
    /// pass. Subsequent `add`/`set` calls panic.
    pub fn build(&mut self) {
        let Storage::Mutable(words) = &mut self.storage else {
            panic!("BitVector already built");
        };
        let words = std::mem::take(words);
        let (index, _total_ones) = RankSelect101111::build(words);
        self.storage = Storage::Frozen(index);
    }

    /// Number of set bits strictly before position `i`. O(1).
    ///
    /// # Panics
    /// If the vector has not been built, or `i` is out of bounds.
    #[inline] pub fn rank1(&self, i: usize) -> usize {
        match &self.storage {
            Storage::Frozen(r) => r.rank(i),
            Storage::Mutable(_) => panic!("rank1 requires a built BitVector"),
        }
    }

    /// Number of cleared bits strictly before position `i`. O(1).
    #[inline] pub fn rank0(&self, i: usize) -> usize { i - self.rank1(i) }

    /// Position of the `k`-th (0-indexed) set bit, or panics if there are fewer than `k+1` ones.
    #[inline] pub fn select1(&self, k: usize) -> usize {
        self.try_select1(k).expect("select1: fewer than k+1 ones in BitVector")
    }

    /// Position of the `k`-th (0-indexed) set bit, or `None` if there are fewer than `k+1` ones.
    #[inline] pub fn try_select1(&self, k: usize) -> Option<usize> {
        match &self.storage {
            Storage::Frozen(r) => r.try_select(k),
            Storage::Mutable(_) => panic!("select1 requires a built BitVector"),
        }
    }

    /// Position of the `k`-th (0-indexed) cleared bit, or panics if there are fewer than `k+1` zeros.
    #[inline] pub fn select0(&self, k: usize) -> usize {
        self.try_select0(k).expect("select0: fewer than k+1 zeros in BitVector")
    }

    /// Position of the `k`-th (0-indexed) cleared bit, or `None` if there are fewer than `k+1` zeros.
    #[inline] pub fn try_select0(&self, k: usize) -> Option<usize> {
        match &self.storage {
            Storage::Frozen(r) => r.try_select0(k),
            Storage::Mutable(_) => panic!("select0 requires a built BitVector"),
        }
    }
}

impl<S: GetSize> GetSize for BitVector<S> {
    fn size_bytes_dyn(&self) -> usize {
        match &self.storage {
            Storage::Mutable(w) => w.size_bytes_dyn(),
            Storage::Frozen(r) => r.size_bytes_dyn(),
        }
    }
    const USES_DYN_MEM: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(bits: &[bool]) -> BitVector {
        let mut v = BitVector::<BinaryRankSearch>::new();
        for &b in bits { v.add(b); }
        v.build();
        v
    }

    #[test]
    fn add_get_before_build() {
        let mut v = BitVector::<BinaryRankSearch>::new();
        v.add(true); v.add(false); v.add(true);
        assert_eq!(v.len(), 3);
        assert!(v.get(0));
        assert!(!v.get(1));
        assert!(v.get(2));
    }

    #[test]
    fn set_before_build() {
        let mut v = BitVector::<BinaryRankSearch>::new();
        for _ in 0..5 { v.add(false); }
        v.set(2, true);
        assert!(v.get(2));
        assert!(!v.get(1));
        assert!(!v.get(3));
    }

    #[test]
    fn rank_select_roundtrip() {
        let bits = [true, false, true, true, false, false, true, false, true];
        let v = filled(&bits);
        let ones: Vec<usize> = bits.iter().enumerate().filter(|(_, &b)| b).map(|(i, _)| i).collect();
        for (k, &pos) in ones.iter().enumerate() {
            assert_eq!(v.select1(k), pos);
            assert_eq!(v.rank1(pos + 1), k + 1);
        }
        let zeros: Vec<usize> = bits.iter().enumerate().filter(|(_, &b)| !b).map(|(i, _)| i).collect();
        for (k, &pos) in zeros.iter().enumerate() {
            assert_eq!(v.select0(k), pos);
            assert_eq!(v.rank0(pos + 1), k + 1);
        }
        for i in 0..=bits.len() {
            assert_eq!(v.rank1(i) + v.rank0(i), i);
        }
    }

    #[test]
    fn select_out_of_range_is_none() {
        let v = filled(&[true, false, true]);
        assert_eq!(v.try_select1(2), None);
        assert_eq!(v.try_select0(1), None);
    }

    #[test]
    #[should_panic]
    fn add_after_build_panics() {
        let mut v = filled(&[true, false]);
        v.add(true);
    }

    #[test]
    fn spans_many_blocks() {
        let n = 1000usize;
        let mut v = BitVector::<BinaryRankSearch>::new();
        for i in 0..n { v.add(i % 7 == 0); }
        v.build();
        let mut rank = 0usize;
        for i in 0..n {
            assert_eq!(v.rank1(i), rank);
            if i % 7 == 0 {
                assert_eq!(v.select1(rank), i);
                rank += 1;
            }
        }
    }
}
