//! Per-level LOUDS scratch trie shared by the tail-compressing variants.
//!
//! [`crate::patricia`] and [`crate::indirect`] both build their flat,
//! tail-compressed encoding in two passes: first grow an ordinary per-level
//! LOUDS trie (this module), then walk it breadth-first to emit a single
//! flat bitmap with runs of single-child nodes collapsed into tails. Keeping
//! the first pass in one place avoids drifting copies of the same
//! divergence-point logic used by [`crate::level`].

use succinct_bitvec::{BitVector, BinaryRankSearch};

pub(crate) struct SourceLevel {
    pub louds: BitVector<BinaryRankSearch>,
    pub outs: BitVector<BinaryRankSearch>,
    pub labels: Vec<u8>,
}

impl SourceLevel {
    fn new() -> Self {
        Self { louds: BitVector::new(), outs: BitVector::new(), labels: Vec::new() }
    }
}

pub(crate) struct SourceTrie {
    pub levels: Vec<SourceLevel>,
    pub n_keys: u64,
    pub n_nodes: u64,
    last_key: Vec<u8>,
}

impl SourceTrie {
    pub(crate) fn new() -> Self {
        let mut levels = vec![SourceLevel::new(), SourceLevel::new()];
        levels[0].louds.add(false);
        levels[0].louds.add(true);
        levels[1].louds.add(true);
        levels[0].outs.add(false);
        levels[0].labels.push(b' ');
        Self { levels, n_keys: 0, n_nodes: 1, last_key: Vec::new() }
    }

    pub(crate) fn add(&mut self, key: &[u8]) {
        assert!(self.n_keys == 0 || key > self.last_key.as_slice(),
            "keys must be added in strictly increasing order");
        if key.is_empty() {
            self.levels[0].outs.set(0, true);
            self.n_keys += 1;
            return;
        }
        if key.len() + 1 >= self.levels.len() {
            while self.levels.len() < key.len() + 2 { self.levels.push(SourceLevel::new()); }
        }

        let mut i = 0;
        let mut diverged = false;
        while i < key.len() {
            let byte = key[i];
            if i == self.last_key.len() || Some(&byte) != self.levels[i + 1].labels.last() {
                let level = &mut self.levels[i + 1];
                let last = level.louds.len() - 1;
                level.louds.set(last, false);
                level.louds.add(true);
                level.outs.add(false);
                level.labels.push(byte);
                self.n_nodes += 1;
                diverged = true;
                break;
            }
            i += 1;
        }
        if diverged { i += 1; }
        while i < key.len() {
            let byte = key[i];
            let level = &mut self.levels[i + 1];
            level.louds.add(false);
            level.louds.add(true);
            level.outs.add(false);
            level.labels.push(byte);
            self.n_nodes += 1;
            i += 1;
        }

        self.levels[i + 1].louds.add(true);
        let last_outs = self.levels[i].outs.len() - 1;
        self.levels[i].outs.set(last_outs, true);
        self.last_key = key.to_vec();
        self.n_keys += 1;
    }

    pub(crate) fn build(&mut self) {
        for level in self.levels.iter_mut() { level.louds.build(); }
    }
}
