use succinct_bitvec::{BitVector, BinaryRankSearch};
use dyn_size_of::GetSize;

use crate::trie::{Trie, NOT_FOUND};

struct Level {
    louds: BitVector<BinaryRankSearch>,
    outs: BitVector<BinaryRankSearch>,
    labels: Vec<u8>,
    offset: u64,
}

impl Level {
    fn new() -> Self {
        Self { louds: BitVector::new(), outs: BitVector::new(), labels: Vec::new(), offset: 0 }
    }

    fn size_bytes(&self) -> usize {
        self.louds.size_bytes() + self.outs.size_bytes() + self.labels.len()
    }
}

/// LOUDS trie with one bitmap pair per depth level.
///
/// Each level holds its own `louds`/`outs` bit vectors and label bytes, so a
/// lookup touches one level per query byte; `offset` accumulates, level by
/// level, the number of keys that terminate at a shallower depth, letting
/// [`lookup`](Trie::lookup) turn a level-local rank into a global key id.
pub struct LevelTrie {
    levels: Vec<Level>,
    n_keys: u64,
    n_nodes: u64,
    size: usize,
    last_key: Vec<u8>,
}

impl LevelTrie {
    /// Constructs an empty, still-growable trie. Part of the incremental
    /// `new`/`add`/[`build`](Trie::build) builder API this variant exposes
    /// in addition to the one-shot [`Trie::build`].
    pub fn new() -> Self {
        let mut levels = vec![Level::new(), Level::new()];
        levels[0].louds.add(false);
        levels[0].louds.add(true);
        levels[1].louds.add(true);
        levels[0].outs.add(false);
        levels[0].labels.push(b' ');
        Self { levels, n_keys: 0, n_nodes: 1, size: 0, last_key: Vec::new() }
    }

    /// Inserts one more key. Keys must be added in strictly increasing
    /// lexicographic order, matching [`Trie::build`]'s contract.
    pub fn add(&mut self, key: &[u8]) {
        assert!(key > self.last_key.as_slice(), "keys must be added in strictly increasing order");
        if key.is_empty() {
            self.levels[0].outs.set(0, true);
            self.levels[1].offset += 1;
            self.n_keys += 1;
            return;
        }
        if key.len() + 1 >= self.levels.len() {
            while self.levels.len() < key.len() + 2 { self.levels.push(Level::new()); }
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

        self.levels[key.len() + 1].louds.add(true);
        self.levels[key.len() + 1].offset += 1;
        let last_outs = self.levels[key.len()].outs.len() - 1;
        self.levels[key.len()].outs.set(last_outs, true);
        self.n_keys += 1;
        self.last_key = key.to_vec();
    }
}

impl Trie for LevelTrie {
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut trie = Self::new();
        for key in keys { trie.add(key.as_ref()); }
        let mut offset = 0u64;
        for level in trie.levels.iter_mut() {
            level.louds.build();
            level.outs.build();
            offset += level.offset;
            level.offset = offset;
            trie.size += level.size_bytes();
        }
        trie
    }

    fn lookup(&self, query: &[u8]) -> u64 {
        if query.len() >= self.levels.len() { return NOT_FOUND; }
        let mut node_id: usize = 0;
        let mut rank: usize = 0;
        for (i, &byte) in query.iter().enumerate() {
            let level = &self.levels[i + 1];
            if rank != 0 {
                node_id = level.louds.select1(rank - 1) + 1;
                rank = node_id - rank;
            } else {
                node_id = 0;
            }
            loop {
                if level.louds.get(node_id) || level.labels[rank] > byte {
                    return NOT_FOUND;
                }
                if level.labels[rank] == byte { break; }
                node_id += 1;
                rank += 1;
            }
        }
        let level = &self.levels[query.len()];
        if !level.outs.get(rank) { return NOT_FOUND; }
        level.offset + level.outs.rank1(rank) as u64
    }

    fn reverse_lookup(&self, id: u64, key: &mut Vec<u8>) {
        assert!(id < self.n_keys, "id {id} out of bounds (n_keys {})", self.n_keys);
        key.clear();
        let mut level_id = 0usize;
        while id >= self.levels[level_id + 1].offset { level_id += 1; }
        if level_id == 0 { return; }
        let id = id - self.levels[level_id].offset;
        let mut node_id = self.levels[level_id].outs.select1(id as usize);
        loop {
            key.push(self.levels[level_id].labels[node_id]);
            if level_id == 1 { break; }
            let node_pos = self.levels[level_id].louds.select0(node_id);
            node_id = node_pos - node_id;
            level_id -= 1;
        }
        key.reverse();
    }

    fn n_keys(&self) -> u64 { self.n_keys }
    fn n_nodes(&self) -> u64 { self.n_nodes }
    fn size(&self) -> usize { self.size }
    fn name(&self) -> &'static str { "LoudsTrie" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(words: &[&str]) -> Vec<Vec<u8>> {
        words.iter().map(|w| w.as_bytes().to_vec()).collect()
    }

    #[test]
    fn empty_key_round_trips() {
        let trie = LevelTrie::build(&keys(&["", "a", "ab"]));
        assert_eq!(trie.n_keys(), 3);
        assert_eq!(trie.lookup(b""), 0);
        let mut out = Vec::new();
        trie.reverse_lookup(0, &mut out);
        assert_eq!(out, b"");
    }

    #[test]
    fn shared_prefixes_and_bijection() {
        let words = ["an", "ant", "anteater", "antelope", "bee", "been", "bees"];
        let trie = LevelTrie::build(&keys(&words));
        for (expected_id, w) in words.iter().enumerate() {
            let id = trie.lookup(w.as_bytes());
            assert_eq!(id, expected_id as u64, "lookup({w})");
            let mut out = Vec::new();
            trie.reverse_lookup(id, &mut out);
            assert_eq!(out, w.as_bytes());
        }
    }

    #[test]
    fn missing_keys_not_found() {
        let trie = LevelTrie::build(&keys(&["ant", "anteater", "bee"]));
        for absent in ["a", "an", "ants", "be", "beez", "zebra"] {
            assert_eq!(trie.lookup(absent.as_bytes()), NOT_FOUND, "{absent}");
        }
    }

    #[test]
    fn single_long_chain() {
        let word = "abcdefghijklmnopqrstuvwxyz";
        let trie = LevelTrie::build(&keys(&[word]));
        assert_eq!(trie.lookup(word.as_bytes()), 0);
        assert_eq!(trie.lookup(b"abcdefghijklmnopqrstuvwxy"), NOT_FOUND);
    }

    #[test]
    fn byte_value_boundaries() {
        let mut words: Vec<Vec<u8>> = vec![vec![0u8], vec![0u8, 0u8], vec![0x7f]];
        words.sort();
        let trie = LevelTrie::build(&words);
        for (id, w) in words.iter().enumerate() {
            assert_eq!(trie.lookup(w), id as u64);
        }
    }

    #[test]
    fn wide_fan_out() {
        let words: Vec<Vec<u8>> = (0u16..256).map(|b| vec![b as u8]).collect();
        let trie = LevelTrie::build(&words);
        assert_eq!(trie.n_keys(), 256);
        for (id, w) in words.iter().enumerate() {
            assert_eq!(trie.lookup(w), id as u64);
        }
    }

    #[test]
    fn size_monotonicity_of_incremental_add() {
        let words = ["an", "ant", "anteater", "antelope", "bee", "been", "bees"];
        let mut trie = LevelTrie::new();
        let mut previous_n_nodes = trie.n_nodes();
        for w in &words {
            trie.add(w.as_bytes());
            assert!(trie.n_nodes() >= previous_n_nodes,
                "n_nodes must never shrink as keys are added ({w})");
            previous_n_nodes = trie.n_nodes();
        }
    }

    #[test]
    fn large_randomized_set() {
        use rand::{Rng, SeedableRng};
        use rand::rngs::StdRng;
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = std::collections::BTreeSet::new();
        while set.len() < 2000 {
            let len = rng.gen_range(0..12);
            let w: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
            set.insert(w);
        }
        let words: Vec<Vec<u8>> = set.into_iter().collect();
        let member_set: std::collections::BTreeSet<Vec<u8>> = words.iter().cloned().collect();
        let trie = LevelTrie::build(&words);
        for (id, w) in words.iter().enumerate() {
            assert_eq!(trie.lookup(w), id as u64);
            let mut out = Vec::new();
            trie.reverse_lookup(id as u64, &mut out);
            assert_eq!(&out, w);
        }

        let mut n_checked = 0;
        while n_checked < 3000 {
            let len = rng.gen_range(0..12);
            let w: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
            if member_set.contains(&w) { continue; }
            assert_eq!(trie.lookup(&w), NOT_FOUND, "{w:?} must not be found");
            n_checked += 1;
        }
    }
}
