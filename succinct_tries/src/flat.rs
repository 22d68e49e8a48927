use std::collections::VecDeque;

use succinct_bitvec::{BitVector, BinaryRankSearch};
use dyn_size_of::GetSize;

use crate::trie::{Trie, NOT_FOUND};
use crate::source_trie::SourceTrie;

struct QueueNode {
    level_id: usize,
    node_pos: usize,
}

/// Position of the next set bit at or after `from`, scanned word-at-a-time
/// via trailing-zero count rather than bit-by-bit.
fn next_one_bit(words: &[u64], from: usize) -> usize {
    let mut end = from;
    let mut word = words[end / 64] >> (end % 64);
    if word == 0 {
        end += 64 - (end % 64);
        word = words[end / 64];
        while word == 0 {
            end += 64;
            word = words[end / 64];
        }
    }
    end + word.trailing_zeros() as usize
}

/// Flat (single-bitmap) LOUDS trie, re-linearized breadth-first from a
/// per-level trie with no tail compression.
///
/// Unlike [`crate::level::LevelTrie`], which keeps one `louds`/`outs` bitmap
/// pair per depth, this variant folds every depth into one bitmap, so a
/// lookup does one binary search per byte over a single shared `labels_`
/// array instead of indexing into a separate level each time.
pub struct FlatTrie {
    louds: BitVector<BinaryRankSearch>,
    outs: BitVector<BinaryRankSearch>,
    labels: Vec<u8>,
    n_keys: u64,
    n_nodes: u64,
    size: usize,
}

impl Trie for FlatTrie {
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut src = SourceTrie::new();
        for key in keys { src.add(key.as_ref()); }
        src.build();

        let mut louds = BitVector::new();
        let mut outs = BitVector::new();
        let mut labels = Vec::new();

        louds.add(false);
        louds.add(true);
        outs.add(src.levels[0].outs.get(0));
        labels.push(b' ');

        let mut queue = VecDeque::new();
        if !src.levels[1].louds.get(0) {
            queue.push_back(QueueNode { level_id: 1, node_pos: 0 });
        }
        while let Some(mut node) = queue.pop_front() {
            if node.level_id != 0 {
                while !src.levels[node.level_id].louds.get(node.node_pos) {
                    louds.add(false);
                    let level_id = node.level_id;
                    let node_pos_here = node.node_pos;
                    let node_id = node_pos_here - src.levels[level_id].louds.rank1(node_pos_here);
                    labels.push(src.levels[level_id].labels[node_id]);
                    let child_pos = if node_id == 0 {
                        0
                    } else {
                        src.levels[level_id + 1].louds.select1(node_id - 1) + 1
                    };
                    if !src.levels[level_id + 1].louds.get(child_pos) {
                        queue.push_back(QueueNode { level_id: level_id + 1, node_pos: child_pos });
                    } else {
                        queue.push_back(QueueNode { level_id: 0, node_pos: 0 });
                    }
                    outs.add(src.levels[level_id].outs.get(node_id));
                    node.node_pos += 1;
                }
            }
            louds.add(true);
        }

        louds.build();
        outs.build();

        let size = louds.size_bytes() + outs.size_bytes() + labels.len();
        let n_nodes = outs.len() as u64;

        Self { n_keys: src.n_keys, n_nodes, size, louds, outs, labels }
    }

    fn lookup(&self, query: &[u8]) -> u64 {
        let mut node_id: usize = 0;
        for &byte in query {
            let node_pos = self.louds.select1(node_id) + 1;
            let end_bit = next_one_bit(self.louds.words(), node_pos);
            let mut begin = node_pos - node_id - 1;
            let mut end = begin + (end_bit - node_pos);

            let mut found = false;
            while begin < end {
                node_id = (begin + end) / 2;
                if byte < self.labels[node_id] {
                    end = node_id;
                } else if byte > self.labels[node_id] {
                    begin = node_id + 1;
                } else {
                    found = true;
                    break;
                }
            }
            if !found { return NOT_FOUND; }
        }
        if !self.outs.get(node_id) { return NOT_FOUND; }
        self.outs.rank1(node_id) as u64
    }

    fn reverse_lookup(&self, id: u64, key: &mut Vec<u8>) {
        assert!(id < self.n_keys, "id {id} out of bounds (n_keys {})", self.n_keys);
        key.clear();
        let mut node_id = self.outs.select1(id as usize);
        while node_id != 0 {
            key.push(self.labels[node_id]);
            let node_pos = self.louds.select0(node_id);
            node_id = node_pos - node_id - 1;
        }
        key.reverse();
    }

    fn n_keys(&self) -> u64 { self.n_keys }
    fn n_nodes(&self) -> u64 { self.n_nodes }
    fn size(&self) -> usize { self.size }
    fn name(&self) -> &'static str { "LOUDS trie" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(words: &[&str]) -> Vec<Vec<u8>> {
        words.iter().map(|w| w.as_bytes().to_vec()).collect()
    }

    #[test]
    fn empty_key_round_trips() {
        let trie = FlatTrie::build(&keys(&["", "a", "ab"]));
        assert_eq!(trie.n_keys(), 3);
        assert_eq!(trie.lookup(b""), 0);
    }

    #[test]
    fn shared_prefixes_and_bijection() {
        let words = ["an", "ant", "anteater", "antelope", "bee", "been", "bees"];
        let trie = FlatTrie::build(&keys(&words));
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
        let trie = FlatTrie::build(&keys(&["ant", "anteater", "bee"]));
        for absent in ["a", "an", "ants", "be", "beez", "zebra"] {
            assert_eq!(trie.lookup(absent.as_bytes()), NOT_FOUND, "{absent}");
        }
    }

    #[test]
    fn single_long_chain() {
        let word = "abcdefghijklmnopqrstuvwxyz";
        let trie = FlatTrie::build(&keys(&[word]));
        assert_eq!(trie.lookup(word.as_bytes()), 0);
        assert_eq!(trie.lookup(b"abcdefghijklmnopqrstuvwxy"), NOT_FOUND);
    }

    #[test]
    fn byte_value_boundaries() {
        let mut words: Vec<Vec<u8>> = vec![vec![0u8], vec![0u8, 0u8], vec![0x7f]];
        words.sort();
        let trie = FlatTrie::build(&words);
        for (id, w) in words.iter().enumerate() {
            assert_eq!(trie.lookup(w), id as u64);
        }
    }

    #[test]
    fn wide_fan_out() {
        let words: Vec<Vec<u8>> = (0u16..256).map(|b| vec![b as u8]).collect();
        let trie = FlatTrie::build(&words);
        assert_eq!(trie.n_keys(), 256);
        for (id, w) in words.iter().enumerate() {
            assert_eq!(trie.lookup(w), id as u64);
        }
    }

    #[test]
    fn large_randomized_set() {
        use rand::{Rng, SeedableRng};
        use rand::rngs::StdRng;
        let mut rng = StdRng::seed_from_u64(314);
        let mut set = std::collections::BTreeSet::new();
        while set.len() < 2000 {
            let len = rng.gen_range(0..12);
            let w: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect();
            set.insert(w);
        }
        let words: Vec<Vec<u8>> = set.into_iter().collect();
        let member_set: std::collections::BTreeSet<Vec<u8>> = words.iter().cloned().collect();
        let trie = FlatTrie::build(&words);
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
