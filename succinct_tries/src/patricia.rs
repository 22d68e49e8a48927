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

/// Flat (single-bitmap) LOUDS trie with inline tail compression.
///
/// Chains of single-child nodes below a branching point are collapsed into
/// one `links_`-flagged node plus a run of bytes in `tail_bytes_`, so a key
/// only costs one trie node per branch rather than one per byte. Siblings at
/// each node are stored sorted and searched with a binary search over the
/// run of `labels_` delimited by the enclosing `louds_` run.
pub struct Patricia {
    louds: BitVector<BinaryRankSearch>,
    outs: BitVector<BinaryRankSearch>,
    links: BitVector<BinaryRankSearch>,
    labels: Vec<u8>,
    tail_bits: BitVector<BinaryRankSearch>,
    tail_bytes: Vec<u8>,
    n_keys: u64,
    n_nodes: u64,
    size: usize,
}

impl Trie for Patricia {
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut src = SourceTrie::new();
        for key in keys { src.add(key.as_ref()); }
        src.build();

        let mut louds = BitVector::new();
        let mut outs = BitVector::new();
        let mut links = BitVector::new();
        let mut labels = Vec::new();
        let mut tail_bits = BitVector::new();
        let mut tail_bytes = Vec::new();

        louds.add(false);
        louds.add(true);
        outs.add(src.levels[0].outs.get(0));
        links.add(false);
        labels.push(b' ');

        let mut queue = VecDeque::new();
        if !src.levels[1].louds.get(0) {
            queue.push_back(QueueNode { level_id: 1, node_pos: 0 });
        }
        while let Some(mut node) = queue.pop_front() {
            if node.level_id != 0 {
                while !src.levels[node.level_id].louds.get(node.node_pos) {
                    louds.add(false);
                    let mut level_id = node.level_id;
                    let node_pos_start = node.node_pos;
                    let mut node_id = node_pos_start - src.levels[level_id].louds.rank1(node_pos_start);
                    labels.push(src.levels[level_id].labels[node_id]);
                    let mut node_pos;
                    loop {
                        node_pos = if node_id == 0 {
                            0
                        } else {
                            src.levels[level_id + 1].louds.select1(node_id - 1) + 1
                        };
                        if src.levels[level_id].outs.get(node_id)
                            || !src.levels[level_id + 1].louds.get(node_pos + 1) {
                            break;
                        }
                        node_id = node_pos - node_id;
                        tail_bits.add(level_id == node.level_id);
                        level_id += 1;
                        tail_bytes.push(src.levels[level_id].labels[node_id]);
                    }
                    if !src.levels[level_id + 1].louds.get(node_pos) {
                        queue.push_back(QueueNode { level_id: level_id + 1, node_pos });
                    } else {
                        queue.push_back(QueueNode { level_id: 0, node_pos: 0 });
                    }
                    links.add(level_id > node.level_id);
                    outs.add(src.levels[level_id].outs.get(node_id));
                    node.node_pos += 1;
                }
            }
            louds.add(true);
        }

        louds.build();
        outs.build();
        links.build();
        tail_bits.add(true);
        tail_bits.build();

        let size = louds.size_bytes() + outs.size_bytes() + links.size_bytes()
            + labels.len() + tail_bits.size_bytes() + tail_bytes.len();
        let n_nodes = outs.len() as u64;

        Self { n_keys: src.n_keys, n_nodes, size, louds, outs, links, labels, tail_bits, tail_bytes }
    }

    fn lookup(&self, query: &[u8]) -> u64 {
        let mut node_id: usize = 0;
        let mut i = 0usize;
        while i < query.len() {
            let node_pos = self.louds.select1(node_id) + 1;
            let end_bit = next_one_bit(self.louds.words(), node_pos);
            let mut begin = node_pos - node_id - 1;
            let mut end = begin + (end_bit - node_pos);

            let byte = query[i];
            loop {
                if begin >= end { return NOT_FOUND; }
                node_id = (begin + end) / 2;
                if byte < self.labels[node_id] {
                    end = node_id;
                } else if byte > self.labels[node_id] {
                    begin = node_id + 1;
                } else {
                    if self.links.get(node_id) {
                        let mut tail_pos = self.tail_bits.select1(self.links.rank1(node_id));
                        i += 1;
                        loop {
                            if i >= query.len() { break; }
                            if self.tail_bytes[tail_pos] != query[i] { return NOT_FOUND; }
                            tail_pos += 1;
                            if self.tail_bits.get(tail_pos) { break; }
                            i += 1;
                        }
                        if i == query.len() { return NOT_FOUND; }
                    }
                    break;
                }
            }
            i += 1;
        }
        if !self.outs.get(node_id) { return NOT_FOUND; }
        self.outs.rank1(node_id) as u64
    }

    fn reverse_lookup(&self, id: u64, key: &mut Vec<u8>) {
        assert!(id < self.n_keys, "id {id} out of bounds (n_keys {})", self.n_keys);
        key.clear();
        let mut node_id = self.outs.select1(id as usize);
        while node_id != 0 {
            if self.links.get(node_id) {
                let tail_id = self.links.rank1(node_id);
                let mut tail_pos = self.tail_bits.select1(tail_id + 1);
                loop {
                    tail_pos -= 1;
                    key.push(self.tail_bytes[tail_pos]);
                    if self.tail_bits.get(tail_pos) { break; }
                }
            }
            key.push(self.labels[node_id]);
            let node_pos = self.louds.select0(node_id);
            node_id = node_pos - node_id - 1;
        }
        key.reverse();
    }

    fn n_keys(&self) -> u64 { self.n_keys }
    fn n_nodes(&self) -> u64 { self.n_nodes }
    fn size(&self) -> usize { self.size }
    fn name(&self) -> &'static str { "LOUDS trie + labels" }
}
