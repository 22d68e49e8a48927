use std::collections::VecDeque;

use succinct_bitvec::{BitVector, PackedIntVec, BinaryRankSearch};
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

/// A byte string collected for one flat-trie node during the build pass,
/// tagged with the flat node it will eventually be linked from.
struct PendingTail {
    link_id: usize,
    bytes: Vec<u8>,
}

/// Flat LOUDS trie whose tails are deduplicated into a shared pool.
///
/// Structurally identical to [`crate::patricia::Patricia`] except that
/// `link_bits_`-flagged nodes hold an index into [`PackedIntVec`] `links_`
/// rather than an inline byte run; identical tails collected across the
/// whole trie collapse to one entry in `tail_bytes_`.
pub struct Indirect {
    louds: BitVector<BinaryRankSearch>,
    outs: BitVector<BinaryRankSearch>,
    link_bits: BitVector<BinaryRankSearch>,
    links: PackedIntVec,
    labels: Vec<u8>,
    tail_bits: BitVector<BinaryRankSearch>,
    tail_bytes: Vec<u8>,
    n_keys: u64,
    n_nodes: u64,
    size: usize,
}

impl Trie for Indirect {
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut src = SourceTrie::new();
        for key in keys { src.add(key.as_ref()); }
        src.build();

        let mut louds = BitVector::new();
        let mut outs = BitVector::new();
        let mut link_bits = BitVector::new();
        let mut labels = Vec::new();
        let mut tail_bits = BitVector::new();
        let mut tail_bytes = Vec::new();
        let mut pending: Vec<PendingTail> = Vec::new();
        let mut next_link_id = 0usize;

        louds.add(false);
        louds.add(true);
        outs.add(src.levels[0].outs.get(0));
        link_bits.add(false);
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
                    let mut tail = Vec::new();
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
                        level_id += 1;
                        tail.push(src.levels[level_id].labels[node_id]);
                    }
                    if !src.levels[level_id + 1].louds.get(node_pos) {
                        queue.push_back(QueueNode { level_id: level_id + 1, node_pos });
                    } else {
                        queue.push_back(QueueNode { level_id: 0, node_pos: 0 });
                    }
                    let has_tail = level_id > node.level_id;
                    link_bits.add(has_tail);
                    if has_tail {
                        let link_id = next_link_id;
                        next_link_id += 1;
                        pending.push(PendingTail { link_id, bytes: tail });
                    }
                    outs.add(src.levels[level_id].outs.get(node_id));
                    node.node_pos += 1;
                }
            }
            louds.add(true);
        }

        let mut links = PackedIntVec::with_capacity_and_max(0, 0);
        if !pending.is_empty() {
            pending.sort_by(|a, b| a.bytes.cmp(&b.bytes));
            let mut n_tails = 1usize;
            for i in 1..pending.len() {
                if pending[i].bytes != pending[i - 1].bytes { n_tails += 1; }
            }
            links = PackedIntVec::with_capacity_and_max(pending.len(), (n_tails - 1) as u64);
            for _ in 0..pending.len() { links.push(0); }

            let mut tail_id = 0u64;
            links.set(pending[0].link_id, tail_id);
            tail_bits.add(true);
            tail_bytes.push(pending[0].bytes[0]);
            for b in &pending[0].bytes[1..] {
                tail_bits.add(false);
                tail_bytes.push(*b);
            }
            for i in 1..pending.len() {
                if pending[i].bytes != pending[i - 1].bytes {
                    tail_bits.add(true);
                    tail_bytes.push(pending[i].bytes[0]);
                    for b in &pending[i].bytes[1..] {
                        tail_bits.add(false);
                        tail_bytes.push(*b);
                    }
                    tail_id += 1;
                }
                links.set(pending[i].link_id, tail_id);
            }
        }

        louds.build();
        outs.build();
        link_bits.build();
        tail_bits.add(true);
        tail_bits.build();

        let size = louds.size_bytes() + outs.size_bytes() + link_bits.size_bytes()
            + links.size_bytes() + labels.len()
            + tail_bits.size_bytes() + tail_bytes.len();
        let n_nodes = outs.len() as u64;

        Self { n_keys: src.n_keys, n_nodes, size, louds, outs, link_bits, links, labels, tail_bits, tail_bytes }
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
                    if self.link_bits.get(node_id) {
                        let tail_id = self.links.get(self.link_bits.rank1(node_id));
                        let mut tail_pos = self.tail_bits.select1(tail_id as usize);
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
            if self.link_bits.get(node_id) {
                let tail_id = self.links.get(self.link_bits.rank1(node_id));
                let mut tail_pos = self.tail_bits.select1(tail_id as usize + 1);
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
    fn name(&self) -> &'static str { "LOUDS trie + shared labels (indirect links)" }
}
