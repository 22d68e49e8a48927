use std::collections::VecDeque;

use succinct_bitvec::{BitVector, BinaryRankSearch};
use dyn_size_of::GetSize;

use crate::trie::{Trie, NOT_FOUND};
use crate::source_trie::SourceTrie;

struct QueueNode {
    level_id: usize,
    begin: usize,
    end: usize,
}

/// Ternary search tree over the byte alphabet at each node, with the same
/// inline tail compression as [`crate::patricia::Patricia`].
///
/// Each node reserves three bits in `tree_`: low/equal/high child present.
/// Node `k`'s children live at bit offsets `3k`, `3k+1`, `3k+2`; the id of a
/// present child is `tree_.rank1(that offset) + 1`. The set of siblings at
/// one trie depth is laid out as a balanced binary search tree over the
/// sorted label range, built by repeatedly splitting `[begin, end)` at its
/// midpoint.
pub struct TSTree {
    tree: BitVector<BinaryRankSearch>,
    outs: BitVector<BinaryRankSearch>,
    links: BitVector<BinaryRankSearch>,
    labels: Vec<u8>,
    tail_bits: BitVector<BinaryRankSearch>,
    tail_bytes: Vec<u8>,
    n_keys: u64,
    n_nodes: u64,
    size: usize,
}

impl Trie for TSTree {
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut src = SourceTrie::new();
        for key in keys { src.add(key.as_ref()); }
        src.build();

        let mut tree = BitVector::new();
        let mut outs = BitVector::new();
        let mut links = BitVector::new();
        let mut labels = Vec::new();
        let mut tail_bits = BitVector::new();
        let mut tail_bytes = Vec::new();

        tree.add(false);
        tree.add(false);
        tree.add(false);
        outs.add(src.levels[0].outs.get(0));
        links.add(false);
        labels.push(b' ');

        let mut queue = VecDeque::new();
        if !src.levels[1].louds.get(0) {
            tree.set(1, true);
            queue.push_back(QueueNode { level_id: 1, begin: 0, end: src.levels[1].louds.select1(0) });
        }
        while let Some(node) = queue.pop_front() {
            let middle = (node.end + node.begin) / 2;
            if node.begin < middle {
                tree.add(true);
                queue.push_back(QueueNode { level_id: node.level_id, begin: node.begin, end: middle });
            } else {
                tree.add(false);
            }
            if node.begin < node.end {
                let mut level_id = node.level_id;
                let node_pos_start = middle;
                let mut node_id = node_pos_start - src.levels[level_id].louds.rank1(middle);
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
                    tree.add(true);
                    queue.push_back(QueueNode {
                        level_id: level_id + 1,
                        begin: node_pos,
                        end: src.levels[level_id + 1].louds.select1(node_id),
                    });
                } else {
                    tree.add(false);
                }
                links.add(level_id > node.level_id);
                outs.add(src.levels[level_id].outs.get(node_id));
            } else {
                tree.add(false);
            }
            if middle + 1 < node.end {
                tree.add(true);
                queue.push_back(QueueNode { level_id: node.level_id, begin: middle + 1, end: node.end });
            } else {
                tree.add(false);
            }
        }

        tree.build();
        outs.build();
        links.build();
        tail_bits.add(true);
        tail_bits.build();

        let size = tree.size_bytes() + outs.size_bytes() + links.size_bytes()
            + labels.len() + tail_bits.size_bytes() + tail_bytes.len();
        let n_nodes = outs.len() as u64;

        Self { n_keys: src.n_keys, n_nodes, size, tree, outs, links, labels, tail_bits, tail_bytes }
    }

    fn lookup(&self, query: &[u8]) -> u64 {
        let mut node_id: usize = 1;
        let mut i = 0usize;
        while i < query.len() {
            let byte = query[i];
            if byte < self.labels[node_id] {
                let node_pos = node_id * 3;
                if self.tree.get(node_pos) {
                    node_id = self.tree.rank1(node_pos) + 1;
                } else {
                    return NOT_FOUND;
                }
            } else if byte > self.labels[node_id] {
                let node_pos = node_id * 3 + 2;
                if self.tree.get(node_pos) {
                    node_id = self.tree.rank1(node_pos) + 1;
                } else {
                    return NOT_FOUND;
                }
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
                i += 1;
                if i < query.len() {
                    let node_pos = node_id * 3 + 1;
                    if self.tree.get(node_pos) {
                        node_id = self.tree.rank1(node_pos) + 1;
                    } else {
                        return NOT_FOUND;
                    }
                }
            }
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
            loop {
                let node_pos = self.tree.select1(node_id - 1);
                node_id = node_pos / 3;
                if node_pos % 3 == 1 { break; }
            }
        }
        key.reverse();
    }

    fn n_keys(&self) -> u64 { self.n_keys }
    fn n_nodes(&self) -> u64 { self.n_nodes }
    fn size(&self) -> usize { self.size }
    fn name(&self) -> &'static str { "Ternary search tree + labels" }
}
