/// Sentinel returned by [`Trie::lookup`] for a key that is not present.
pub const NOT_FOUND: u64 = u64::MAX;

/// Common interface implemented by every succinct trie variant in this crate.
///
/// Keys are inserted in ascending lexicographic order through repeated calls
/// made internally during [`build`](Trie::build); there is no incremental
/// public `insert` — once built a trie is read-only, matching the frozen
/// rank/select structures it is built on.
pub trait Trie {
    /// Builds the trie over `keys`, which must already be sorted and
    /// duplicate-free.
    ///
    /// # Panics
    /// If `keys` is not strictly increasing.
    fn build<K: AsRef<[u8]>>(keys: &[K]) -> Self;

    /// Returns the id of `query` (its rank among the inserted keys, counting
    /// from 0), or [`NOT_FOUND`] if `query` was not inserted.
    fn lookup(&self, query: &[u8]) -> u64;

    /// Reconstructs the key with the given id into `key`, clearing it first.
    ///
    /// # Panics
    /// If `id >= self.n_keys()`.
    fn reverse_lookup(&self, id: u64, key: &mut Vec<u8>);

    /// Number of keys inserted.
    fn n_keys(&self) -> u64;

    /// Number of trie nodes, including the synthetic root.
    fn n_nodes(&self) -> u64;

    /// Approximate size in bytes of the built structure.
    fn size(&self) -> usize;

    /// Short, human-readable name of this trie variant.
    fn name(&self) -> &'static str;
}
