#![doc = include_str!("../README.md")]

pub mod trie;
pub mod level;
pub mod flat;
pub mod patricia;
pub mod indirect;
pub mod tstree;

mod source_trie;

pub use trie::{Trie, NOT_FOUND};
pub use level::LevelTrie;
pub use flat::FlatTrie;
pub use patricia::Patricia;
pub use indirect::Indirect;
pub use tstree::TSTree;
