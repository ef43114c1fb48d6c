// wordshield/src/trie/mod.rs
//! The pattern index: a staging trie fed one pattern at a time, packed
//! into a double-array trie with Aho-Corasick failure links.
//!
//! [`StagingTrie`] is the mutable, arena-backed tree that exists only
//! between `add` and `build`. [`DatAutomaton`] is the immutable packed
//! form searched by every query; once built it is never mutated, so many
//! readers can search it concurrently without coordination.
//!
//! License: MIT OR APACHE 2.0

mod dat;
mod staging;

pub(crate) use dat::DatAutomaton;
pub(crate) use staging::StagingTrie;
