// wordshield/src/trie/staging.rs
//! Arena-backed staging trie.
//!
//! Accepts normalized patterns one at a time and holds them until the
//! double-array build consumes the tree. Nodes live in a flat arena and
//! reference each other by index; each node keeps its outgoing edges in a
//! small vector sorted by code point, which is also the order the packer
//! requires. No matching ever runs against this structure.
//!
//! License: MIT OR APACHE 2.0

use crate::config::Level;

pub(crate) type NodeId = u32;

pub(crate) const ROOT: NodeId = 0;

#[derive(Debug)]
pub(crate) struct StagingNode {
    /// Outgoing edges, sorted ascending by code point.
    children: Vec<(char, NodeId)>,
    /// Set on the last node of an inserted pattern: the normalized text
    /// and its severity. Re-inserting the same pattern overwrites this.
    terminal: Option<(String, Level)>,
}

impl StagingNode {
    fn new() -> Self {
        Self {
            children: Vec::new(),
            terminal: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct StagingTrie {
    nodes: Vec<StagingNode>,
}

impl StagingTrie {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![StagingNode::new()],
        }
    }

    /// Inserts an already-normalized, non-empty pattern.
    pub(crate) fn insert(&mut self, word: &str, level: Level) {
        let mut current = ROOT;
        for c in word.chars() {
            let idx = match self.nodes[current as usize]
                .children
                .binary_search_by_key(&c, |&(label, _)| label)
            {
                Ok(i) => self.nodes[current as usize].children[i].1,
                Err(i) => {
                    let id = self.nodes.len() as NodeId;
                    self.nodes.push(StagingNode::new());
                    self.nodes[current as usize].children.insert(i, (c, id));
                    id
                }
            };
            current = idx;
        }
        self.nodes[current as usize].terminal = Some((word.to_string(), level));
    }

    pub(crate) fn children(&self, id: NodeId) -> &[(char, NodeId)] {
        &self.nodes[id as usize].children
    }

    pub(crate) fn terminal(&self, id: NodeId) -> Option<&(String, Level)> {
        self.nodes[id as usize].terminal.as_ref()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
