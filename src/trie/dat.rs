// wordshield/src/trie/dat.rs
//! Double-array trie with Aho-Corasick failure links.
//!
//! The packed form of the staging trie: five arrays grown in lockstep,
//! where the transition from state `s` on code point `c` targets
//! `t = base[s] + c` iff `used[t]` and `check[t] == s`. Root children are
//! pinned at slot `c` itself (so `base[0] = 0`); every other sibling group
//! gets its base from a collision-driven search that starts at a monotone
//! cursor and never moves backwards. Children are placed in ascending
//! code-point order, which makes the packing deterministic for a given
//! pattern set.
//!
//! Outputs are stored only at the state where a pattern ends; the search
//! walks the failure chain at match time to surface suffix patterns, so
//! the reported multiset is identical to a pre-flattened layout.
//!
//! After construction the automaton is immutable and searched lock-free
//! by any number of concurrent readers.
//!
//! License: MIT OR APACHE 2.0

use std::mem;

use crate::config::Level;
use crate::detection::Match;
use crate::trie::staging::{StagingTrie, ROOT};

const INITIAL_SLOTS: usize = 1024;

/// A pattern ending at a given state: its normalized text, severity, and
/// length in code points.
#[derive(Debug, Clone)]
struct OutputRec {
    word: String,
    level: Level,
    len: usize,
}

#[derive(Debug)]
pub(crate) struct DatAutomaton {
    base: Vec<usize>,
    check: Vec<u32>,
    fail: Vec<u32>,
    outputs: Vec<Vec<OutputRec>>,
    used: Vec<bool>,
    /// Outgoing edge labels per state; needed for the failure-link BFS and
    /// released once construction finishes.
    children: Vec<Vec<char>>,
    /// High-water mark: highest used slot + 1.
    size: usize,
    /// Monotone cursor for the base search.
    next_check_pos: usize,
}

impl DatAutomaton {
    /// Packs the staging trie. The trie is only read; the caller drops it
    /// afterwards, making the automaton the sole surviving index.
    pub(crate) fn build(trie: &StagingTrie) -> Self {
        let mut dat = Self::with_slots(INITIAL_SLOTS);
        dat.used[0] = true;

        // Root children are pinned at slot == code point, implying base[0] = 0.
        for &(c, child) in trie.children(ROOT) {
            let slot = c as usize;
            dat.ensure(slot);
            dat.check[slot] = 0;
            dat.used[slot] = true;
            dat.children[0].push(c);
            dat.record_output(slot, trie, child);
            if slot + 1 > dat.size {
                dat.size = slot + 1;
            }
        }

        // Preorder placement of the remaining states. Children are pushed
        // in reverse so the smallest label pops first.
        let mut stack: Vec<(u32, usize)> = Vec::new();
        for &(c, child) in trie.children(ROOT).iter().rev() {
            stack.push((child, c as usize));
        }
        while let Some((node, state)) = stack.pop() {
            let edges = trie.children(node);
            if edges.is_empty() {
                continue;
            }
            dat.place_children(state, node, trie, &mut stack);
        }

        dat.build_failure_links();
        dat.children = Vec::new();
        dat
    }

    fn with_slots(slots: usize) -> Self {
        let mut outputs = Vec::with_capacity(slots);
        outputs.resize_with(slots, Vec::new);
        let mut children = Vec::with_capacity(slots);
        children.resize_with(slots, Vec::new);
        Self {
            base: vec![0; slots],
            check: vec![0; slots],
            fail: vec![0; slots],
            outputs,
            used: vec![false; slots],
            children,
            size: 1,
            next_check_pos: 1,
        }
    }

    /// Grows all arrays in lockstep so `slot` is addressable. Existing
    /// assignments are preserved.
    fn ensure(&mut self, slot: usize) {
        if slot < self.used.len() {
            return;
        }
        let new_len = (self.used.len() * 2).max(slot + 1);
        self.base.resize(new_len, 0);
        self.check.resize(new_len, 0);
        self.fail.resize(new_len, 0);
        self.used.resize(new_len, false);
        self.outputs.resize_with(new_len, Vec::new);
        self.children.resize_with(new_len, Vec::new);
    }

    fn record_output(&mut self, slot: usize, trie: &StagingTrie, node: u32) {
        if let Some((word, level)) = trie.terminal(node) {
            self.outputs[slot].push(OutputRec {
                word: word.clone(),
                level: *level,
                len: word.chars().count(),
            });
        }
    }

    /// Finds a base for `state`'s sibling group and assigns every child.
    fn place_children(
        &mut self,
        state: usize,
        node: u32,
        trie: &StagingTrie,
        stack: &mut Vec<(u32, usize)>,
    ) {
        let edges = trie.children(node);
        let first = edges[0].0 as usize;
        let last = edges[edges.len() - 1].0 as usize;

        let mut base = self.next_check_pos.max(first + 1) - first;
        loop {
            self.ensure(base + last);
            let collision = edges.iter().any(|&(c, _)| self.used[base + c as usize]);
            if !collision {
                break;
            }
            base += 1;
        }

        self.base[state] = base;
        if base > self.next_check_pos {
            self.next_check_pos = base;
        }

        for &(c, child) in edges {
            let slot = base + c as usize;
            self.check[slot] = state as u32;
            self.used[slot] = true;
            self.children[state].push(c);
            self.record_output(slot, trie, child);
            if slot + 1 > self.size {
                self.size = slot + 1;
            }
        }
        for &(c, child) in edges.iter().rev() {
            stack.push((child, base + c as usize));
        }
    }

    /// Breadth-first failure-link construction over placed states.
    ///
    /// For a state reached from parent `p` on label `c`, the link is the
    /// deepest proper suffix of its path that is also a prefix of some
    /// pattern: follow `fail[p]`, `fail[fail[p]]`, … until a state with a
    /// `c` transition is found, else the root.
    fn build_failure_links(&mut self) {
        let mut queue: Vec<usize> = Vec::with_capacity(8192);
        for i in 0..self.children[0].len() {
            let t = self.children[0][i] as usize;
            self.fail[t] = 0;
            queue.push(t);
        }

        let mut head = 0usize;
        while head < queue.len() {
            let state = queue[head];
            head += 1;

            for i in 0..self.children[state].len() {
                let c = self.children[state][i];
                let t = self.base[state] + c as usize;
                if t >= self.check.len() || !self.used[t] || self.check[t] != state as u32 {
                    continue;
                }
                queue.push(t);

                let mut f = self.fail[state] as usize;
                loop {
                    if f == 0 {
                        let root_next = c as usize;
                        self.fail[t] = if root_next < self.check.len()
                            && self.used[root_next]
                            && self.check[root_next] == 0
                            && root_next != t
                        {
                            root_next as u32
                        } else {
                            0
                        };
                        break;
                    }
                    let f_next = self.base[f] + c as usize;
                    if f_next < self.check.len() && self.used[f_next] && self.check[f_next] == f as u32 {
                        self.fail[t] = f_next as u32;
                        break;
                    }
                    f = self.fail[f] as usize;
                }
            }
        }
    }

    /// Follows `state`'s transition on `c`, falling back along failure
    /// links; at the root a missing transition stays at the root.
    fn next_state(&self, mut state: usize, c: char) -> usize {
        loop {
            let t = self.base[state] + c as usize;
            if t < self.check.len() && self.used[t] && self.check[t] == state as u32 {
                return t;
            }
            if state == 0 {
                return 0;
            }
            state = self.fail[state] as usize;
        }
    }

    /// Reports every pattern occurrence in `text` (normalized code
    /// points), in order of end position; occurrences ending at the same
    /// position surface in output-chain order. Overlaps are retained.
    pub(crate) fn search(&self, text: &[char]) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut state = 0usize;
        for (i, &c) in text.iter().enumerate() {
            state = self.next_state(state, c);
            let mut t = state;
            while t != 0 {
                for rec in &self.outputs[t] {
                    matches.push(Match {
                        word: rec.word.clone(),
                        start: i + 1 - rec.len,
                        end: i + 1,
                        level: rec.level,
                    });
                }
                t = self.fail[t] as usize;
            }
        }
        matches
    }

    /// Returns on the first occurrence without materializing matches.
    pub(crate) fn contains(&self, text: &[char]) -> bool {
        let mut state = 0usize;
        for &c in text {
            state = self.next_state(state, c);
            let mut t = state;
            while t != 0 {
                if !self.outputs[t].is_empty() {
                    return true;
                }
                t = self.fail[t] as usize;
            }
        }
        false
    }

    /// The earliest occurrence by end position (ties: output-chain order).
    pub(crate) fn find_first(&self, text: &[char]) -> Option<Match> {
        let mut state = 0usize;
        for (i, &c) in text.iter().enumerate() {
            state = self.next_state(state, c);
            let mut t = state;
            while t != 0 {
                if let Some(rec) = self.outputs[t].first() {
                    return Some(Match {
                        word: rec.word.clone(),
                        start: i + 1 - rec.len,
                        end: i + 1,
                        level: rec.level,
                    });
                }
                t = self.fail[t] as usize;
            }
        }
        None
    }

    /// High-water mark of the packed arrays (highest used slot + 1).
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Approximate resident size of the packed arrays in bytes.
    pub(crate) fn memory_bytes(&self) -> u64 {
        let per_slot = mem::size_of::<usize>()          // base
            + mem::size_of::<u32>() * 2                 // check + fail
            + mem::size_of::<Vec<OutputRec>>()          // outputs headers
            + 1; // used
        (self.used.len() * per_slot) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn automaton(words: &[(&str, Level)]) -> DatAutomaton {
        let mut trie = StagingTrie::new();
        for &(w, level) in words {
            trie.insert(w, level);
        }
        DatAutomaton::build(&trie)
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_single_word() {
        let dat = automaton(&[("bad", Level::High)]);
        let matches = dat.search(&chars("this is bad"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].word, "bad");
        assert_eq!((matches[0].start, matches[0].end), (8, 11));
        assert_eq!(matches[0].level, Level::High);
    }

    #[test]
    fn test_overlapping_suffix_patterns() {
        // Classic failure-link exercise: all of she/he/hers fire in "ushers".
        let dat = automaton(&[
            ("she", Level::Low),
            ("he", Level::Low),
            ("hers", Level::Low),
        ]);
        let matches = dat.search(&chars("ushers"));
        let triples: Vec<(&str, usize, usize)> = matches
            .iter()
            .map(|m| (m.word.as_str(), m.start, m.end))
            .collect();
        assert_eq!(
            triples,
            vec![("she", 1, 4), ("he", 2, 4), ("hers", 2, 6)]
        );
    }

    #[test]
    fn test_repeated_occurrences() {
        let dat = automaton(&[("aa", Level::Medium)]);
        let matches = dat.search(&chars("aaaa"));
        // Overlapping occurrences are all retained.
        assert_eq!(matches.len(), 3);
        assert_eq!(
            matches.iter().map(|m| m.start).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_code_point_offsets() {
        let dat = automaton(&[("敏感词", Level::High)]);
        let matches = dat.search(&chars("这是敏感词文本"));
        assert_eq!(matches.len(), 1);
        assert_eq!((matches[0].start, matches[0].end), (2, 5));
    }

    #[test]
    fn test_no_match() {
        let dat = automaton(&[("bad", Level::High)]);
        assert!(dat.search(&chars("good text")).is_empty());
        assert!(!dat.contains(&chars("good text")));
        assert!(dat.find_first(&chars("good text")).is_none());
    }

    #[test]
    fn test_contains_short_circuits() {
        let dat = automaton(&[("b", Level::Low)]);
        assert!(dat.contains(&chars("abc")));
    }

    #[test]
    fn test_find_first_earliest_end() {
        let dat = automaton(&[("cde", Level::Low), ("bc", Level::High)]);
        let m = dat.find_first(&chars("abcde")).unwrap();
        assert_eq!(m.word, "bc");
        assert_eq!((m.start, m.end), (1, 3));
    }

    #[test]
    fn test_prefix_pattern_of_longer_pattern() {
        let dat = automaton(&[("ab", Level::Low), ("abcd", Level::High)]);
        let matches = dat.search(&chars("abcd"));
        let words: Vec<&str> = matches.iter().map(|m| m.word.as_str()).collect();
        assert_eq!(words, vec!["ab", "abcd"]);
    }

    #[test]
    fn test_empty_trie() {
        let trie = StagingTrie::new();
        let dat = DatAutomaton::build(&trie);
        assert!(dat.search(&chars("anything")).is_empty());
        assert_eq!(dat.size(), 1);
    }

    #[test]
    fn test_size_reflects_high_water_mark() {
        let dat = automaton(&[("abc", Level::Low)]);
        assert!(dat.size() > 1);
        assert!(dat.memory_bytes() > 0);
    }

    #[test]
    fn test_deterministic_packing() {
        // Same pattern set, different insertion order: identical automata.
        let a = automaton(&[("she", Level::Low), ("he", Level::Low), ("hers", Level::Low)]);
        let b = automaton(&[("hers", Level::Low), ("he", Level::Low), ("she", Level::Low)]);
        assert_eq!(a.size(), b.size());
        let text = chars("ushers she he hers");
        let ma = a.search(&text);
        let mb = b.search(&text);
        assert_eq!(ma, mb);
    }

    #[test]
    fn test_dense_sibling_groups() {
        // Many siblings across many parents force base-search collisions.
        let words: Vec<String> = ('a'..='z')
            .flat_map(|x| ('a'..='z').map(move |y| format!("{x}{y}")))
            .collect();
        let mut trie = StagingTrie::new();
        for w in &words {
            trie.insert(w, Level::Medium);
        }
        let dat = DatAutomaton::build(&trie);
        for w in &words {
            assert!(dat.contains(&chars(w)), "missing {w}");
        }
        let matches = dat.search(&chars("xyzzy"));
        let found: Vec<&str> = matches.iter().map(|m| m.word.as_str()).collect();
        assert_eq!(found, vec!["xy", "yz", "zz", "zy"]);
    }
}
