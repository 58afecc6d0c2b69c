//! Mergeable dictionary over a fixed universe of integer keys
//!
//! Each [`Trie`] is a binary trie of fixed depth whose leaves are the keys it
//! holds; every node records the number of leaves below it. All tries of one
//! universe share a [`TrieArena`], and child links are arena indices.
//!
//! # Ownership
//! A [`Trie`] handle is neither `Clone` nor `Copy`. [`TrieArena::split`]
//! hands out a fresh handle for the extracted keys and [`TrieArena::merge`]
//! consumes the absorbed handle, so a subtree always has exactly one owner.
//!
//! # Algorithmic Complexity
//! - `split` and `some`: O(depth) = O(log k)
//! - `merge`: O(size of the overlap of both tries), amortised O(log k) per key
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

type Slot = usize;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    size: usize,
    children: [Option<Slot>; 2],
}

/// Owning handle to one trie of an arena
#[derive(Debug, PartialEq, Eq)]
pub struct Trie {
    root: Slot,
}

/// Node storage shared by all tries over keys `0..universe`
#[derive(Debug)]
pub struct TrieArena {
    nodes: Vec<TrieNode>,
    free: Vec<Slot>,
    depth: u32,
    universe: usize,
}

impl TrieArena {
    /// Arena for keys `0..universe`
    pub fn new(universe: usize) -> Self {
        let depth = (usize::BITS - universe.saturating_sub(1).leading_zeros()).max(1);
        Self { nodes: Vec::new(), free: Vec::new(), depth, universe }
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    fn alloc(&mut self) -> Slot {
        match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.nodes.push(TrieNode::default());
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, slot: Slot) {
        self.nodes[slot] = TrieNode::default();
        self.free.push(slot);
    }

    /// Trie holding no keys
    pub fn empty(&mut self) -> Trie {
        Trie { root: self.alloc() }
    }

    /// Trie holding every key of the universe
    pub fn full(&mut self) -> Trie {
        let trie = self.empty();
        for key in 0..self.universe {
            let mut node = trie.root;
            self.nodes[node].size += 1;
            for level in (0..self.depth).rev() {
                let side = (key >> level) & 1;
                let child = match self.nodes[node].children[side] {
                    Some(child) => child,
                    None => {
                        let child = self.alloc();
                        self.nodes[node].children[side] = Some(child);
                        child
                    }
                };
                self.nodes[child].size += 1;
                node = child;
            }
        }
        trie
    }

    /// Number of keys held by `trie`
    #[inline]
    pub fn size(&self, trie: &Trie) -> usize {
        self.nodes[trie.root].size
    }

    /// Some key held by `trie`, preferring the leftmost branch
    pub fn some(&self, trie: &Trie) -> Option<usize> {
        if self.size(trie) == 0 {
            return None;
        }
        let mut node = trie.root;
        let mut key = 0;
        for _ in 0..self.depth {
            let [left, right] = self.nodes[node].children;
            let (side, child) = match (left, right) {
                (Some(child), _) => (0, child),
                (None, Some(child)) => (1, child),
                (None, None) => return None,
            };
            key = (key << 1) | side;
            node = child;
        }
        Some(key)
    }

    /// Move `count` keys out of `from` into a new trie
    ///
    /// Whole subtrees are re-parented while they fit into the remaining
    /// count; at most one root-to-leaf path is copied.
    pub fn split(&mut self, from: &mut Trie, count: usize) -> Trie {
        let taken = self.empty();
        let mut remaining = count.min(self.size(from));
        if remaining == 0 {
            return taken;
        }
        let (mut old, mut new) = (from.root, taken.root);
        loop {
            self.nodes[new].size = remaining;
            self.nodes[old].size -= remaining;
            for side in 0..2 {
                if let Some(child) = self.nodes[old].children[side] {
                    let child_size = self.nodes[child].size;
                    if child_size <= remaining {
                        self.nodes[old].children[side] = None;
                        self.nodes[new].children[side] = Some(child);
                        remaining -= child_size;
                    }
                }
            }
            if remaining == 0 {
                break;
            }
            let side = if self.nodes[old].children[0].is_some() { 0 } else { 1 };
            let Some(child) = self.nodes[old].children[side] else {
                break;
            };
            let copy = self.alloc();
            self.nodes[new].children[side] = Some(copy);
            old = child;
            new = copy;
        }
        taken
    }

    /// Absorb every key of `from` into `into`, consuming `from`
    pub fn merge(&mut self, into: &mut Trie, from: Trie) {
        let mut stack = vec![(into.root, from.root)];
        while let Some((target, absorbed)) = stack.pop() {
            self.nodes[target].size += self.nodes[absorbed].size;
            for side in 0..2 {
                match (self.nodes[target].children[side], self.nodes[absorbed].children[side]) {
                    (_, None) => {}
                    (None, Some(child)) => self.nodes[target].children[side] = Some(child),
                    (Some(left), Some(right)) => stack.push((left, right)),
                }
            }
            self.release(absorbed);
        }
    }

    /// Keys held by `trie` in increasing order
    pub fn keys(&self, trie: &Trie) -> Vec<usize> {
        let mut keys = Vec::with_capacity(self.size(trie));
        let mut stack = vec![(trie.root, 0usize, 0u32)];
        while let Some((node, prefix, level)) = stack.pop() {
            if level == self.depth {
                keys.push(prefix);
                continue;
            }
            for side in (0..2).rev() {
                if let Some(child) = self.nodes[node].children[side] {
                    stack.push((child, (prefix << 1) | side, level + 1));
                }
            }
        }
        keys
    }

    /// Number of nodes currently owned by some trie
    pub fn live_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_trie_holds_every_key() {
        let mut arena = TrieArena::new(5);
        let trie = arena.full();
        assert_eq!(arena.size(&trie), 5);
        assert_eq!(arena.keys(&trie), vec![0, 1, 2, 3, 4]);
        assert_eq!(arena.some(&trie), Some(0));
    }

    #[test]
    fn test_split_takes_exact_count() {
        let mut arena = TrieArena::new(7);
        let mut source = arena.full();
        let piece = arena.split(&mut source, 3);

        assert_eq!(arena.size(&piece), 3);
        assert_eq!(arena.size(&source), 4);
        let mut all = arena.keys(&piece);
        all.extend(arena.keys(&source));
        all.sort_unstable();
        assert_eq!(all, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_and_merge_round_trip() {
        let mut arena = TrieArena::new(10);
        let mut source = arena.full();
        let mut left = arena.empty();
        let mut right = arena.empty();

        for _ in 0..5 {
            let one = arena.split(&mut source, 1);
            arena.merge(&mut left, one);
            let one = arena.split(&mut source, 1);
            arena.merge(&mut right, one);
        }
        assert_eq!(arena.size(&source), 0);
        assert_eq!(arena.some(&source), None);
        assert_eq!(arena.size(&left) + arena.size(&right), 10);

        arena.merge(&mut left, right);
        assert_eq!(arena.keys(&left), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_larger_than_size_is_clamped() {
        let mut arena = TrieArena::new(3);
        let mut source = arena.full();
        let piece = arena.split(&mut source, 10);
        assert_eq!(arena.size(&piece), 3);
        assert_eq!(arena.size(&source), 0);
        let nothing = arena.split(&mut source, 2);
        assert_eq!(arena.size(&nothing), 0);
    }

    #[test]
    fn test_merge_releases_absorbed_nodes() {
        let mut arena = TrieArena::new(4);
        let mut source = arena.full();
        let piece = arena.split(&mut source, 2);
        let before = arena.live_nodes();
        arena.merge(&mut source, piece);
        assert!(arena.live_nodes() < before);
        assert_eq!(arena.keys(&source), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_single_key_universe() {
        let mut arena = TrieArena::new(1);
        let mut trie = arena.full();
        assert_eq!(arena.some(&trie), Some(0));
        let piece = arena.split(&mut trie, 1);
        assert_eq!(arena.some(&piece), Some(0));
    }
}
