//! Disjoint-set forest over hashable ids.

use std::collections::HashMap;
use std::hash::Hash;

/// Union-find with path compression and union by rank.
///
/// Elements are added lazily: [`find`](Self::find) on an unknown element
/// makes it a singleton.
#[derive(Debug, Clone)]
pub struct DisjointSet<T> {
    parent: HashMap<T, T>,
    rank: HashMap<T, u32>,
}

impl<T: Copy + Eq + Hash> Default for DisjointSet<T> {
    fn default() -> Self {
        Self {
            parent: HashMap::new(),
            rank: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> DisjointSet<T> {
    /// Creates an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `x` as a singleton if it is not known yet.
    pub fn insert(&mut self, x: T) {
        self.parent.entry(x).or_insert(x);
    }

    /// Returns the representative of `x`'s set.
    pub fn find(&mut self, x: T) -> T {
        self.insert(x);
        let mut root = x;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        let mut cur = x;
        while cur != root {
            let next = self.parent.get(&cur).copied().unwrap_or(root);
            self.parent.insert(cur, root);
            cur = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`. Returns `false` if they were already
    /// one set.
    pub fn union(&mut self, a: T, b: T) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        let rank_a = self.rank.get(&ra).copied().unwrap_or(0);
        let rank_b = self.rank.get(&rb).copied().unwrap_or(0);
        if rank_a < rank_b {
            self.parent.insert(ra, rb);
        } else {
            self.parent.insert(rb, ra);
            if rank_a == rank_b {
                self.rank.insert(ra, rank_a + 1);
            }
        }
        true
    }

    /// Merges the set of `child` into the set of `keeper`; the representative
    /// of `keeper`'s set stays the representative.
    pub fn absorb(&mut self, child: T, keeper: T) -> bool {
        let rc = self.find(child);
        let rk = self.find(keeper);
        if rc == rk {
            return false;
        }
        self.parent.insert(rc, rk);
        let rank_c = self.rank.get(&rc).copied().unwrap_or(0);
        let rank_k = self.rank.entry(rk).or_insert(0);
        *rank_k = (*rank_k).max(rank_c + 1);
        true
    }

    /// Returns `true` if `a` and `b` are in the same set.
    pub fn same(&mut self, a: T, b: T) -> bool {
        self.find(a) == self.find(b)
    }

    /// Groups `items` by set, keeping the first-seen order of both the groups
    /// and the items inside each group.
    pub fn groups<I>(&mut self, items: I) -> Vec<Vec<T>>
    where
        I: IntoIterator<Item = T>,
    {
        let mut slot: HashMap<T, usize> = HashMap::new();
        let mut groups: Vec<Vec<T>> = Vec::new();
        for item in items {
            let root = self.find(item);
            let idx = *slot.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(item);
        }
        groups
    }
}
