use std::cell::Cell;
use std::collections::HashMap;

use crate::arena::FormulaId;
use crate::literal::{Allocator, Lit};

/// A formula at a step.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Key {
    pub formula: FormulaId,
    pub step: usize,
}

impl Key {
    pub fn new(formula: FormulaId, step: usize) -> Self {
        Self { formula, step }
    }

    /// Perfect packing of the pair into one integer.
    pub fn pack(&self) -> u64 {
        szudzik(self.formula.index() as u64, self.step as u64)
    }
}

/// Szudzik's pairing: `b^2 + a` below the diagonal, `a^2 + a + b` otherwise.
fn szudzik(a: u64, b: u64) -> u64 {
    if a < b {
        b * b + a
    } else {
        a * a + a + b
    }
}

/// Maps each (formula, step) pair to its representative literal.
///
/// An entry is written exactly once, when the pair is first translated, and
/// never reassigned. A host literal bound ahead of time becomes the
/// representative instead of a fresh one.
#[derive(Debug, Default)]
pub struct EquivalenceCache {
    entries: HashMap<u64, Lit>,
    bindings: HashMap<u64, Lit>,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl EquivalenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
    /// Get the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the cached literal.
    pub fn get(&self, key: &Key) -> Option<Lit> {
        match self.entries.get(&key.pack()) {
            Some(&lit) => {
                self.hits.set(self.hits.get() + 1);
                Some(lit)
            }
            None => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    /// Return the literal for `key`, allocating it on first request.
    ///
    /// The flag is `true` iff the literal was created by this call, in which
    /// case the caller must emit its defining rules.
    pub fn get_or_create(&mut self, key: &Key, alloc: &mut Allocator) -> (Lit, bool) {
        if let Some(lit) = self.get(key) {
            return (lit, false);
        }
        let h = key.pack();
        let lit = self.bindings.remove(&h).unwrap_or_else(|| alloc.fresh());
        self.entries.insert(h, lit);
        (lit, true)
    }

    /// Record that `key` is represented by the already existing `shared`.
    ///
    /// Returns the representative, and whether it is a bound host literal
    /// that still has to be tied to `shared`.
    pub fn share(&mut self, key: &Key, shared: Lit) -> (Lit, bool) {
        let h = key.pack();
        assert!(
            !self.entries.contains_key(&h),
            "Cache entry for {:?} should be created only once",
            key
        );
        match self.bindings.remove(&h) {
            Some(host) => {
                self.entries.insert(h, host);
                (host, true)
            }
            None => {
                self.entries.insert(h, shared);
                (shared, false)
            }
        }
    }

    /// Reserve `lit` as the representative of `key`.
    ///
    /// Fails (returns `false`) if `key` already has a literal or a binding.
    pub fn bind(&mut self, key: &Key, lit: Lit) -> bool {
        let h = key.pack();
        if self.entries.contains_key(&h) || self.bindings.contains_key(&h) {
            return false;
        }
        self.bindings.insert(h, lit);
        true
    }
}
