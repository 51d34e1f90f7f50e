use std::collections::HashMap;

use crate::cache::Key;
use crate::literal::Lit;

/// Ground atoms interned per (atom, step).
#[derive(Debug, Default)]
pub struct SymbolTable {
    literals: HashMap<Key, Lit>,
    owners: HashMap<u32, Key>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<Lit> {
        self.literals.get(key).copied()
    }

    pub fn insert(&mut self, key: Key, lit: Lit) {
        assert!(!lit.is_negated(), "Ground atom literal should be positive");
        let old = self.literals.insert(key, lit);
        assert!(old.is_none(), "Ground atom {:?} should be interned once", key);
        self.owners.insert(lit.atom(), key);
    }

    /// The (atom, step) pair an atom stands for.
    pub fn owner(&self, atom: u32) -> Option<Key> {
        self.owners.get(&atom).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, Lit)> + '_ {
        self.literals.iter().map(|(&k, &l)| (k, l))
    }
}
