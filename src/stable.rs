//! Brute-force stable model enumeration.
//!
//! Meant for checking small emitted programs (a few dozen atoms at most),
//! not for solving. Free externals behave like unconditional choices.

use std::collections::BTreeSet;

use crate::literal::Lit;
use crate::rule::{Rule, RuleKind};

/// Largest number of candidate atoms the enumerator accepts.
pub const MAX_CANDIDATES: usize = 24;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Model {
    atoms: BTreeSet<u32>,
}

impl Model {
    pub fn contains(&self, atom: u32) -> bool {
        self.atoms.contains(&atom)
    }

    /// Whether the literal is true in the model.
    pub fn holds(&self, lit: Lit) -> bool {
        self.contains(lit.atom()) != lit.is_negated()
    }

    pub fn atoms(&self) -> impl Iterator<Item = u32> + '_ {
        self.atoms.iter().copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    rules: Vec<Rule>,
    free: BTreeSet<u32>,
}

/// A rule over candidate indices. Body atoms that can never be true have
/// been simplified away.
#[derive(Debug)]
struct Compiled {
    choice: bool,
    head: u64,
    pos: u64,
    neg: u64,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = Rule>) {
        self.rules.extend(rules);
    }

    /// Declare a free external.
    pub fn add_free(&mut self, atom: u32) {
        self.free.insert(atom);
    }

    /// Forget a free external; it becomes an ordinary atom.
    pub fn release(&mut self, atom: u32) {
        self.free.remove(&atom);
    }

    /// Number of atoms that may be true in some stable model.
    pub fn num_candidates(&self) -> usize {
        self.candidates().len()
    }

    /// Atoms that may be true in some stable model.
    fn candidates(&self) -> Vec<u32> {
        let mut atoms = self.free.clone();
        for rule in &self.rules {
            atoms.extend(rule.head.iter().copied());
        }
        atoms.into_iter().collect()
    }

    fn compile(&self, candidates: &[u32]) -> Vec<Compiled> {
        let bit = |atom: u32| {
            candidates
                .binary_search(&atom)
                .ok()
                .map(|i| 1u64 << i)
        };
        let mut compiled = Vec::new();
        'rules: for rule in &self.rules {
            let mut c = Compiled {
                choice: rule.kind == RuleKind::Choice,
                head: 0,
                pos: 0,
                neg: 0,
            };
            for &h in &rule.head {
                c.head |= bit(h).unwrap_or(0);
            }
            for &lit in &rule.body {
                match (bit(lit.atom()), lit.is_negated()) {
                    (Some(b), false) => c.pos |= b,
                    (Some(b), true) => c.neg |= b,
                    // never true: body false
                    (None, false) => continue 'rules,
                    // never true: literal holds
                    (None, true) => {}
                }
            }
            compiled.push(c);
        }
        for &atom in &self.free {
            if let Some(b) = bit(atom) {
                compiled.push(Compiled {
                    choice: true,
                    head: b,
                    pos: 0,
                    neg: 0,
                });
            }
        }
        compiled
    }

    /// All stable models.
    pub fn models(&self) -> Vec<Model> {
        self.models_assuming(&[])
    }

    /// Stable models in which every literal of `assumptions` holds.
    pub fn models_assuming(&self, assumptions: &[Lit]) -> Vec<Model> {
        let candidates = self.candidates();
        assert!(
            candidates.len() <= MAX_CANDIDATES,
            "Program is too large for brute force: {} candidate atoms",
            candidates.len()
        );
        let rules = self.compile(&candidates);

        let mut models = Vec::new();
        for m in 0..(1u64 << candidates.len()) {
            if !is_model(&rules, m) || !is_minimal(&rules, m) {
                continue;
            }
            let atoms = candidates
                .iter()
                .enumerate()
                .filter(|(i, _)| m & (1 << i) != 0)
                .map(|(_, &a)| a)
                .collect();
            let model = Model { atoms };
            if assumptions.iter().all(|&l| model.holds(l)) {
                models.push(model);
            }
        }
        models
    }
}

fn body_holds(rule: &Compiled, m: u64) -> bool {
    rule.pos & !m == 0 && rule.neg & m == 0
}

fn is_model(rules: &[Compiled], m: u64) -> bool {
    rules
        .iter()
        .all(|r| r.choice || !body_holds(r, m) || r.head & m != 0)
}

/// Whether `m` is a minimal model of the reduct of `rules` with respect to `m`.
fn is_minimal(rules: &[Compiled], m: u64) -> bool {
    // (head, positive body) of the reduct
    let reduct = rules
        .iter()
        .filter(|r| r.neg & m == 0)
        .filter_map(|r| {
            if r.choice {
                (r.head & m != 0).then_some((r.head & m, r.pos))
            } else {
                (r.head != 0).then_some((r.head, r.pos))
            }
        })
        .collect::<Vec<_>>();

    if reduct.iter().all(|(h, _)| h.count_ones() == 1) {
        // least model of a definite program
        let mut lm = 0u64;
        loop {
            let next = reduct
                .iter()
                .filter(|(_, pos)| pos & !lm == 0)
                .fold(lm, |acc, (h, _)| acc | h);
            if next == lm {
                break;
            }
            lm = next;
        }
        return lm == m;
    }

    // disjunctive: no proper subset may be a model of the reduct
    let satisfies = |s: u64| {
        reduct
            .iter()
            .all(|&(h, pos)| pos & !s != 0 || h & s != 0)
    };
    let mut sub = m;
    while sub != 0 {
        sub = (sub - 1) & m;
        if satisfies(sub) {
            return false;
        }
    }
    true
}
