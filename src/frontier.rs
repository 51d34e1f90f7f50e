//! State living at the horizon edge: boundary externals, deferred head
//! obligations and fixpoint carrier instances.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use crate::arena::FormulaId;
use crate::formula::TemporalOp;
use crate::literal::Lit;

/// Truth of an external literal as seen by the solving engine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TruthValue {
    True,
    False,
    /// Not constrained yet; the engine may pick either value.
    Free,
}

impl Display for TruthValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TruthValue::True => write!(f, "true"),
            TruthValue::False => write!(f, "false"),
            TruthValue::Free => write!(f, "free"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct External {
    pub lit: Lit,
    pub truth: TruthValue,
}

impl Display for External {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#external {}. [{}]", self.lit, self.truth)
    }
}

/// A next-reference whose target step does not exist yet.
#[derive(Debug, Clone)]
pub(crate) struct Boundary {
    pub lit: Lit,
    /// Argument of the next operator, to be translated at `target`.
    pub arg: FormulaId,
    pub target: usize,
    pub weak: bool,
    open: bool,
}

/// A head requirement postponed until its step is unrolled.
#[derive(Debug, Clone)]
pub(crate) struct Deferred {
    pub formula: FormulaId,
    pub guard: Vec<Lit>,
}

/// One carrier literal of an until/release instance.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Carrier {
    pub formula: FormulaId,
    /// Step at which the instance was required.
    pub origin: usize,
    pub step: usize,
    pub lit: Lit,
}

/// An until/release requirement being unrolled step by step.
#[derive(Debug, Clone)]
pub(crate) struct Instance {
    pub formula: FormulaId,
    pub op: TemporalOp,
    pub lhs: Option<FormulaId>,
    pub rhs: FormulaId,
    pub guard: Vec<Lit>,
    pub origin: usize,
    pub last: usize,
    /// Carrier at step `last`.
    pub carrier: Option<Lit>,
}

#[derive(Debug, Default)]
pub(crate) struct Frontier {
    boundaries: Vec<Boundary>,
    deferred: BTreeMap<usize, Vec<Deferred>>,
    pub instances: Vec<Instance>,
}

impl Frontier {
    pub fn open(&mut self, lit: Lit, arg: FormulaId, target: usize, weak: bool) {
        log::debug!("open boundary external {} for target step {} (weak: {})", lit, target, weak);
        self.boundaries.push(Boundary {
            lit,
            arg,
            target,
            weak,
            open: true,
        });
    }

    /// Close and return every open boundary targeting `step`.
    pub fn take_due(&mut self, step: usize) -> Vec<Boundary> {
        let mut due = Vec::new();
        for b in self.boundaries.iter_mut().filter(|b| b.open && b.target == step) {
            b.open = false;
            due.push(b.clone());
        }
        self.boundaries.retain(|b| b.open);
        due
    }

    pub fn open_externals(&self) -> Vec<External> {
        self.boundaries
            .iter()
            .filter(|b| b.open)
            .map(|b| External {
                lit: b.lit,
                truth: TruthValue::Free,
            })
            .collect()
    }

    /// Literals that hold if the current edge is taken as the last step.
    pub fn closing_assumptions(&self) -> Vec<Lit> {
        self.boundaries
            .iter()
            .filter(|b| b.open)
            .map(|b| if b.weak { b.lit } else { -b.lit })
            .collect()
    }

    /// Fix every open boundary for a closed horizon: no next step exists,
    /// so strong references are false and weak ones true.
    pub fn fix_open(&mut self) -> Vec<External> {
        let fixed = self
            .boundaries
            .iter()
            .filter(|b| b.open)
            .map(|b| External {
                lit: b.lit,
                truth: if b.weak { TruthValue::True } else { TruthValue::False },
            })
            .collect::<Vec<_>>();
        self.boundaries.clear();
        fixed
    }

    pub fn defer(&mut self, step: usize, formula: FormulaId, guard: Vec<Lit>) {
        log::trace!("defer {:?} to step {}", formula, step);
        self.deferred.entry(step).or_default().push(Deferred { formula, guard });
    }

    pub fn take_deferred(&mut self, step: usize) -> Vec<Deferred> {
        self.deferred.remove(&step).unwrap_or_default()
    }

    /// Number of deferred requirements not yet due.
    pub fn pending(&self) -> usize {
        self.deferred.values().map(|v| v.len()).sum()
    }

    pub fn clear_pending(&mut self) {
        self.deferred.clear();
        self.instances.clear();
    }
}
