//! The clausal compiler.
//!
//! Two entry points share one equivalence cache:
//!
//! - [`Translator::translate`] (body mode) returns a literal that is
//!   classically equivalent to a formula at a step. Every composite literal
//!   is a free choice atom pinned down by integrity constraints.
//! - [`Translator::require`] (head mode) emits rules that make a formula
//!   hold, deriving atoms where the shape of the formula allows it.
//!
//! Rules only ever mention the current, the previous and the next step, so
//! the horizon grows without revisiting emitted steps. References past the
//! horizon edge become boundary externals (body mode) or deferred
//! requirements (head mode).

use std::collections::HashSet;

use crate::arena::{Arena, FormulaId, Node, PathId, PathNode};
use crate::cache::{EquivalenceCache, Key};
use crate::error::TranslateError;
use crate::formula::{BinaryOp, Modality, TemporalOp};
use crate::frontier::{Carrier, External, Frontier, Instance, TruthValue};
use crate::literal::{Allocator, Lit};
use crate::rule::{make_disjunction, make_equal, Rule};
use crate::step::{Stage, StepContext, Target};
use crate::symbols::SymbolTable;

#[derive(Debug)]
pub struct Translator {
    arena: Arena,
    cache: EquivalenceCache,
    alloc: Allocator,
    symbols: SymbolTable,
    frontier: Frontier,
    carriers: Vec<Carrier>,
    /// Head requirements already emitted, with their sorted guards.
    required: HashSet<(FormulaId, usize, Vec<Lit>)>,
    rules: Vec<Rule>,
    false_lit: Lit,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        let mut alloc = Allocator::new();
        // never derived
        let false_lit = alloc.fresh();
        Self {
            arena: Arena::new(),
            cache: EquivalenceCache::new(),
            alloc,
            symbols: SymbolTable::new(),
            frontier: Frontier::default(),
            carriers: Vec::new(),
            required: HashSet::new(),
            rules: Vec::new(),
            false_lit,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn cache(&self) -> &EquivalenceCache {
        &self.cache
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn carriers(&self) -> &[Carrier] {
        &self.carriers
    }

    pub fn false_lit(&self) -> Lit {
        self.false_lit
    }

    pub fn true_lit(&self) -> Lit {
        -self.false_lit
    }

    /// Allocate an atom owned by the caller.
    pub fn fresh(&mut self) -> Lit {
        self.alloc.fresh()
    }

    pub fn num_atoms(&self) -> usize {
        self.alloc.len()
    }

    /// Drain the rules emitted since the last call.
    pub fn take_rules(&mut self) -> Vec<Rule> {
        std::mem::take(&mut self.rules)
    }

    pub fn open_externals(&self) -> Vec<External> {
        self.frontier.open_externals()
    }

    pub fn closing_assumptions(&self) -> Vec<Lit> {
        self.frontier.closing_assumptions()
    }

    /// Number of deferred head requirements.
    pub fn pending(&self) -> usize {
        self.frontier.pending()
    }

    fn constant(&self, value: bool) -> Lit {
        if value {
            self.true_lit()
        } else {
            self.false_lit
        }
    }

    fn emit(&mut self, mut rule: Rule) {
        if rule.body.contains(&self.false_lit) {
            return;
        }
        let t = self.true_lit();
        rule.body.retain(|&l| l != t);
        log::trace!("emit {}", rule);
        self.rules.push(rule);
    }

    fn emit_all(&mut self, rules: impl IntoIterator<Item = Rule>) {
        for rule in rules {
            self.emit(rule);
        }
    }

    fn describe(&self, id: FormulaId) -> String {
        self.arena.to_formula(id).to_string()
    }

    fn resolve(
        &self,
        ctx: &StepContext,
        id: FormulaId,
        step: usize,
        offset: isize,
    ) -> Result<Target, TranslateError> {
        ctx.resolve(step, offset).map_err(|e| match e {
            TranslateError::StageViolation { stage, .. } => TranslateError::StageViolation {
                formula: self.describe(id),
                stage,
            },
            e => e,
        })
    }

    /// Literal of a ground atom at a step.
    fn atom(&mut self, id: FormulaId, step: usize) -> Lit {
        let key = Key::new(id, step);
        if let Some(lit) = self.symbols.get(&key) {
            return lit;
        }
        let lit = self.alloc.fresh();
        self.symbols.insert(key, lit);
        log::trace!("atom {} at step {} -> {}", self.describe(id), step, lit);

        let complement = match self.arena.node(id) {
            Node::Atom {
                name,
                args,
                positive,
            } => Some(Node::Atom {
                name: name.clone(),
                args: args.clone(),
                positive: !positive,
            }),
            _ => None,
        };
        let other = complement
            .and_then(|node| self.arena.find(&node))
            .and_then(|c| self.symbols.get(&Key::new(c, step)));
        if let Some(other) = other {
            // `p` and `-p` exclude each other
            self.emit(Rule::constraint([lit, other]));
        }
        lit
    }

    /// Allocate the choice atom defining `key`.
    fn allocate(&mut self, key: &Key) -> Lit {
        let (lit, is_new) = self.cache.get_or_create(key, &mut self.alloc);
        debug_assert!(is_new, "{:?} should not be allocated twice", key);
        self.emit(Rule::choice(lit.atom()));
        lit
    }

    /// Make `key` share `lit`, tying a bound host literal to it.
    fn share(&mut self, key: &Key, lit: Lit) -> Lit {
        let (rep, bound) = self.cache.share(key, lit);
        if bound {
            self.emit(Rule::choice(rep.atom()));
            self.emit_all(make_equal(rep, lit));
        }
        rep
    }

    /// Literal for "a next step exists" at `step`.
    ///
    /// Allowed under every stage: it asks about the trace, not about a formula.
    fn has_next(&mut self, ctx: &StepContext, step: usize) -> Result<Lit, TranslateError> {
        let t = self.arena.mk_bool(true);
        let next = self.arena.mk_next(t, false);
        self.translate(&ctx.with_stage(Stage::Always), next, step)
    }

    /// Reserve the host literal `host` as the representative of `id` at `step`.
    pub fn bind(&mut self, id: FormulaId, step: usize, host: Lit) -> Result<(), TranslateError> {
        if host.is_negated() {
            return Err(TranslateError::NegativeHostLiteral { lit: host });
        }
        let key = Key::new(id, step);
        if !self.cache.bind(&key, host) {
            return Err(TranslateError::LateBinding {
                formula: self.describe(id),
                step,
            });
        }
        if let Node::Atom { .. } = self.arena.node(id) {
            // atoms never enter the cache through translation, tie right away
            let lit = self.atom(id, step);
            self.share(&key, lit);
        }
        Ok(())
    }
}

// Body mode
impl Translator {
    /// Literal equivalent to `id` at `step`.
    pub fn translate(
        &mut self,
        ctx: &StepContext,
        id: FormulaId,
        step: usize,
    ) -> Result<Lit, TranslateError> {
        ctx.check(step)?;
        let node = self.arena.node(id).clone();
        if let Node::Atom { .. } = node {
            return Ok(self.atom(id, step));
        }
        let key = Key::new(id, step);
        if let Some(lit) = self.cache.get(&key) {
            log::trace!("cache hit {:?} at step {} -> {}", id, step, lit);
            return Ok(lit);
        }

        let lit = match node {
            Node::Atom { .. } => self.atom(id, step),
            Node::Bool(value) => {
                let c = self.constant(value);
                self.share(&key, c)
            }
            Node::Initial => {
                let c = self.constant(step == 0);
                self.share(&key, c)
            }
            Node::Final => {
                let lit = if ctx.is_last(step) {
                    self.true_lit()
                } else if step < ctx.horizon() {
                    self.false_lit
                } else {
                    -self.has_next(ctx, step)?
                };
                self.share(&key, lit)
            }
            Node::Not(arg) => {
                let lit = self.translate(ctx, arg, step)?;
                self.share(&key, -lit)
            }
            Node::Binary(op, lhs, rhs) => {
                let a = self.translate(ctx, lhs, step)?;
                let b = self.translate(ctx, rhs, step)?;
                let x = self.allocate(&key);
                match op {
                    BinaryOp::Or => self.emit_all(make_disjunction(x, a, b)),
                    BinaryOp::And => self.emit_all(make_disjunction(-x, -a, -b)),
                    BinaryOp::Implies => self.emit_all(make_disjunction(x, -a, b)),
                    BinaryOp::Implied => self.emit_all(make_disjunction(x, a, -b)),
                    BinaryOp::Equiv => self.emit_all([
                        Rule::constraint([x, a, -b]),
                        Rule::constraint([x, -a, b]),
                        Rule::constraint([-x, a, b]),
                        Rule::constraint([-x, -a, -b]),
                    ]),
                }
                x
            }
            Node::Previous(arg, weak) => {
                let lit = match self.resolve(ctx, id, step, -1)? {
                    Target::Step(k) => self.translate(ctx, arg, k)?,
                    // closed initial state
                    _ => self.constant(weak),
                };
                self.share(&key, lit)
            }
            Node::Next(arg, weak) => match self.resolve(ctx, id, step, 1)? {
                Target::Step(k) => {
                    let lit = self.translate(ctx, arg, k)?;
                    self.share(&key, lit)
                }
                Target::Pending(k) => {
                    let (lit, _) = self.cache.get_or_create(&key, &mut self.alloc);
                    self.frontier.open(lit, arg, k, weak);
                    lit
                }
                Target::Closed | Target::Saturated => {
                    let c = self.constant(weak);
                    self.share(&key, c)
                }
            },
            Node::Initially(arg) => {
                let lit = self.translate(ctx, arg, 0)?;
                self.share(&key, lit)
            }
            Node::Temporal(op, lhs, rhs) => self.translate_temporal(ctx, &key, op, lhs, rhs)?,
            Node::Dynamic(modality, path, arg) => {
                if !self.arena.is_normal_form(path) {
                    return Err(TranslateError::MalformedPathExpression {
                        formula: self.describe(id),
                        path: self.arena.to_path(path).to_string(),
                    });
                }
                let expansion = self.expand(id, modality, path, arg);
                let lit = self.translate(ctx, expansion, step)?;
                self.share(&key, lit)
            }
        };
        log::trace!("{:?} at step {} -> {}", id, step, lit);
        Ok(lit)
    }

    /// Since and until hold iff `rhs | (lhs & pre)`; trigger and release iff
    /// `rhs & (lhs | pre)`, where `pre` is the formula itself at the adjacent
    /// step.
    fn translate_temporal(
        &mut self,
        ctx: &StepContext,
        key: &Key,
        op: TemporalOp,
        lhs: Option<FormulaId>,
        rhs: FormulaId,
    ) -> Result<Lit, TranslateError> {
        let step = key.step;
        let r = self.translate(ctx, rhs, step)?;
        let pre = if op.is_future() {
            let next = self.arena.mk_next(key.formula, op.is_greatest());
            self.translate(ctx, next, step)?
        } else {
            match self.resolve(ctx, key.formula, step, -1)? {
                Target::Step(k) => self.translate(ctx, key.formula, k)?,
                _ => return Ok(self.share(key, r)),
            }
        };
        let l = match lhs {
            Some(lhs) => self.translate(ctx, lhs, step)?,
            None => self.constant(!op.is_greatest()),
        };

        let x = self.allocate(key);
        if op.is_greatest() {
            self.emit_all([
                Rule::constraint([x, -r]),
                Rule::constraint([x, -l, -pre]),
                Rule::constraint([-x, r, l]),
                Rule::constraint([-x, r, pre]),
            ]);
        } else {
            self.emit_all([
                Rule::constraint([x, -r, -l]),
                Rule::constraint([x, -r, -pre]),
                Rule::constraint([-x, r]),
                Rule::constraint([-x, l, pre]),
            ]);
        }
        Ok(x)
    }

    /// One unfolding of a dynamic formula over the head of its path.
    fn expand(&mut self, id: FormulaId, modality: Modality, path: PathId, arg: FormulaId) -> FormulaId {
        let diamond = modality == Modality::Diamond;
        let (junction, guard) = if diamond {
            (BinaryOp::Or, BinaryOp::And)
        } else {
            (BinaryOp::And, BinaryOp::Implies)
        };
        match self.arena.path(path) {
            PathNode::Skip => self.arena.mk_next(arg, !diamond),
            PathNode::Test(test) => self.arena.mk_binary(guard, test, arg),
            PathNode::Sequence(first, second) => {
                let rest = self.arena.mk_dynamic(modality, second, arg);
                self.arena.mk_dynamic(modality, first, rest)
            }
            PathNode::Choice(lhs, rhs) => {
                let lhs = self.arena.mk_dynamic(modality, lhs, arg);
                let rhs = self.arena.mk_dynamic(modality, rhs, arg);
                self.arena.mk_binary(junction, lhs, rhs)
            }
            PathNode::Star(body) => {
                let again = self.arena.mk_dynamic(modality, body, id);
                self.arena.mk_binary(junction, arg, again)
            }
        }
    }
}

// Head mode
impl Translator {
    /// Emit rules enforcing `id` at `step` whenever all of `guard` hold.
    pub fn require(
        &mut self,
        ctx: &StepContext,
        id: FormulaId,
        step: usize,
        guard: &[Lit],
    ) -> Result<(), TranslateError> {
        ctx.check(step)?;
        if guard.contains(&self.false_lit) {
            return Ok(());
        }
        let t = self.true_lit();
        let mut guard = guard.iter().copied().filter(|&l| l != t).collect::<Vec<_>>();
        guard.sort();
        guard.dedup();
        if !self.required.insert((id, step, guard.clone())) {
            return Ok(());
        }

        match self.arena.node(id).clone() {
            Node::Atom { .. } => {
                let a = self.atom(id, step);
                self.emit(Rule::normal(a.atom(), guard));
            }
            Node::Bool(true) => {}
            Node::Bool(false) => self.emit(Rule::constraint(guard)),
            Node::Binary(BinaryOp::And, lhs, rhs) => {
                self.require(ctx, lhs, step, &guard)?;
                self.require(ctx, rhs, step, &guard)?;
            }
            Node::Binary(BinaryOp::Or, ..) => self.require_disjunction(ctx, id, step, guard)?,
            Node::Binary(BinaryOp::Implies, lhs, rhs) => {
                guard.push(self.translate(ctx, lhs, step)?);
                self.require(ctx, rhs, step, &guard)?;
            }
            Node::Binary(BinaryOp::Implied, lhs, rhs) => {
                guard.push(self.translate(ctx, rhs, step)?);
                self.require(ctx, lhs, step, &guard)?;
            }
            Node::Not(arg) => {
                guard.push(self.translate(ctx, arg, step)?);
                self.emit(Rule::constraint(guard));
            }
            Node::Next(arg, weak) => match self.resolve(ctx, id, step, 1)? {
                Target::Step(k) => self.require(ctx, arg, k, &guard)?,
                Target::Pending(k) => {
                    if !weak {
                        let next = self.has_next(ctx, step)?;
                        let mut body = guard.clone();
                        body.push(-next);
                        self.emit(Rule::constraint(body));
                    }
                    self.frontier.defer(k, arg, guard);
                }
                Target::Closed | Target::Saturated => {
                    if !weak {
                        self.emit(Rule::constraint(guard));
                    }
                }
            },
            Node::Temporal(TemporalOp::Release, None, arg) => {
                // no carrier: `a` now, and `>* a` again at the next step
                self.require(ctx, arg, step, &guard)?;
                let next = self.arena.mk_next(id, true);
                self.require(ctx, next, step, &guard)?;
            }
            Node::Temporal(op @ (TemporalOp::Until | TemporalOp::Release), lhs, rhs) => {
                self.start_instance(ctx, id, (op, lhs, rhs), step, guard)?;
            }
            _ => {
                let x = self.translate(ctx, id, step)?;
                guard.push(-x);
                self.emit(Rule::constraint(guard));
            }
        }
        Ok(())
    }

    /// Atoms go into a disjunctive head, everything else is shifted into
    /// the body as a negative literal.
    fn require_disjunction(
        &mut self,
        ctx: &StepContext,
        id: FormulaId,
        step: usize,
        guard: Vec<Lit>,
    ) -> Result<(), TranslateError> {
        let mut disjuncts = Vec::new();
        let mut stack = vec![id];
        while let Some(f) = stack.pop() {
            match self.arena.node(f) {
                Node::Binary(BinaryOp::Or, lhs, rhs) => {
                    stack.push(*rhs);
                    stack.push(*lhs);
                }
                _ => disjuncts.push(f),
            }
        }

        let mut head = Vec::new();
        let mut body = guard;
        for d in disjuncts {
            match self.arena.node(d) {
                Node::Atom { .. } => head.push(self.atom(d, step).atom()),
                Node::Bool(true) => return Ok(()),
                Node::Bool(false) => {}
                _ => body.push(-self.translate(ctx, d, step)?),
            }
        }
        self.emit(Rule::disjunctive(head, body));
        Ok(())
    }

    fn start_instance(
        &mut self,
        ctx: &StepContext,
        id: FormulaId,
        (op, lhs, rhs): (TemporalOp, Option<FormulaId>, FormulaId),
        step: usize,
        guard: Vec<Lit>,
    ) -> Result<(), TranslateError> {
        log::debug!("unroll {} from step {}", self.describe(id), step);
        let mut instance = Instance {
            formula: id,
            op,
            lhs,
            rhs,
            guard,
            origin: step,
            last: step,
            carrier: None,
        };
        for t in step..=ctx.horizon() {
            self.advance(ctx, &mut instance, t)?;
        }
        self.frontier.instances.push(instance);
        Ok(())
    }

    /// Emit the requirements of `instance` at `step` and its carrier there.
    ///
    /// For until the carrier records that `rhs` was witnessed; for release,
    /// that `lhs` released the obligation. Either way it has exactly two
    /// defining rules: carry-forward and the witness at this step.
    fn advance(
        &mut self,
        ctx: &StepContext,
        instance: &mut Instance,
        step: usize,
    ) -> Result<(), TranslateError> {
        let mut guard = instance.guard.clone();
        if let Some(c) = instance.carrier {
            guard.push(-c);
        }

        let witness = match instance.op {
            TemporalOp::Until => {
                if let Some(lhs) = instance.lhs {
                    let either = self.arena.mk_binary(BinaryOp::Or, lhs, instance.rhs);
                    self.require(ctx, either, step, &guard)?;
                }
                let next = self.has_next(ctx, step)?;
                let mut last = guard.clone();
                last.push(-next);
                self.require(ctx, instance.rhs, step, &last)?;
                self.translate(ctx, instance.rhs, step)?
            }
            _ => {
                self.require(ctx, instance.rhs, step, &guard)?;
                match instance.lhs {
                    Some(lhs) => self.translate(ctx, lhs, step)?,
                    None => self.false_lit,
                }
            }
        };

        let c = self.alloc.fresh();
        if let Some(prev) = instance.carrier {
            self.emit(Rule::normal(c.atom(), [prev]));
        }
        self.emit(Rule::normal(c.atom(), [witness]));
        log::trace!("carrier {} for {:?} at step {}", c, instance.formula, step);
        self.carriers.push(Carrier {
            formula: instance.formula,
            origin: instance.origin,
            step,
            lit: c,
        });
        instance.carrier = Some(c);
        instance.last = step;
        Ok(())
    }
}

// Horizon edge
impl Translator {
    /// Tie every boundary external targeting `step` to the literal of its
    /// argument there. Returns the released externals.
    pub fn resolve_boundaries(
        &mut self,
        ctx: &StepContext,
        step: usize,
    ) -> Result<Vec<Lit>, TranslateError> {
        let mut released = Vec::new();
        for b in self.frontier.take_due(step) {
            let lit = self.translate(ctx, b.arg, step)?;
            log::debug!("close boundary external {} with {} at step {}", b.lit, lit, step);
            self.emit(Rule::normal(b.lit.atom(), [lit]));
            released.push(b.lit);
        }
        Ok(released)
    }

    /// Run the head requirements deferred to `step`.
    pub fn run_deferred(&mut self, ctx: &StepContext, step: usize) -> Result<(), TranslateError> {
        for d in self.frontier.take_deferred(step) {
            self.require(ctx, d.formula, step, &d.guard)?;
        }
        Ok(())
    }

    /// Unroll every until/release instance to `step`.
    pub fn advance_instances(&mut self, ctx: &StepContext, step: usize) -> Result<(), TranslateError> {
        let mut i = 0;
        // instances started meanwhile are already at `step`
        while i < self.frontier.instances.len() {
            if self.frontier.instances[i].last < step {
                let mut instance = self.frontier.instances[i].clone();
                self.advance(ctx, &mut instance, step)?;
                self.frontier.instances[i] = instance;
            }
            i += 1;
        }
        Ok(())
    }

    /// Fix all open boundary externals for a closed horizon and drop
    /// everything that waits for a later step.
    pub fn close(&mut self) -> Vec<External> {
        let fixed = self.frontier.fix_open();
        for ext in &fixed {
            log::debug!("fix boundary external {} to {}", ext.lit, ext.truth);
            if ext.truth == TruthValue::True {
                self.emit(Rule::fact(ext.lit.atom()));
            }
        }
        self.frontier.clear_pending();
        fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Formula;
    use crate::path::Path;
    use crate::step::Stage;
    use test_log::test;

    fn open(horizon: usize) -> StepContext {
        StepContext::new(horizon, false, Stage::Always)
    }

    #[test]
    fn test_translate_is_idempotent() {
        let mut tr = Translator::new();
        let f = tr
            .arena_mut()
            .intern(&Formula::and(Formula::atom("a"), Formula::previous(Formula::atom("b"))));
        let ctx = open(1);
        let x = tr.translate(&ctx, f, 1).unwrap();
        let first = tr.take_rules();
        assert!(!first.is_empty());
        let y = tr.translate(&ctx, f, 1).unwrap();
        assert_eq!(x, y);
        assert!(tr.take_rules().is_empty());
    }

    #[test]
    fn test_and_clauses() {
        let mut tr = Translator::new();
        let f = tr
            .arena_mut()
            .intern(&Formula::and(Formula::atom("a"), Formula::atom("b")));
        let x = tr.translate(&open(0), f, 0).unwrap();
        let rules = tr.take_rules();
        for r in &rules {
            println!("{}", r);
        }
        assert_eq!(rules[0], Rule::choice(x.atom()));
        assert_eq!(rules.len(), 4);
    }

    #[test]
    fn test_previous_saturates_at_initial_step() {
        let mut tr = Translator::new();
        let strong = tr.arena_mut().intern(&Formula::previous(Formula::atom("a")));
        let weak = tr.arena_mut().intern(&Formula::weak_previous(Formula::atom("a")));
        let ctx = open(0);
        assert_eq!(tr.translate(&ctx, strong, 0).unwrap(), tr.false_lit());
        assert_eq!(tr.translate(&ctx, weak, 0).unwrap(), tr.true_lit());
    }

    #[test]
    fn test_previous_shares_literal() {
        let mut tr = Translator::new();
        let a = tr.arena_mut().intern(&Formula::atom("a"));
        let prev = tr.arena_mut().intern(&Formula::previous(Formula::atom("a")));
        let ctx = open(2);
        let a1 = tr.translate(&ctx, a, 1).unwrap();
        assert_eq!(tr.translate(&ctx, prev, 2).unwrap(), a1);
        assert!(tr.take_rules().is_empty());
    }

    #[test]
    fn test_next_at_edge_opens_external() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::next(Formula::atom("a")));
        let e = tr.translate(&open(0), f, 0).unwrap();
        assert_eq!(
            tr.open_externals(),
            vec![External {
                lit: e,
                truth: TruthValue::Free
            }]
        );
        assert_eq!(tr.closing_assumptions(), vec![-e]);

        let ctx = open(1);
        let released = tr.resolve_boundaries(&ctx, 1).unwrap();
        assert_eq!(released, vec![e]);
        assert!(tr.open_externals().is_empty());
        // the external stays the representative of `>a` at step 0
        assert_eq!(tr.translate(&ctx, f, 0).unwrap(), e);
        let rules = tr.take_rules();
        assert!(rules.iter().any(|r| r.head == vec![e.atom()] && r.body.len() == 1));
    }

    #[test]
    fn test_closed_horizon_next_is_constant() {
        let mut tr = Translator::new();
        let strong = tr.arena_mut().intern(&Formula::next(Formula::atom("a")));
        let weak = tr.arena_mut().intern(&Formula::weak_next(Formula::atom("a")));
        let ctx = StepContext::new(1, true, Stage::Always);
        assert_eq!(tr.translate(&ctx, strong, 1).unwrap(), tr.false_lit());
        assert_eq!(tr.translate(&ctx, weak, 1).unwrap(), tr.true_lit());
    }

    #[test]
    fn test_final_stage_rejects_next() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::next(Formula::atom("a")));
        let ctx = StepContext::new(1, true, Stage::Final);
        let err = tr.translate(&ctx, f, 1).unwrap_err();
        assert_eq!(
            err,
            TranslateError::StageViolation {
                formula: "(>a)".to_string(),
                stage: Stage::Final
            }
        );
    }

    #[test]
    fn test_malformed_path_is_rejected() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::diamond(
            Path::star(Path::test(Formula::atom("a"))),
            Formula::atom("b"),
        ));
        let err = tr.translate(&open(0), f, 0).unwrap_err();
        assert!(matches!(err, TranslateError::MalformedPathExpression { .. }));
    }

    #[test]
    fn test_require_always_has_no_carrier() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::always(Formula::atom("a")));
        tr.require(&open(0), f, 0, &[]).unwrap();
        let rules = tr.take_rules();
        assert_eq!(rules.len(), 1);
        assert!(rules[0].body.is_empty());
        assert_eq!(rules[0].head.len(), 1);
        assert!(tr.carriers().is_empty());
        assert_eq!(tr.pending(), 1);
    }

    #[test]
    fn test_require_disjunction_shifts_non_atoms() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::or(
            Formula::atom("a"),
            Formula::or(Formula::atom("b"), Formula::previous(Formula::atom("c"))),
        ));
        tr.require(&open(1), f, 1, &[]).unwrap();
        let rules = tr.take_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].head.len(), 2);
        assert_eq!(rules[0].negative_body().count(), 1);
    }

    #[test]
    fn test_require_is_deduplicated() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::atom("a"));
        tr.require(&open(0), f, 0, &[]).unwrap();
        tr.require(&open(0), f, 0, &[]).unwrap();
        assert_eq!(tr.take_rules().len(), 1);
    }

    #[test]
    fn test_eventually_carrier_has_two_rules() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::eventually(Formula::atom("a")));
        tr.require(&open(0), f, 0, &[]).unwrap();
        tr.take_rules();
        let ctx = open(1);
        tr.resolve_boundaries(&ctx, 1).unwrap();
        tr.advance_instances(&ctx, 1).unwrap();
        let rules = tr.take_rules();
        let c1 = tr.carriers()[1].lit;
        let defining = rules.iter().filter(|r| r.head == vec![c1.atom()]).count();
        assert_eq!(defining, 2);
        assert_eq!(tr.carriers()[1].step, 1);
        assert_eq!(tr.carriers()[1].origin, 0);
    }

    #[test]
    fn test_bind_after_translation_fails() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::once(Formula::atom("a")));
        tr.translate(&open(0), f, 0).unwrap();
        let host = tr.fresh();
        assert!(matches!(
            tr.bind(f, 0, host),
            Err(TranslateError::LateBinding { step: 0, .. })
        ));
    }

    #[test]
    fn test_bind_rejects_negated_host() {
        let mut tr = Translator::new();
        let f = tr.arena_mut().intern(&Formula::once(Formula::atom("a")));
        let host = tr.fresh();
        assert_eq!(
            tr.bind(f, 0, -host),
            Err(TranslateError::NegativeHostLiteral { lit: -host })
        );
        // nothing was reserved
        tr.bind(f, 0, host).unwrap();
        assert_eq!(tr.translate(&open(0), f, 0).unwrap(), host);
    }

    #[test]
    fn test_bound_literal_is_representative() {
        let mut tr = Translator::new();
        let f = tr
            .arena_mut()
            .intern(&Formula::or(Formula::atom("a"), Formula::atom("b")));
        let host = tr.fresh();
        tr.bind(f, 0, host).unwrap();
        assert_eq!(tr.translate(&open(0), f, 0).unwrap(), host);
    }

    #[test]
    fn test_complementary_atoms_exclude_each_other() {
        let mut tr = Translator::new();
        let p = tr.arena_mut().intern(&Formula::atom("p"));
        let q = tr.arena_mut().intern(&Formula::neg_atom("p", []));
        let ctx = open(0);
        let lp = tr.translate(&ctx, p, 0).unwrap();
        let lq = tr.translate(&ctx, q, 0).unwrap();
        assert_eq!(tr.take_rules(), vec![Rule::constraint([lq, lp])]);
    }
}
