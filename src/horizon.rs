//! Incremental unrolling of a staged theory.
//!
//! A [`HorizonManager`] owns one [`Translator`] and grows the horizon one
//! step at a time. Every call to [`HorizonManager::extend_horizon`] returns a
//! [`Batch`] with the rules of the new step and the boundary externals that
//! are still free. Batches are never revisited: later steps only add rules.

use std::fmt::{Display, Formatter};

use crate::arena::FormulaId;
use crate::error::TranslateError;
use crate::formula::Formula;
use crate::frontier::{Carrier, External};
use crate::literal::Lit;
use crate::rule::Rule;
use crate::step::{Stage, Step, StepContext};
use crate::translate::Translator;

/// Formulas attached to program stages, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Theory {
    formulas: Vec<(Stage, Formula)>,
}

impl Theory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, stage: Stage, formula: Formula) {
        self.formulas.push((stage, formula));
    }

    pub fn with(mut self, stage: Stage, formula: Formula) -> Self {
        self.add(stage, formula);
        self
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Stage, Formula)> {
        self.formulas.iter()
    }
}

/// Check the input contract of a formula attached to `stage`.
pub fn validate(stage: Stage, formula: &Formula) -> Result<(), TranslateError> {
    if let Some(path) = formula.malformed_path() {
        return Err(TranslateError::MalformedPathExpression {
            formula: formula.to_string(),
            path: path.to_string(),
        });
    }
    if !stage.licenses_future() && formula.references_future() {
        return Err(TranslateError::StageViolation {
            formula: formula.to_string(),
            stage,
        });
    }
    Ok(())
}

#[derive(Debug, Copy, Clone)]
pub struct HorizonConfig {
    /// Keep a copy of every batch.
    pub record_history: bool,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            record_history: true,
        }
    }
}

/// Output of one horizon extension (or of closing the horizon).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Batch {
    pub step: usize,
    pub rules: Vec<Rule>,
    /// Boundary externals still free after this batch.
    pub externals: Vec<External>,
    /// Externals that became two-valued with this batch.
    pub released: Vec<Lit>,
}

impl Display for Batch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "% step {}", self.step)?;
        for rule in &self.rules {
            writeln!(f, "{}", rule)?;
        }
        for ext in &self.externals {
            writeln!(f, "{}", ext)?;
        }
        for lit in &self.released {
            writeln!(f, "#release {}.", lit)?;
        }
        Ok(())
    }
}

/// Result of an ad-hoc body translation.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Translated {
    pub literal: Lit,
    pub rules: Vec<Rule>,
}

#[derive(Debug)]
pub struct HorizonManager {
    config: HorizonConfig,
    staged: Vec<(Stage, FormulaId)>,
    /// `&final`, if any formula is attached to the final stage.
    final_guard: Option<FormulaId>,
    translator: Translator,
    /// Last unrolled step, if any.
    horizon: Option<Step>,
    history: Vec<Batch>,
}

impl HorizonManager {
    pub fn new(theory: Theory) -> Result<Self, TranslateError> {
        Self::with_config(theory, HorizonConfig::default())
    }

    pub fn with_config(theory: Theory, config: HorizonConfig) -> Result<Self, TranslateError> {
        for (stage, formula) in theory.iter() {
            validate(*stage, formula)?;
        }
        let mut translator = Translator::new();
        let staged = theory
            .iter()
            .map(|(stage, formula)| (*stage, translator.arena_mut().intern(formula)))
            .collect::<Vec<_>>();
        let final_guard = staged
            .iter()
            .any(|&(stage, _)| stage == Stage::Final)
            .then(|| translator.arena_mut().intern(&Formula::Final));
        log::debug!("theory with {} formula(s)", staged.len());
        Ok(Self {
            config,
            staged,
            final_guard,
            translator,
            horizon: None,
            history: Vec::new(),
        })
    }

    pub fn horizon(&self) -> Option<usize> {
        self.horizon.map(|s| s.index())
    }

    pub fn is_closed(&self) -> bool {
        self.horizon.is_some_and(|s| s.is_final())
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn history(&self) -> &[Batch] {
        &self.history
    }

    pub fn carriers(&self) -> &[Carrier] {
        self.translator.carriers()
    }

    /// Boundary externals that are currently free.
    pub fn open_externals(&self) -> Vec<External> {
        self.translator.open_externals()
    }

    /// Assumptions under which the current edge behaves as the last step:
    /// strong next references false, weak ones true.
    pub fn closing_assumptions(&self) -> Vec<Lit> {
        self.translator.closing_assumptions()
    }

    /// Allocate an atom for the host, e.g. to [`bind`](Self::bind) later.
    pub fn new_literal(&mut self) -> Lit {
        self.translator.fresh()
    }

    /// Name of a ground atom as `name(args)@step`, if `atom` is one.
    pub fn describe(&self, atom: u32) -> Option<String> {
        let key = self.translator.symbols().owner(atom)?;
        let formula = self.translator.arena().to_formula(key.formula);
        Some(format!("{}@{}", formula, key.step))
    }

    fn context(&self, stage: Stage) -> Result<StepContext, TranslateError> {
        match self.horizon {
            Some(edge) => Ok(StepContext::new(edge.index(), edge.is_final(), stage)),
            None => Err(TranslateError::OutOfWindow {
                step: 0,
                horizon: None,
            }),
        }
    }

    fn record(&mut self, batch: &Batch) {
        if self.config.record_history {
            self.history.push(batch.clone());
        }
    }

    /// Unroll the next step.
    pub fn extend_horizon(&mut self) -> Result<Batch, TranslateError> {
        if let Some(edge) = self.horizon.filter(|s| s.is_final()) {
            return Err(TranslateError::HorizonClosed { last: edge.index() });
        }
        let step = Step::new(self.horizon.map_or(0, |s| s.index() + 1));
        let k = step.index();
        log::debug!("extend horizon to step {}", k);
        let ctx = StepContext::new(k, false, Stage::Always);

        let released = self.translator.resolve_boundaries(&ctx, k)?;
        self.translator.run_deferred(&ctx, k)?;
        self.translator.advance_instances(&ctx, k)?;
        for &(stage, id) in &self.staged {
            if stage != Stage::Final && step.stages().contains(stage) {
                self.translator.require(&ctx.with_stage(stage), id, k, &[])?;
            }
        }
        // final formulas hold here once this step turns out to be the last
        if let Some(last) = self.final_guard {
            let guard = self.translator.translate(&ctx, last, k)?;
            for &(stage, id) in &self.staged {
                if stage == Stage::Final {
                    self.translator.require(&ctx.with_stage(stage), id, k, &[guard])?;
                }
            }
        }

        self.horizon = Some(step);
        let batch = Batch {
            step: k,
            rules: self.translator.take_rules(),
            externals: self.translator.open_externals(),
            released,
        };
        log::debug!(
            "step {}: {} rule(s), {} open external(s), {} released",
            k,
            batch.rules.len(),
            batch.externals.len(),
            batch.released.len()
        );
        self.record(&batch);
        Ok(batch)
    }

    /// Close the horizon at `step`, which must be the current edge.
    ///
    /// Final-stage formulas were already required at every step under
    /// `&final`; they are required once more without the guard, and fixing
    /// the boundary externals settles the guarded copies.
    pub fn mark_final(&mut self, step: usize) -> Result<Batch, TranslateError> {
        let edge = match self.horizon {
            Some(edge) if edge.is_final() => {
                return Err(TranslateError::HorizonClosed { last: edge.index() })
            }
            Some(edge) if edge.index() == step => edge.finalize(),
            horizon => {
                return Err(TranslateError::NotAtFrontier {
                    step,
                    horizon: horizon.map(|s| s.index()),
                })
            }
        };
        log::debug!("close horizon at step {}", step);
        let ctx = StepContext::new(step, true, Stage::Final);

        for &(stage, id) in &self.staged {
            if stage == Stage::Final {
                self.translator.require(&ctx, id, step, &[])?;
            }
        }
        let fixed = self.translator.close();
        self.horizon = Some(edge);

        let open = self.translator.open_externals();
        if !open.is_empty() {
            return Err(TranslateError::UnresolvedExternalAtClose {
                count: open.len(),
                last: step,
            });
        }
        let batch = Batch {
            step,
            rules: self.translator.take_rules(),
            externals: Vec::new(),
            released: fixed.iter().map(|e| e.lit).collect(),
        };
        self.record(&batch);
        Ok(batch)
    }

    /// Literal equivalent to `formula` at an unrolled `step`.
    pub fn translate(&mut self, formula: &Formula, step: usize) -> Result<Translated, TranslateError> {
        validate(Stage::Always, formula)?;
        let ctx = self.context(Stage::Always)?;
        ctx.check(step)?;
        let id = self.translator.arena_mut().intern(formula);
        let literal = self.translator.translate(&ctx, id, step)?;
        Ok(Translated {
            literal,
            rules: self.translator.take_rules(),
        })
    }

    /// Rules enforcing `formula` at an unrolled `step`.
    pub fn require(&mut self, formula: &Formula, step: usize) -> Result<Vec<Rule>, TranslateError> {
        validate(Stage::Always, formula)?;
        let ctx = self.context(Stage::Always)?;
        ctx.check(step)?;
        let id = self.translator.arena_mut().intern(formula);
        self.translator.require(&ctx, id, step, &[])?;
        Ok(self.translator.take_rules())
    }

    /// Make the host literal `host` the representative of `formula` at
    /// `step`. Must happen before the pair is first translated.
    ///
    /// Returns the rules tying `host` to an atom right away; for composite
    /// formulas the ties are emitted with the translation.
    pub fn bind(&mut self, formula: &Formula, step: usize, host: Lit) -> Result<Vec<Rule>, TranslateError> {
        validate(Stage::Always, formula)?;
        let id = self.translator.arena_mut().intern(formula);
        self.translator.bind(id, step, host)?;
        Ok(self.translator.take_rules())
    }
}
