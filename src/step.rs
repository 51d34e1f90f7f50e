//! Steps, program stages, and resolution of shifted step references.

use std::fmt;

use crate::error::TranslateError;

/// Program stage a formula is attached to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    /// Step 0 only.
    Initial,
    /// Every step after 0.
    Dynamic,
    /// Every step.
    Always,
    /// The last step, once the horizon is closed.
    Final,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Initial, Stage::Dynamic, Stage::Always, Stage::Final];

    fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Whether formulas of this stage may look at later steps.
    pub fn licenses_future(self) -> bool {
        self != Stage::Final
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Initial => "initial",
            Stage::Dynamic => "dynamic",
            Stage::Always => "always",
            Stage::Final => "final",
        };
        write!(f, "{}", name)
    }
}

/// Set of stages a step belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Hash)]
pub struct StageSet(u8);

impl StageSet {
    pub fn contains(self, stage: Stage) -> bool {
        self.0 & stage.bit() != 0
    }

    pub fn with(self, stage: Stage) -> Self {
        StageSet(self.0 | stage.bit())
    }

    pub fn iter(self) -> impl Iterator<Item = Stage> {
        Stage::ALL.into_iter().filter(move |&s| self.contains(s))
    }
}

/// One unrolled time point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Step {
    index: usize,
    stages: StageSet,
}

impl Step {
    pub fn new(index: usize) -> Self {
        let mut stages = StageSet::default().with(Stage::Always);
        stages = if index == 0 {
            stages.with(Stage::Initial)
        } else {
            stages.with(Stage::Dynamic)
        };
        Step { index, stages }
    }

    pub fn index(self) -> usize {
        self.index
    }

    pub fn stages(self) -> StageSet {
        self.stages
    }

    /// Tag the step as the last one of the trace.
    pub fn finalize(self) -> Self {
        Step {
            index: self.index,
            stages: self.stages.with(Stage::Final),
        }
    }

    pub fn is_final(self) -> bool {
        self.stages.contains(Stage::Final)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.index)
    }
}

/// Where a shifted reference lands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Target {
    /// An unrolled step.
    Step(usize),
    /// Before step 0; saturated to step 0.
    Saturated,
    /// A future step that is not unrolled yet.
    Pending(usize),
    /// Past the last step of a closed horizon; it will never exist.
    Closed,
}

/// The view of the horizon a translation runs against.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct StepContext {
    horizon: usize,
    closed: bool,
    stage: Stage,
}

impl StepContext {
    pub fn new(horizon: usize, closed: bool, stage: Stage) -> Self {
        StepContext {
            horizon,
            closed,
            stage,
        }
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn with_stage(self, stage: Stage) -> Self {
        StepContext { stage, ..self }
    }

    /// Whether `step` is the last step of a closed horizon.
    pub fn is_last(&self, step: usize) -> bool {
        self.closed && step == self.horizon
    }

    /// Fails if `step` is not an unrolled step.
    pub fn check(&self, step: usize) -> Result<(), TranslateError> {
        if step > self.horizon {
            return Err(TranslateError::OutOfWindow {
                step,
                horizon: Some(self.horizon),
            });
        }
        Ok(())
    }

    /// Resolve the reference `offset` steps away from `step`.
    pub fn resolve(&self, step: usize, offset: isize) -> Result<Target, TranslateError> {
        self.check(step)?;
        if offset > 0 && !self.stage.licenses_future() {
            return Err(TranslateError::StageViolation {
                formula: format!("reference {} step(s) ahead of step {}", offset, step),
                stage: self.stage,
            });
        }
        let target = step as isize + offset;
        if target < 0 {
            return Ok(Target::Saturated);
        }
        let target = target as usize;
        if target <= self.horizon {
            Ok(Target::Step(target))
        } else if self.closed {
            Ok(Target::Closed)
        } else {
            Ok(Target::Pending(target))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_stages() {
        let s0 = Step::new(0);
        assert!(s0.stages().contains(Stage::Initial));
        assert!(s0.stages().contains(Stage::Always));
        assert!(!s0.stages().contains(Stage::Dynamic));
        let s3 = Step::new(3);
        assert_eq!(s3.stages().iter().collect::<Vec<_>>(), vec![Stage::Dynamic, Stage::Always]);
        assert!(!s3.is_final());
        assert!(s3.finalize().is_final());
    }

    #[test]
    fn test_resolve_window() {
        let ctx = StepContext::new(2, false, Stage::Always);
        assert_eq!(ctx.resolve(1, 1), Ok(Target::Step(2)));
        assert_eq!(ctx.resolve(2, 1), Ok(Target::Pending(3)));
        assert_eq!(ctx.resolve(1, -1), Ok(Target::Step(0)));
        assert_eq!(ctx.resolve(0, -1), Ok(Target::Saturated));
        assert_eq!(ctx.resolve(0, -5), Ok(Target::Saturated));
    }

    #[test]
    fn test_resolve_closed() {
        let ctx = StepContext::new(2, true, Stage::Always);
        assert_eq!(ctx.resolve(2, 1), Ok(Target::Closed));
        assert!(ctx.is_last(2));
        assert!(!ctx.is_last(1));
    }

    #[test]
    fn test_resolve_out_of_window() {
        let ctx = StepContext::new(2, false, Stage::Always);
        assert!(matches!(
            ctx.resolve(3, 0),
            Err(TranslateError::OutOfWindow { step: 3, horizon: Some(2) })
        ));
    }

    #[test]
    fn test_final_stage_cannot_look_ahead() {
        let ctx = StepContext::new(2, true, Stage::Final);
        assert!(matches!(
            ctx.resolve(2, 1),
            Err(TranslateError::StageViolation { stage: Stage::Final, .. })
        ));
        assert_eq!(ctx.resolve(2, -1), Ok(Target::Step(1)));
    }
}
