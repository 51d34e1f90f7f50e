use thiserror::Error;

use crate::literal::Lit;
use crate::step::Stage;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum TranslateError {
    #[error("path expression `{path}` in `{formula}` is not in normal form")]
    MalformedPathExpression { formula: String, path: String },

    #[error("`{formula}` references the future, which stage `{stage}` does not allow")]
    StageViolation { formula: String, stage: Stage },

    #[error("step {step} has not been unrolled (horizon edge: {horizon:?})")]
    OutOfWindow { step: usize, horizon: Option<usize> },

    #[error("horizon was closed at step {last}")]
    HorizonClosed { last: usize },

    #[error("step {step} is not the horizon edge (current edge: {horizon:?})")]
    NotAtFrontier { step: usize, horizon: Option<usize> },

    #[error("`{formula}` at step {step} already has a literal")]
    LateBinding { formula: String, step: usize },

    #[error("host literal `{lit}` is not a positive atom")]
    NegativeHostLiteral { lit: Lit },

    #[error("{count} external(s) left free after closing the horizon at step {last}")]
    UnresolvedExternalAtClose { count: usize, last: usize },
}
