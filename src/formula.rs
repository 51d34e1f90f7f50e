//! Temporal and dynamic formulas as produced by a parser.
//!
//! [`Formula`] is an owned, immutable tree. The engine never works on it
//! directly: it is interned into an [`Arena`][crate::arena::Arena] first,
//! which gives structurally equal subformulas one identity.
//!
//! Sequencing and other surface sugar is expanded by the constructors in
//! this module, so the tree only ever contains the core operators.
//!
//! ```
//! use tel_rs::formula::Formula;
//!
//! let f = Formula::until(Formula::atom("a"), Formula::atom("b"));
//! assert_eq!(f.to_string(), "(a>?b)");
//!
//! // `a ;> b` is `a & (> b)`
//! let g = Formula::then(Formula::atom("a"), Formula::atom("b"));
//! assert_eq!(g.to_string(), "(a&(>b))");
//! ```

use std::fmt::{Display, Formatter};

use crate::path::Path;

/// A ground term used as an atom argument. Opaque to the engine.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Symbol {
    Number(i64),
    Id(String),
    Str(String),
    Function(String, Vec<Symbol>),
}

impl Symbol {
    pub fn id(name: impl Into<String>) -> Self {
        Symbol::Id(name.into())
    }

    pub fn function(name: impl Into<String>, args: impl IntoIterator<Item = Symbol>) -> Self {
        Symbol::Function(name.into(), args.into_iter().collect())
    }
}

impl From<i64> for Symbol {
    fn from(value: i64) -> Self {
        Symbol::Number(value)
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Number(n) => write!(f, "{}", n),
            Symbol::Id(name) => write!(f, "{}", name),
            Symbol::Str(s) => write!(f, "{:?}", s),
            Symbol::Function(name, args) => {
                write!(f, "{}(", name)?;
                write_joined(f, args, ",")?;
                write!(f, ")")
            }
        }
    }
}

fn write_joined<T: Display>(f: &mut Formatter<'_>, items: &[T], sep: &str) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    And,
    Or,
    /// `a -> b`
    Implies,
    /// `a <- b`
    Implied,
    /// `a <> b`
    Equiv,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Implies => "->",
            BinaryOp::Implied => "<-",
            BinaryOp::Equiv => "<>",
        }
    }
}

/// Binary temporal connectives. A missing left operand turns since/until
/// into once/eventually and trigger/release into historically/always.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TemporalOp {
    /// `a <? b`
    Since,
    /// `a <* b`
    Trigger,
    /// `a >? b`
    Until,
    /// `a >* b`
    Release,
}

impl TemporalOp {
    pub fn symbol(self) -> &'static str {
        match self {
            TemporalOp::Since => "<?",
            TemporalOp::Trigger => "<*",
            TemporalOp::Until => ">?",
            TemporalOp::Release => ">*",
        }
    }

    pub fn is_future(self) -> bool {
        matches!(self, TemporalOp::Until | TemporalOp::Release)
    }

    /// Greatest-fixpoint operators (trigger, release).
    pub fn is_greatest(self) -> bool {
        matches!(self, TemporalOp::Trigger | TemporalOp::Release)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Modality {
    /// `[p] f`
    Box,
    /// `<p> f`
    Diamond,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Formula {
    Atom {
        name: String,
        args: Vec<Symbol>,
        /// Classical sign: `false` for `-p(x)`.
        positive: bool,
    },
    Bool(bool),
    Initial,
    Final,
    Not(Box<Formula>),
    Binary(BinaryOp, Box<Formula>, Box<Formula>),
    Previous {
        arg: Box<Formula>,
        weak: bool,
    },
    Next {
        arg: Box<Formula>,
        weak: bool,
    },
    Initially(Box<Formula>),
    Temporal {
        op: TemporalOp,
        lhs: Option<Box<Formula>>,
        rhs: Box<Formula>,
    },
    Dynamic {
        modality: Modality,
        path: Path,
        arg: Box<Formula>,
    },
}

// Atoms and constants
impl Formula {
    pub fn atom(name: impl Into<String>) -> Self {
        Formula::atom_with(name, [])
    }

    pub fn atom_with(name: impl Into<String>, args: impl IntoIterator<Item = Symbol>) -> Self {
        Formula::Atom {
            name: name.into(),
            args: args.into_iter().collect(),
            positive: true,
        }
    }

    /// Classically negated atom `-name(args)`.
    pub fn neg_atom(name: impl Into<String>, args: impl IntoIterator<Item = Symbol>) -> Self {
        Formula::Atom {
            name: name.into(),
            args: args.into_iter().collect(),
            positive: false,
        }
    }

    pub fn truth() -> Self {
        Formula::Bool(true)
    }

    pub fn falsity() -> Self {
        Formula::Bool(false)
    }
}

// Boolean connectives
impl Formula {
    #[allow(clippy::should_implement_trait)]
    pub fn not(arg: Formula) -> Self {
        Formula::Not(Box::new(arg))
    }

    pub fn binary(op: BinaryOp, lhs: Formula, rhs: Formula) -> Self {
        Formula::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Formula, rhs: Formula) -> Self {
        Formula::binary(BinaryOp::And, lhs, rhs)
    }

    pub fn or(lhs: Formula, rhs: Formula) -> Self {
        Formula::binary(BinaryOp::Or, lhs, rhs)
    }

    pub fn implies(lhs: Formula, rhs: Formula) -> Self {
        Formula::binary(BinaryOp::Implies, lhs, rhs)
    }

    pub fn implied(lhs: Formula, rhs: Formula) -> Self {
        Formula::binary(BinaryOp::Implied, lhs, rhs)
    }

    pub fn equiv(lhs: Formula, rhs: Formula) -> Self {
        Formula::binary(BinaryOp::Equiv, lhs, rhs)
    }
}

// Temporal connectives
impl Formula {
    /// `< a`
    pub fn previous(arg: Formula) -> Self {
        Formula::Previous {
            arg: Box::new(arg),
            weak: false,
        }
    }

    /// `<: a`
    pub fn weak_previous(arg: Formula) -> Self {
        Formula::Previous {
            arg: Box::new(arg),
            weak: true,
        }
    }

    /// `> a`
    pub fn next(arg: Formula) -> Self {
        Formula::Next {
            arg: Box::new(arg),
            weak: false,
        }
    }

    /// `>: a`
    pub fn weak_next(arg: Formula) -> Self {
        Formula::Next {
            arg: Box::new(arg),
            weak: true,
        }
    }

    /// `n < a`, expanded into `n` nested single-step operators.
    pub fn previous_by(n: usize, arg: Formula, weak: bool) -> Self {
        (0..n).fold(arg, |acc, _| Formula::Previous {
            arg: Box::new(acc),
            weak,
        })
    }

    /// `n > a`, expanded into `n` nested single-step operators.
    pub fn next_by(n: usize, arg: Formula, weak: bool) -> Self {
        (0..n).fold(arg, |acc, _| Formula::Next {
            arg: Box::new(acc),
            weak,
        })
    }

    /// `<< a`
    pub fn initially(arg: Formula) -> Self {
        Formula::Initially(Box::new(arg))
    }

    pub fn temporal(op: TemporalOp, lhs: Option<Formula>, rhs: Formula) -> Self {
        Formula::Temporal {
            op,
            lhs: lhs.map(Box::new),
            rhs: Box::new(rhs),
        }
    }

    /// `a <? b`
    pub fn since(lhs: Formula, rhs: Formula) -> Self {
        Formula::temporal(TemporalOp::Since, Some(lhs), rhs)
    }

    /// `a <* b`
    pub fn trigger(lhs: Formula, rhs: Formula) -> Self {
        Formula::temporal(TemporalOp::Trigger, Some(lhs), rhs)
    }

    /// `a >? b`
    pub fn until(lhs: Formula, rhs: Formula) -> Self {
        Formula::temporal(TemporalOp::Until, Some(lhs), rhs)
    }

    /// `a >* b`
    pub fn release(lhs: Formula, rhs: Formula) -> Self {
        Formula::temporal(TemporalOp::Release, Some(lhs), rhs)
    }

    /// `<? a`
    pub fn once(arg: Formula) -> Self {
        Formula::temporal(TemporalOp::Since, None, arg)
    }

    /// `<* a`
    pub fn historically(arg: Formula) -> Self {
        Formula::temporal(TemporalOp::Trigger, None, arg)
    }

    /// `>? a`
    pub fn eventually(arg: Formula) -> Self {
        Formula::temporal(TemporalOp::Until, None, arg)
    }

    /// `>* a`
    pub fn always(arg: Formula) -> Self {
        Formula::temporal(TemporalOp::Release, None, arg)
    }

    /// `>> a`: `a` holds in the last state, i.e. `>* (~&final | a)`.
    pub fn at_end(arg: Formula) -> Self {
        Formula::always(Formula::or(Formula::not(Formula::Final), arg))
    }

    /// `a ;> b` is `a & (> b)`.
    pub fn then(lhs: Formula, rhs: Formula) -> Self {
        Formula::and(lhs, Formula::next(rhs))
    }

    /// `a ;>: b` is `a & (>: b)`.
    pub fn then_weak(lhs: Formula, rhs: Formula) -> Self {
        Formula::and(lhs, Formula::weak_next(rhs))
    }

    /// `a <; b` is `(< a) & b`.
    pub fn after(lhs: Formula, rhs: Formula) -> Self {
        Formula::and(Formula::previous(lhs), rhs)
    }

    /// `a <:; b` is `(<: a) & b`.
    pub fn after_weak(lhs: Formula, rhs: Formula) -> Self {
        Formula::and(Formula::weak_previous(lhs), rhs)
    }
}

// Dynamic connectives
impl Formula {
    /// `[p] a`
    pub fn boxed(path: Path, arg: Formula) -> Self {
        Formula::Dynamic {
            modality: Modality::Box,
            path,
            arg: Box::new(arg),
        }
    }

    /// `<p> a`
    pub fn diamond(path: Path, arg: Formula) -> Self {
        Formula::Dynamic {
            modality: Modality::Diamond,
            path,
            arg: Box::new(arg),
        }
    }

    /// `&final` inside dynamic formulas: `[&true] &false`.
    pub fn dynamic_final() -> Self {
        Formula::boxed(Path::Skip, Formula::falsity())
    }
}

// Queries
impl Formula {
    /// Whether the formula looks at any later step.
    ///
    /// `&final` is not counted: at a closed horizon it is a constant.
    pub fn references_future(&self) -> bool {
        match self {
            Formula::Atom { .. } | Formula::Bool(_) | Formula::Initial | Formula::Final => false,
            Formula::Not(arg) | Formula::Previous { arg, .. } | Formula::Initially(arg) => {
                arg.references_future()
            }
            Formula::Binary(_, lhs, rhs) => lhs.references_future() || rhs.references_future(),
            Formula::Next { .. } | Formula::Dynamic { .. } => true,
            Formula::Temporal { op, lhs, rhs } => {
                op.is_future()
                    || lhs.as_ref().is_some_and(|l| l.references_future())
                    || rhs.references_future()
            }
        }
    }

    /// The first path expression (in pre-order) that is not in normal form.
    pub fn malformed_path(&self) -> Option<&Path> {
        match self {
            Formula::Atom { .. } | Formula::Bool(_) | Formula::Initial | Formula::Final => None,
            Formula::Not(arg)
            | Formula::Previous { arg, .. }
            | Formula::Next { arg, .. }
            | Formula::Initially(arg) => arg.malformed_path(),
            Formula::Binary(_, lhs, rhs) => lhs.malformed_path().or_else(|| rhs.malformed_path()),
            Formula::Temporal { lhs, rhs, .. } => lhs
                .as_ref()
                .and_then(|l| l.malformed_path())
                .or_else(|| rhs.malformed_path()),
            Formula::Dynamic { path, arg, .. } => {
                if !path.is_normal_form() {
                    Some(path)
                } else {
                    path.tests()
                        .into_iter()
                        .find_map(|t| t.malformed_path())
                        .or_else(|| arg.malformed_path())
                }
            }
        }
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Atom {
                name,
                args,
                positive,
            } => {
                if !positive {
                    write!(f, "-")?;
                }
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    write_joined(f, args, ",")?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Formula::Bool(true) => write!(f, "&true"),
            Formula::Bool(false) => write!(f, "&false"),
            Formula::Initial => write!(f, "&initial"),
            Formula::Final => write!(f, "&final"),
            Formula::Not(arg) => write!(f, "(~{})", arg),
            Formula::Binary(op, lhs, rhs) => write!(f, "({}{}{})", lhs, op.symbol(), rhs),
            Formula::Previous { arg, weak } => {
                write!(f, "({}{})", if *weak { "<:" } else { "<" }, arg)
            }
            Formula::Next { arg, weak } => write!(f, "({}{})", if *weak { ">:" } else { ">" }, arg),
            Formula::Initially(arg) => write!(f, "(<<{})", arg),
            Formula::Temporal { op, lhs, rhs } => match lhs {
                Some(lhs) => write!(f, "({}{}{})", lhs, op.symbol(), rhs),
                None => write!(f, "({}{})", op.symbol(), rhs),
            },
            Formula::Dynamic {
                modality: Modality::Box,
                path,
                arg,
            } => write!(f, "([{}]{})", path, arg),
            Formula::Dynamic {
                modality: Modality::Diamond,
                path,
                arg,
            } => write!(f, "(<{}>{})", path, arg),
        }
    }
}
