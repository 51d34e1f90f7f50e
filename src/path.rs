//! Regular path expressions for the dynamic operators.
//!
//! The engine consumes paths in *normal form* only: every Kleene star body
//! consumes at least one step on each of its branches, and no branch is
//! guarded by the unsatisfiable test `?&false`. A star over a nullable body
//! would make `<p*> f` refer to itself at the same step, which has no
//! finite clausal definition.

use std::fmt::{Display, Formatter};

use crate::formula::Formula;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Path {
    /// `&true`: advance one step.
    Skip,
    /// `? f`: holds without consuming a step iff `f` holds.
    Test(Box<Formula>),
    /// `p ;; q`
    Sequence(Box<Path>, Box<Path>),
    /// `p + q`
    Choice(Box<Path>, Box<Path>),
    /// `* p`
    Star(Box<Path>),
}

impl Path {
    pub fn test(f: Formula) -> Self {
        Path::Test(Box::new(f))
    }

    pub fn sequence(lhs: Path, rhs: Path) -> Self {
        Path::Sequence(Box::new(lhs), Box::new(rhs))
    }

    pub fn choice(lhs: Path, rhs: Path) -> Self {
        Path::Choice(Box::new(lhs), Box::new(rhs))
    }

    pub fn star(arg: Path) -> Self {
        Path::Star(Box::new(arg))
    }

    /// An atomic step guarded by a test: `?f ;; &true`.
    pub fn guarded_step(f: Formula) -> Self {
        Path::sequence(Path::test(f), Path::Skip)
    }

    /// Whether the path accepts the empty word (consumes no step).
    pub fn is_nullable(&self) -> bool {
        match self {
            Path::Skip => false,
            Path::Test(_) => true,
            Path::Sequence(lhs, rhs) => lhs.is_nullable() && rhs.is_nullable(),
            Path::Choice(lhs, rhs) => lhs.is_nullable() || rhs.is_nullable(),
            Path::Star(_) => true,
        }
    }

    pub fn is_normal_form(&self) -> bool {
        match self {
            Path::Skip => true,
            Path::Test(f) => **f != Formula::Bool(false),
            Path::Sequence(lhs, rhs) | Path::Choice(lhs, rhs) => {
                lhs.is_normal_form() && rhs.is_normal_form()
            }
            Path::Star(arg) => !arg.is_nullable() && arg.is_normal_form(),
        }
    }

    /// All test formulas in the path, left to right.
    pub fn tests(&self) -> Vec<&Formula> {
        let mut result = Vec::new();
        let mut stack = vec![self];
        while let Some(path) = stack.pop() {
            match path {
                Path::Skip => {}
                Path::Test(f) => result.push(f.as_ref()),
                Path::Sequence(lhs, rhs) | Path::Choice(lhs, rhs) => {
                    stack.push(rhs);
                    stack.push(lhs);
                }
                Path::Star(arg) => stack.push(arg),
            }
        }
        result
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Path::Skip => write!(f, "&true"),
            Path::Test(arg) => write!(f, "(?{})", arg),
            Path::Sequence(lhs, rhs) => write!(f, "({};;{})", lhs, rhs),
            Path::Choice(lhs, rhs) => write!(f, "({}+{})", lhs, rhs),
            Path::Star(arg) => write!(f, "(*{})", arg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> Formula {
        Formula::atom("a")
    }

    #[test]
    fn test_nullable() {
        assert!(!Path::Skip.is_nullable());
        assert!(Path::test(a()).is_nullable());
        assert!(!Path::guarded_step(a()).is_nullable());
        assert!(Path::choice(Path::Skip, Path::test(a())).is_nullable());
        assert!(Path::star(Path::Skip).is_nullable());
    }

    #[test]
    fn test_normal_form() {
        assert!(Path::star(Path::guarded_step(a())).is_normal_form());
        assert!(Path::star(Path::choice(Path::Skip, Path::guarded_step(a()))).is_normal_form());
        // star over a test never advances
        assert!(!Path::star(Path::test(a())).is_normal_form());
        // nested star is nullable
        assert!(!Path::star(Path::star(Path::Skip)).is_normal_form());
        // unreachable branch
        assert!(!Path::choice(Path::Skip, Path::test(Formula::falsity())).is_normal_form());
    }

    #[test]
    fn test_tests_order() {
        let b = Formula::atom("b");
        let p = Path::sequence(Path::test(a()), Path::star(Path::guarded_step(b.clone())));
        assert_eq!(p.tests(), vec![&a(), &b]);
    }

    #[test]
    fn test_display() {
        let p = Path::star(Path::guarded_step(a()));
        assert_eq!(p.to_string(), "(*((?a);;&true))");
    }
}
