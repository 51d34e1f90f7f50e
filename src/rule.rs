//! Ground rules handed to the solving engine.
//!
//! A rule is a disjunctive (or choice) head over atoms and a body over
//! literals. An empty disjunctive head is an integrity constraint.

use std::fmt::{Display, Formatter};

use crate::literal::Lit;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RuleKind {
    Disjunctive,
    Choice,
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Rule {
    pub kind: RuleKind,
    pub head: Vec<u32>,
    pub body: Vec<Lit>,
}

// Constructors
impl Rule {
    pub fn fact(atom: u32) -> Rule {
        Rule::normal(atom, [])
    }

    pub fn normal(atom: u32, body: impl IntoIterator<Item = Lit>) -> Rule {
        Rule::disjunctive([atom], body)
    }

    pub fn disjunctive(head: impl IntoIterator<Item = u32>, body: impl IntoIterator<Item = Lit>) -> Rule {
        Rule {
            kind: RuleKind::Disjunctive,
            head: head.into_iter().collect(),
            body: body.into_iter().collect(),
        }
    }

    pub fn choice(atom: u32) -> Rule {
        Rule {
            kind: RuleKind::Choice,
            head: vec![atom],
            body: Vec::new(),
        }
    }

    pub fn constraint(body: impl IntoIterator<Item = Lit>) -> Rule {
        Rule::disjunctive([], body)
    }
}

// Getters
impl Rule {
    pub fn is_constraint(&self) -> bool {
        self.kind == RuleKind::Disjunctive && self.head.is_empty()
    }

    pub fn positive_body(&self) -> impl Iterator<Item = u32> + '_ {
        self.body.iter().filter(|l| !l.is_negated()).map(|l| l.atom())
    }

    pub fn negative_body(&self) -> impl Iterator<Item = u32> + '_ {
        self.body.iter().filter(|l| l.is_negated()).map(|l| l.atom())
    }

    /// All atoms mentioned anywhere in the rule.
    pub fn atoms(&self) -> impl Iterator<Item = u32> + '_ {
        self.head.iter().copied().chain(self.body.iter().map(|l| l.atom()))
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let head = self.head.iter().map(|a| format!("x{}", a)).collect::<Vec<_>>();
        match self.kind {
            RuleKind::Choice => write!(f, "{{{}}}", head.join(";"))?,
            RuleKind::Disjunctive => write!(f, "{}", head.join("|"))?,
        }
        if !self.body.is_empty() {
            let body = self.body.iter().map(|l| l.to_string()).collect::<Vec<_>>();
            if self.head.is_empty() {
                write!(f, ":- {}", body.join(", "))?;
            } else {
                write!(f, " :- {}", body.join(", "))?;
            }
        } else if self.head.is_empty() {
            write!(f, ":-")?;
        }
        write!(f, ".")
    }
}

/// Clauses for `a <-> b`.
pub fn make_equal(a: Lit, b: Lit) -> [Rule; 2] {
    [Rule::constraint([a, -b]), Rule::constraint([-a, b])]
}

/// Clauses for `e <-> a | b`.
pub fn make_disjunction(e: Lit, a: Lit, b: Lit) -> [Rule; 3] {
    [
        Rule::constraint([e, -a, -b]),
        Rule::constraint([-e, a]),
        Rule::constraint([-e, b]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_split() {
        let rule = Rule::normal(1, [Lit::positive(2), Lit::negative(3), Lit::positive(4)]);
        assert_eq!(rule.positive_body().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(rule.negative_body().collect::<Vec<_>>(), vec![3]);
        assert!(!rule.is_constraint());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rule::fact(1).to_string(), "x1.");
        assert_eq!(Rule::choice(2).to_string(), "{x2}.");
        assert_eq!(
            Rule::constraint([Lit::positive(1), Lit::negative(2)]).to_string(),
            ":- x1, not x2."
        );
        assert_eq!(
            Rule::disjunctive([1, 2], [Lit::negative(3)]).to_string(),
            "x1|x2 :- not x3."
        );
        assert_eq!(Rule::constraint([]).to_string(), ":-.");
    }

    #[test]
    fn test_make_disjunction_shape() {
        let [r1, r2, r3] = make_disjunction(Lit::positive(1), Lit::positive(2), Lit::positive(3));
        assert!(r1.is_constraint() && r2.is_constraint() && r3.is_constraint());
        assert_eq!(r1.body, vec![Lit::positive(1), Lit::negative(2), Lit::negative(3)]);
    }
}
