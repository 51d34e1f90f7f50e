use std::fmt::{Display, Formatter};
use std::ops::Neg;

/// A program literal: a positive atom or its default negation.
///
/// Atoms are 1-indexed; the sign carries default negation, so `-lit` reads
/// as `not atom` when the literal occurs in a rule body.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    pub const fn positive(atom: u32) -> Self {
        assert!(atom != 0, "Atom index should not be zero");
        Self(atom as i32)
    }

    pub const fn negative(atom: u32) -> Self {
        Self::positive(atom).negate()
    }

    pub const fn is_negated(&self) -> bool {
        self.0 < 0
    }

    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Return the atom underlying the literal.
    pub const fn atom(self) -> u32 {
        self.0.unsigned_abs()
    }
}

impl Neg for Lit {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Display for Lit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}",
            if self.is_negated() { "not " } else { "" },
            self.atom()
        )
    }
}

/// Hands out fresh atoms, never reusing one.
#[derive(Debug)]
pub struct Allocator {
    next: u32,
}

impl Allocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn fresh(&mut self) -> Lit {
        let atom = self.next;
        self.next += 1;
        Lit::positive(atom)
    }

    /// Number of atoms allocated so far.
    pub fn len(&self) -> usize {
        (self.next - 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}
