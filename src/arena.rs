//! Hash-consed storage for formulas and path expressions.
//!
//! Interning gives every structurally distinct subformula exactly one
//! [`FormulaId`], so the equivalence cache can key on ids instead of trees.

use std::collections::HashMap;

use crate::formula::{BinaryOp, Formula, Modality, Symbol, TemporalOp};
use crate::path::Path;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormulaId(u32);

impl FormulaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PathId(u32);

impl PathId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A formula node whose children are ids into the same arena.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Node<I = FormulaId> {
    Atom {
        name: String,
        args: Vec<Symbol>,
        positive: bool,
    },
    Bool(bool),
    Initial,
    Final,
    Not(I),
    Binary(BinaryOp, I, I),
    Previous(I, bool),
    Next(I, bool),
    Initially(I),
    Temporal(TemporalOp, Option<I>, I),
    Dynamic(Modality, PathId, I),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PathNode {
    Skip,
    Test(FormulaId),
    Sequence(PathId, PathId),
    Choice(PathId, PathId),
    Star(PathId),
}

#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
    node_ids: HashMap<Node, FormulaId>,
    paths: Vec<PathNode>,
    path_ids: HashMap<PathNode, PathId>,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct formulas.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: FormulaId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn path(&self, id: PathId) -> PathNode {
        self.paths[id.index()]
    }

    pub fn find(&self, node: &Node) -> Option<FormulaId> {
        self.node_ids.get(node).copied()
    }

    /// Find or insert `node`.
    pub fn mk(&mut self, node: Node) -> FormulaId {
        if let Some(&id) = self.node_ids.get(&node) {
            return id;
        }
        let id = FormulaId(self.nodes.len() as u32);
        self.nodes.push(node.clone());
        self.node_ids.insert(node, id);
        id
    }

    pub fn mk_path(&mut self, node: PathNode) -> PathId {
        if let Some(&id) = self.path_ids.get(&node) {
            return id;
        }
        let id = PathId(self.paths.len() as u32);
        self.paths.push(node);
        self.path_ids.insert(node, id);
        id
    }

    pub fn intern(&mut self, formula: &Formula) -> FormulaId {
        let node = match formula {
            Formula::Atom {
                name,
                args,
                positive,
            } => Node::Atom {
                name: name.clone(),
                args: args.clone(),
                positive: *positive,
            },
            Formula::Bool(value) => Node::Bool(*value),
            Formula::Initial => Node::Initial,
            Formula::Final => Node::Final,
            Formula::Not(arg) => Node::Not(self.intern(arg)),
            Formula::Binary(op, lhs, rhs) => {
                let lhs = self.intern(lhs);
                let rhs = self.intern(rhs);
                Node::Binary(*op, lhs, rhs)
            }
            Formula::Previous { arg, weak } => Node::Previous(self.intern(arg), *weak),
            Formula::Next { arg, weak } => Node::Next(self.intern(arg), *weak),
            Formula::Initially(arg) => Node::Initially(self.intern(arg)),
            Formula::Temporal { op, lhs, rhs } => {
                let lhs = lhs.as_ref().map(|l| self.intern(l));
                let rhs = self.intern(rhs);
                Node::Temporal(*op, lhs, rhs)
            }
            Formula::Dynamic {
                modality,
                path,
                arg,
            } => {
                let path = self.intern_path(path);
                let arg = self.intern(arg);
                Node::Dynamic(*modality, path, arg)
            }
        };
        self.mk(node)
    }

    pub fn intern_path(&mut self, path: &Path) -> PathId {
        let node = match path {
            Path::Skip => PathNode::Skip,
            Path::Test(f) => PathNode::Test(self.intern(f)),
            Path::Sequence(lhs, rhs) => {
                let lhs = self.intern_path(lhs);
                let rhs = self.intern_path(rhs);
                PathNode::Sequence(lhs, rhs)
            }
            Path::Choice(lhs, rhs) => {
                let lhs = self.intern_path(lhs);
                let rhs = self.intern_path(rhs);
                PathNode::Choice(lhs, rhs)
            }
            Path::Star(arg) => PathNode::Star(self.intern_path(arg)),
        };
        self.mk_path(node)
    }

    pub fn is_nullable(&self, path: PathId) -> bool {
        match self.path(path) {
            PathNode::Skip => false,
            PathNode::Test(_) | PathNode::Star(_) => true,
            PathNode::Sequence(lhs, rhs) => self.is_nullable(lhs) && self.is_nullable(rhs),
            PathNode::Choice(lhs, rhs) => self.is_nullable(lhs) || self.is_nullable(rhs),
        }
    }

    /// Same check as [`Path::is_normal_form`], on interned paths.
    pub fn is_normal_form(&self, path: PathId) -> bool {
        match self.path(path) {
            PathNode::Skip => true,
            PathNode::Test(f) => *self.node(f) != Node::Bool(false),
            PathNode::Sequence(lhs, rhs) | PathNode::Choice(lhs, rhs) => {
                self.is_normal_form(lhs) && self.is_normal_form(rhs)
            }
            PathNode::Star(arg) => !self.is_nullable(arg) && self.is_normal_form(arg),
        }
    }

    /// Rebuild the owned tree for `id`.
    pub fn to_formula(&self, id: FormulaId) -> Formula {
        match self.node(id) {
            Node::Atom {
                name,
                args,
                positive,
            } => Formula::Atom {
                name: name.clone(),
                args: args.clone(),
                positive: *positive,
            },
            Node::Bool(value) => Formula::Bool(*value),
            Node::Initial => Formula::Initial,
            Node::Final => Formula::Final,
            Node::Not(arg) => Formula::not(self.to_formula(*arg)),
            Node::Binary(op, lhs, rhs) => {
                Formula::binary(*op, self.to_formula(*lhs), self.to_formula(*rhs))
            }
            Node::Previous(arg, weak) => Formula::Previous {
                arg: Box::new(self.to_formula(*arg)),
                weak: *weak,
            },
            Node::Next(arg, weak) => Formula::Next {
                arg: Box::new(self.to_formula(*arg)),
                weak: *weak,
            },
            Node::Initially(arg) => Formula::initially(self.to_formula(*arg)),
            Node::Temporal(op, lhs, rhs) => Formula::temporal(
                *op,
                lhs.map(|l| self.to_formula(l)),
                self.to_formula(*rhs),
            ),
            Node::Dynamic(modality, path, arg) => Formula::Dynamic {
                modality: *modality,
                path: self.to_path(*path),
                arg: Box::new(self.to_formula(*arg)),
            },
        }
    }

    pub fn to_path(&self, id: PathId) -> Path {
        match self.path(id) {
            PathNode::Skip => Path::Skip,
            PathNode::Test(f) => Path::test(self.to_formula(f)),
            PathNode::Sequence(lhs, rhs) => Path::sequence(self.to_path(lhs), self.to_path(rhs)),
            PathNode::Choice(lhs, rhs) => Path::choice(self.to_path(lhs), self.to_path(rhs)),
            PathNode::Star(arg) => Path::star(self.to_path(arg)),
        }
    }
}

// Shorthands for building expansions inside the arena
impl Arena {
    pub fn mk_bool(&mut self, value: bool) -> FormulaId {
        self.mk(Node::Bool(value))
    }

    pub fn mk_binary(&mut self, op: BinaryOp, lhs: FormulaId, rhs: FormulaId) -> FormulaId {
        self.mk(Node::Binary(op, lhs, rhs))
    }

    pub fn mk_next(&mut self, arg: FormulaId, weak: bool) -> FormulaId {
        self.mk(Node::Next(arg, weak))
    }

    pub fn mk_dynamic(&mut self, modality: Modality, path: PathId, arg: FormulaId) -> FormulaId {
        self.mk(Node::Dynamic(modality, path, arg))
    }
}
