//! # tel-rs: temporal and dynamic formulas as incremental logic programs
//!
//! **`tel-rs`** compiles formulas of temporal and dynamic logic over finite
//! traces into ground logic-program rules, one slice per time step, ready for
//! an incremental answer-set solver.
//!
//! ## How it works
//!
//! A formula such as `>? a` ("eventually `a`") talks about an unbounded
//! future, while a solver only ever sees finitely many steps. The
//! [`HorizonManager`][crate::horizon::HorizonManager] unrolls a staged
//! theory step by step. Every reference that points past the current edge
//! becomes a three-valued *boundary external*: free while the edge is open,
//! tied to the real literal once the next step exists, and fixed to its
//! closed-world value when the horizon is closed with `mark_final`.
//!
//! - **Structural sharing**: formulas are hash-consed in an
//!   [`Arena`][crate::arena::Arena] and every (formula, step) pair gets
//!   exactly one literal from the [`EquivalenceCache`][crate::cache::EquivalenceCache].
//! - **Local rules**: every emitted rule mentions at most the previous, the
//!   current and the next step, so emitted steps are never revisited.
//! - **Fixpoints**: until and release requirements are unrolled with
//!   *carrier* atoms; plain `>* a` needs no carrier at all.
//!
//! ## Basic Usage
//!
//! ```rust
//! use tel_rs::formula::Formula;
//! use tel_rs::horizon::{HorizonManager, Theory};
//! use tel_rs::step::Stage;
//!
//! // `a` must hold at some point, starting from the initial state
//! let theory = Theory::new().with(Stage::Initial, Formula::eventually(Formula::atom("a")));
//! let mut horizon = HorizonManager::new(theory)?;
//!
//! let _ = horizon.extend_horizon()?;
//! let batch = horizon.extend_horizon()?;
//! for rule in &batch.rules {
//!     println!("{}", rule);
//! }
//! // "is there a next step?" stays open at the edge
//! assert_eq!(batch.externals.len(), 1);
//!
//! // closing the horizon leaves nothing free
//! let last = horizon.mark_final(1)?;
//! assert!(last.externals.is_empty());
//! assert!(horizon.open_externals().is_empty());
//! # Ok::<(), tel_rs::error::TranslateError>(())
//! ```
//!
//! ## Core Components
//!
//! - **[`formula`]** and **[`path`]**: the input trees.
//! - **[`translate`]**: the clausal compiler, in body and head mode.
//! - **[`horizon`]**: staged theories and incremental unrolling.
//! - **[`stable`]**: a brute-force stable model enumerator for checking small outputs.

pub mod arena;
pub mod cache;
pub mod error;
pub mod formula;
pub mod frontier;
pub mod horizon;
pub mod literal;
pub mod path;
pub mod rule;
pub mod stable;
pub mod step;
pub mod symbols;
pub mod translate;
