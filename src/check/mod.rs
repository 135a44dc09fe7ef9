//! Constraint checking and cost evaluation: the micro-checker's pure
//! per-entity predicates, and the full-checker that recomputes everything
//! from scratch as a correctness oracle.

pub mod full;
pub mod micro;

pub use full::{check_solution, CheckerOutput, Costs, Violations};
