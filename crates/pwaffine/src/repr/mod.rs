//! Core model representation.
//!
//! - [`AffineFunction`] / [`Predicate`] - affine maps and the half-spaces `f(x) >= 0`
//! - [`OrClause`] / [`GuardPredicate`] - CNF guards over predicates
//! - [`Region`] / [`PiecewiseModel`] - ordered guarded regions plus input scaling
//!
//! These types carry no training state; see [`crate::training`] for learning
//! and [`crate::persist`] for the on-disk format.

mod affine;
mod display;
mod guard;
mod piecewise;

pub use affine::{AffineFunction, Predicate};
pub use display::RawModelDisplay;
pub use guard::{GuardPredicate, OrClause};
pub use piecewise::{PiecewiseModel, Region, NO_REGION_VALUE};
