//! Core traits and types for multistep time integration.
//!
//! This crate defines the shared abstractions that solvers and observers
//! build on:
//!
//! - [`FirstOrderSystem`], [`SecondOrderSystem`], [`PartitionedSystem`] —
//!   differential systems in explicit and residual form
//! - [`NonlinearSystem`] — a residual/jacobian pair for Newton iteration
//! - [`LinearSolver`] — the linear-solve capability consumed by Newton
//! - [`Observer`] — receives solver events and optionally returns control actions
//!
//! Vectors and matrices are `nalgebra`'s dynamically sized [`DVector`] and
//! [`DMatrix`], re-exported for convenience.

mod linear;
mod observer;
mod problems;

pub use linear::{LinearSolver, SingularMatrix};
pub use observer::Observer;
pub use problems::{
    FirstOrderState, FirstOrderSystem, NonlinearSystem, Partials, PartitionedSystem,
    SecondOrderState, SecondOrderSystem,
};

pub use nalgebra::{DMatrix, DVector};
