//! Solvers for nonlinear systems `R(x) = 0`.
//!
//! A [`NonlinearSystem`] supplies the residual, its jacobian and an
//! acceptance test. The implicit time integrators build one of these for
//! every step, but the solvers work on any system.
//!
//! # Solvers
//!
//! - [`newton`] — Newton-Raphson with a pluggable linear solver
//!
//! [`NonlinearSystem`]: multistep_core::NonlinearSystem

pub mod newton;
