//! Multistep time integration and Newton iteration.
//!
//! # Modules
//!
//! - [`history`] — windowed storage of a configuration and its derivatives
//! - [`integrator`] — Adams-Bashforth, Adams-Moulton, BDF, central difference
//!   and Newmark schemes
//! - [`nonlinear`] — Newton iteration for nonlinear systems
//! - [`linear`] — linear solver backends
//! - [`transient`] — controllers stepping user systems through time
//!
//! Logging goes through the [`log`] facade; no logger is installed.

pub mod history;
pub mod integrator;
pub mod linear;
pub mod nonlinear;
pub mod transient;
