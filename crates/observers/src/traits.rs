//! Capability traits for cross-solver observers.
//!
//! These traits abstract over solver-specific event and action types, so one
//! observer can watch Newton iterations and time steps alike.
//!
//! # Event traits
//!
//! - [`HasResidual`] — events that carry a residual norm
//! - [`HasTime`] — events that carry a simulation time
//!
//! # Action traits
//!
//! - [`CanStopEarly`] — actions that can signal early termination
//!
//! # Example
//!
//! ```rust
//! use multistep_core::Observer;
//! use multistep_observers::traits::{CanStopEarly, HasResidual};
//!
//! struct GoodEnough {
//!     tolerance: f64,
//!     min_iters: usize,
//!     iter: usize,
//! }
//!
//! impl<E: HasResidual, A: CanStopEarly> Observer<E, A> for GoodEnough {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         self.iter += 1;
//!         if self.iter >= self.min_iters && event.residual() < self.tolerance {
//!             return Some(A::stop_early());
//!         }
//!         None
//!     }
//! }
//! ```

use multistep_solvers::{nonlinear::newton, transient};

/// An event that carries a residual value.
pub trait HasResidual {
    /// Returns the residual norm for this event.
    fn residual(&self) -> f64;
}

/// An event that carries a simulation time.
pub trait HasTime {
    /// Returns the time of this event.
    fn time(&self) -> f64;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the solver early.
    fn stop_early() -> Self;
}

impl HasResidual for newton::Event<'_> {
    fn residual(&self) -> f64 {
        self.residual_norm()
    }
}

impl HasTime for transient::Event<'_> {
    fn time(&self) -> f64 {
        self.time
    }
}

impl CanStopEarly for newton::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}

impl CanStopEarly for transient::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
