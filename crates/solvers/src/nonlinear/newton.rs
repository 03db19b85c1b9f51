//! Newton-Raphson iteration for nonlinear systems.
//!
//! # Algorithm
//!
//! Starting from the caller's `x`, each iteration solves
//!
//! ```text
//! J(x) Δ = -R(x)
//! x ← x + Δ
//! ```
//!
//! until the system's convergence test accepts the residual or the iteration
//! limit is reached. The convergence test runs before every update, so a
//! starting point that already satisfies it is returned untouched with zero
//! iterations.
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] after every update, carrying the new
//! iterate, its residual and the increment. Observers can return
//! [`Action::StopEarly`] to halt with the current iterate.
//!
//! # Resources
//!
//! A [`Newton`] owns its residual, jacobian and increment buffers and reuses
//! them across solves. They are only reallocated when the system dimension
//! changes.

mod action;
mod config;
mod error;
mod event;
mod solution;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use solution::{Solution, Status};

use multistep_core::{LinearSolver, NonlinearSystem, Observer};
use nalgebra::{DMatrix, DVector};

use crate::linear::DenseLu;

/// A reusable Newton solver.
#[derive(Debug, Clone)]
pub struct Newton<L = DenseLu> {
    config: Config,
    linear: L,
    residual: DVector<f64>,
    jacobian: DMatrix<f64>,
    increment: DVector<f64>,
}

impl Default for Newton<DenseLu> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Newton<DenseLu> {
    /// Creates a solver backed by a dense LU factorization.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_linear_solver(config, DenseLu)
    }
}

impl<L: LinearSolver> Newton<L> {
    /// Creates a solver using `linear` for the update equations.
    #[must_use]
    pub fn with_linear_solver(config: Config, linear: L) -> Self {
        Self {
            config,
            linear,
            residual: DVector::zeros(0),
            jacobian: DMatrix::zeros(0, 0),
            increment: DVector::zeros(0),
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration used by later solves.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    /// Returns the residual at the final iterate of the last solve.
    #[must_use]
    pub fn residual(&self) -> &DVector<f64> {
        &self.residual
    }

    /// Drives `x` towards a root of `system`.
    ///
    /// On return `x` holds the final iterate, whatever the status.
    /// See the [module docs](self) for the iteration and event details.
    ///
    /// # Errors
    ///
    /// Returns [`Error::System`] if the system fails to evaluate and
    /// [`Error::SingularJacobian`] if an update equation cannot be solved.
    pub fn solve<S, Obs>(
        &mut self,
        system: &mut S,
        x: &mut DVector<f64>,
        mut observer: Obs,
    ) -> Result<Solution, Error>
    where
        S: NonlinearSystem,
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        self.resize(x.len());
        let epsilon = self.config.epsilon();

        self.residual.fill(0.0);
        system.residue(x, &mut self.residual).map_err(Error::system)?;

        let mut iters = 0;
        loop {
            if system.is_converged(x, &self.residual, epsilon) {
                return Ok(self.finish(Status::Converged, iters));
            }
            if iters == self.config.max_iters() {
                log::trace!("newton reached {iters} iterations without converging");
                return Ok(self.finish(Status::MaxIters, iters));
            }

            self.jacobian.fill(0.0);
            system.jacobian(x, &mut self.jacobian).map_err(Error::system)?;

            self.increment.copy_from(&self.residual);
            self.increment.neg_mut();
            iters += 1;
            self.linear
                .solve(&self.jacobian, &mut self.increment)
                .map_err(|_| Error::SingularJacobian { iteration: iters })?;
            *x += &self.increment;

            self.residual.fill(0.0);
            system.residue(x, &mut self.residual).map_err(Error::system)?;

            log::trace!(
                "newton iteration {iters}: |R| = {:e}, |dx| = {:e}",
                self.residual.norm(),
                self.increment.norm()
            );

            let event = Event {
                iteration: iters,
                x: &*x,
                residual: &self.residual,
                increment: &self.increment,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                return Ok(self.finish(Status::StoppedByObserver, iters));
            }
        }
    }

    /// Drives `x` towards a root of `system` without observation.
    ///
    /// This is a convenience wrapper around [`Newton::solve`] that discards
    /// events.
    ///
    /// # Errors
    ///
    /// Returns an error if the system fails or the jacobian is singular.
    pub fn solve_unobserved<S: NonlinearSystem>(
        &mut self,
        system: &mut S,
        x: &mut DVector<f64>,
    ) -> Result<Solution, Error> {
        self.solve(system, x, ())
    }

    fn resize(&mut self, n: usize) {
        if self.residual.len() != n {
            self.residual = DVector::zeros(n);
            self.increment = DVector::zeros(n);
            self.jacobian = DMatrix::zeros(n, n);
        }
    }

    fn finish(&self, status: Status, iters: usize) -> Solution {
        Solution {
            status,
            iters,
            residual_norm: self.residual.norm(),
        }
    }
}
