use std::path::Path;

use nalgebra::DVector;

use crate::{
    history::{History, SeedPolicy},
    integrator::{Implicit, Integrator, Method},
};

use super::{Error, output::Outputs};

/// One integrated configuration: its history, integrator and output files.
#[derive(Debug)]
pub(crate) struct Partition {
    diff_order: usize,
    integrator: Option<Integrator>,
    seed_override: Option<SeedPolicy>,
    pub(crate) history: History,
    pub(crate) implicit: Implicit,
    pub(crate) outputs: Outputs,
}

impl Partition {
    /// Creates an empty partition for a system of differential order
    /// `diff_order`.
    pub(crate) fn new(diff_order: usize) -> Self {
        Self {
            diff_order,
            integrator: None,
            seed_override: None,
            history: History::new(),
            implicit: Implicit::default(),
            outputs: Outputs::new(diff_order),
        }
    }

    pub(crate) fn set_integrator(&mut self, method: Method) -> Result<(), Error> {
        self.integrator = Some(Integrator::new(method)?);
        Ok(())
    }

    pub(crate) fn integrator(&self) -> Result<&Integrator, Error> {
        self.integrator.as_ref().ok_or(Error::MissingIntegrator)
    }

    pub(crate) fn is_explicit(&self) -> Option<bool> {
        self.integrator.as_ref().map(Integrator::is_explicit)
    }

    pub(crate) fn set_seed_policy(&mut self, policy: SeedPolicy) {
        self.seed_override = Some(policy);
    }

    /// Replaces the history with one holding `initial[k]` as order `k`.
    ///
    /// One condition per order below the differential order is expected.
    pub(crate) fn set_initial(&mut self, initial: &[&DVector<f64>]) -> Result<(), Error> {
        let mut history = History::new();
        for (order, values) in initial.iter().enumerate() {
            history.set_initial_condition(order, values)?;
        }
        self.history = history;
        Ok(())
    }

    pub(crate) fn set_output_file(&mut self, path: &Path, order: usize) -> Result<(), Error> {
        self.outputs.open(path, order)
    }

    /// Checks that an integrator and initial conditions are present and
    /// compatible, returning the integrator.
    pub(crate) fn check(&self) -> Result<Integrator, Error> {
        let integrator = *self.integrator()?;
        if self.history.vector_size().is_none() || self.history.diff_order() != self.diff_order {
            return Err(Error::MissingInitialCondition);
        }
        if integrator.min_diff_order() > self.diff_order {
            return Err(Error::Incompatible {
                method: integrator.method(),
                diff_order: self.diff_order,
            });
        }
        Ok(integrator)
    }

    /// Sizes the history for `integrator` and restarts its timeline at `t0`.
    ///
    /// The highest-order current slot is left for the caller to evaluate.
    pub(crate) fn prepare(&mut self, integrator: &Integrator, t0: f64) -> Result<(), Error> {
        let stored = integrator.stored_steps();
        self.history
            .set_stored_steps(stored.value, stored.intermediate, stored.highest)?;
        self.history
            .set_seed_policy(self.seed_override.unwrap_or(integrator.seed_policy()));
        self.history.restart_at(t0);
        Ok(())
    }
}
