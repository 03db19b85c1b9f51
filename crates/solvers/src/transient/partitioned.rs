use std::path::Path;

use multistep_core::{
    FirstOrderState, LinearSolver, NonlinearSystem, Observer, Partials, PartitionedSystem,
    SecondOrderState,
};
use nalgebra::{DMatrix, DVector};

use crate::{
    history::{History, SeedPolicy},
    integrator::{Implicit, Integrator, Method},
    linear::DenseLu,
};

use super::{
    Action, Error, Event, NonConvergence, Phase, Solution, Status,
    control::{self, Control, Controller},
    partition::Partition,
};

/// Time-stepping controller for a [`PartitionedSystem`].
///
/// Configuration 1 is the first-order partition (`q1`, `qdot1`) and
/// configuration 2 the second-order partition (`q2`, `qdot2`, `qddot2`).
/// Each partition has its own integrator. When both are explicit a step is
/// predict, evaluate, correct. Otherwise Newton solves for the configuration
/// of every implicit partition: over the stacked unknown `[q1; q2]` when both
/// are implicit, or over one partition while the explicit one holds its
/// predicted values. The explicit partition is then evaluated and corrected
/// at the converged state.
#[derive(Debug)]
pub struct PartitionedProblem<'a, S, L = DenseLu> {
    system: &'a S,
    first: Partition,
    second: Partition,
    control: Control<L>,
    scratch1: DVector<f64>,
    scratch2: DVector<f64>,
    jacobian: DMatrix<f64>,
}

impl<'a, S: PartitionedSystem> PartitionedProblem<'a, S> {
    /// Creates a controller for `system` using dense LU for Newton updates.
    #[must_use]
    pub fn new(system: &'a S) -> Self {
        Self::with_linear_solver(system, DenseLu)
    }
}

impl<'a, S: PartitionedSystem, L: LinearSolver> PartitionedProblem<'a, S, L> {
    /// Creates a controller for `system` using `linear` for Newton updates.
    #[must_use]
    pub fn with_linear_solver(system: &'a S, linear: L) -> Self {
        Self {
            system,
            first: Partition::new(1),
            second: Partition::new(2),
            control: Control::new(linear),
            scratch1: DVector::zeros(0),
            scratch2: DVector::zeros(0),
            jacobian: DMatrix::zeros(0, 0),
        }
    }

    /// Selects the integrator of the first-order partition.
    ///
    /// # Errors
    ///
    /// Fails if the method is invalid or the controller is initialized.
    pub fn set_integrator1(&mut self, method: Method) -> Result<(), Error> {
        self.control.require_setup("select an integrator")?;
        self.first.set_integrator(method)
    }

    /// Selects the integrator of the second-order partition.
    ///
    /// # Errors
    ///
    /// Fails if the method is invalid or the controller is initialized.
    pub fn set_integrator2(&mut self, method: Method) -> Result<(), Error> {
        self.control.require_setup("select an integrator")?;
        self.second.set_integrator(method)
    }

    /// Sets the initial configuration `q1` of the first-order partition.
    ///
    /// # Errors
    ///
    /// Fails if the controller is initialized.
    pub fn set_initial_configuration1(&mut self, q0: &DVector<f64>) -> Result<(), Error> {
        self.control.require_setup("set the initial configuration")?;
        self.first.set_initial(&[q0])
    }

    /// Sets the initial configuration `q2` and velocity `qdot2` of the
    /// second-order partition.
    ///
    /// # Errors
    ///
    /// Fails if the vectors differ in size or the controller is initialized.
    pub fn set_initial_configuration2(
        &mut self,
        q0: &DVector<f64>,
        qdot0: &DVector<f64>,
    ) -> Result<(), Error> {
        self.control.require_setup("set the initial configuration")?;
        self.second.set_initial(&[q0, qdot0])
    }

    /// Sets the start time, final time and step size.
    ///
    /// # Errors
    ///
    /// Fails if the values are invalid or the controller is initialized.
    pub fn set_time_parameters(&mut self, t0: f64, tf: f64, step_size: f64) -> Result<(), Error> {
        self.control.set_time_parameters(t0, tf, step_size)
    }

    /// Sets the tolerance handed to the system's convergence test.
    ///
    /// # Errors
    ///
    /// Fails if `epsilon` is not finite and positive.
    pub fn set_convergence(&mut self, epsilon: f64) -> Result<(), Error> {
        self.control.set_convergence(epsilon)
    }

    /// Sets the Newton iteration limit per step.
    pub fn set_max_iterations(&mut self, max_iters: usize) {
        self.control.set_max_iterations(max_iters);
    }

    /// Sets what happens when Newton does not converge within a step.
    pub fn set_non_convergence(&mut self, policy: NonConvergence) {
        self.control.set_non_convergence(policy);
    }

    /// Overrides the seed policy of both partitions.
    ///
    /// # Errors
    ///
    /// Fails if the controller is initialized.
    pub fn set_seed_policy(&mut self, policy: SeedPolicy) -> Result<(), Error> {
        self.control.require_setup("set the seed policy")?;
        self.first.set_seed_policy(policy);
        self.second.set_seed_policy(policy);
        Ok(())
    }

    /// Writes derivative `order` (0 or 1) of the first-order partition to
    /// `path` after every committed step.
    ///
    /// # Errors
    ///
    /// Fails if `order` exceeds 1.
    pub fn set_output_file1(&mut self, path: impl AsRef<Path>, order: usize) -> Result<(), Error> {
        self.first.set_output_file(path.as_ref(), order)
    }

    /// Writes derivative `order` (0, 1 or 2) of the second-order partition to
    /// `path` after every committed step.
    ///
    /// # Errors
    ///
    /// Fails if `order` exceeds 2.
    pub fn set_output_file2(&mut self, path: impl AsRef<Path>, order: usize) -> Result<(), Error> {
        self.second.set_output_file(path.as_ref(), order)
    }

    /// Returns derivative `order` of the first-order partition `step` steps
    /// back.
    ///
    /// # Errors
    ///
    /// Fails if the order or step is not stored.
    pub fn configuration1(&self, order: usize, step: usize) -> Result<&DVector<f64>, Error> {
        Ok(self.first.history.conf(order, step)?)
    }

    /// Returns derivative `order` of the second-order partition `step` steps
    /// back.
    ///
    /// # Errors
    ///
    /// Fails if the order or step is not stored.
    pub fn configuration2(&self, order: usize, step: usize) -> Result<&DVector<f64>, Error> {
        Ok(self.second.history.conf(order, step)?)
    }

    #[must_use]
    pub fn history1(&self) -> &History {
        &self.first.history
    }

    #[must_use]
    pub fn history2(&self) -> &History {
        &self.second.history
    }

    /// Returns the time of the last committed step.
    #[must_use]
    pub fn time(&self) -> Option<f64> {
        self.first.history.current_time()
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.control.phase()
    }

    /// Returns `true` if both partitions have explicit integrators.
    #[must_use]
    pub fn is_integrator_explicit(&self) -> bool {
        self.first.is_explicit().unwrap_or(false) && self.second.is_explicit().unwrap_or(false)
    }

    /// Validates the setup, evaluates `qdot1` and `qddot2` and writes the
    /// initial output.
    ///
    /// # Errors
    ///
    /// Fails if either partition is missing its integrator or initial
    /// configuration, if time parameters are missing, or if the system fails
    /// to evaluate.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.control.require_setup("initialize")?;
        let integrator1 = self.first.check()?;
        let integrator2 = self.second.check()?;
        let time = self.control.time_parameters()?;

        self.first.prepare(&integrator1, time.start())?;
        self.second.prepare(&integrator2, time.start())?;
        self.evaluate(time.start(), true, true)?;

        self.first.outputs.write(&self.first.history);
        self.second.outputs.write(&self.second.history);
        self.control.configured();
        log::debug!(
            "partitioned problem initialized with {} / {} at t = {}",
            integrator1.method(),
            integrator2.method(),
            time.start()
        );
        Ok(())
    }

    /// Takes one step and passes the resulting [`Event`] to `observer`.
    ///
    /// Returns the observer's action.
    ///
    /// # Errors
    ///
    /// Fails if the controller is not initialized or already finished, if
    /// the system fails, or if Newton fails under [`NonConvergence::Fail`].
    pub fn step_solve<Obs>(&mut self, observer: &mut Obs) -> Result<Option<Action>, Error>
    where
        Obs: for<'e> Observer<Event<'e>, Action>,
    {
        control::step_solve(self, observer)
    }

    /// Integrates up to the final time, initializing first if needed.
    ///
    /// # Errors
    ///
    /// Returns the first initialization or step error.
    pub fn solve<Obs>(&mut self, observer: Obs) -> Result<Solution, Error>
    where
        Obs: for<'e> Observer<Event<'e>, Action>,
    {
        control::solve(self, observer)
    }

    /// Integrates up to the final time without observation.
    ///
    /// # Errors
    ///
    /// Returns the first initialization or step error.
    pub fn solve_unobserved(&mut self) -> Result<Solution, Error> {
        self.solve(())
    }

    /// Evaluates `qdot1` and `qddot2` at the current step.
    ///
    /// Only the partitions flagged by `write1` and `write2` receive the
    /// result; the others keep their current highest derivative.
    fn evaluate(&mut self, time: f64, write1: bool, write2: bool) -> Result<(), Error> {
        let (lower1, top1) = self.first.history.split_top_mut();
        let (lower2, top2) = self.second.history.split_top_mut();
        let size1 = top1.len();
        let size2 = top2.len();
        let qdot1 = if write1 { top1 } else { sized(&mut self.scratch1, size1) };
        let qddot2 = if write2 { top2 } else { sized(&mut self.scratch2, size2) };
        qdot1.fill(0.0);
        qddot2.fill(0.0);

        self.system
            .evaluate(&lower1[0][0], &lower2[0][0], &lower2[1][0], qdot1, qddot2, time)
            .map_err(Error::system)
    }

    /// Fills the freshly rotated current slots for the step ending at `time`.
    fn integrate(
        &mut self,
        integrator1: Integrator,
        integrator2: Integrator,
        time: f64,
    ) -> Result<Option<usize>, Error> {
        let explicit1 = integrator1.is_explicit();
        let explicit2 = integrator2.is_explicit();
        if explicit1 {
            integrator1.advance(&mut self.first.history);
        }
        if explicit2 {
            integrator2.advance(&mut self.second.history);
        }

        let iterations = if explicit1 && explicit2 {
            None
        } else {
            Some(self.solve_implicit(integrator1, integrator2, time)?)
        };

        if explicit1 || explicit2 {
            self.evaluate(time, explicit1, explicit2)?;
        }
        if explicit1 {
            integrator1.correct(&mut self.first.history);
        }
        if explicit2 {
            integrator2.correct(&mut self.second.history);
        }
        Ok(iterations)
    }

    /// Runs Newton over the configurations of the implicit partitions.
    ///
    /// An explicit partition enters the residual with its predicted values
    /// and its last committed highest derivative.
    fn solve_implicit(
        &mut self,
        integrator1: Integrator,
        integrator2: Integrator,
        time: f64,
    ) -> Result<usize, Error> {
        let explicit1 = integrator1.is_explicit();
        let explicit2 = integrator2.is_explicit();

        if explicit1 {
            hold_highest(&mut self.first.history);
        } else {
            integrator1.prepare(&self.first.history, &mut self.first.implicit);
        }
        if explicit2 {
            hold_highest(&mut self.second.history);
        } else {
            integrator2.prepare(&self.second.history, &mut self.second.implicit);
        }

        let q1 = self.first.history.current(0);
        let q2 = self.second.history.current(0);
        match (explicit1, explicit2) {
            (true, _) => self.control.seed(&[q2]),
            (false, true) => self.control.seed(&[q1]),
            (false, false) => self.control.seed(&[q1, q2]),
        }

        let size1 = q1.len();
        let size2 = q2.len();
        sized(&mut self.scratch1, size1);
        sized(&mut self.scratch2, size2);
        if explicit1 || explicit2 {
            let size = size1 + size2;
            if self.jacobian.shape() != (size, size) {
                self.jacobian = DMatrix::zeros(size, size);
            }
        }

        let step = self.first.history.steps_taken();
        let mut residual = Residual {
            system: self.system,
            first: &mut self.first.history,
            second: &mut self.second.history,
            implicit1: (!explicit1).then_some(&self.first.implicit),
            implicit2: (!explicit2).then_some(&self.second.implicit),
            residue1: &mut self.scratch1,
            residue2: &mut self.scratch2,
            full: &mut self.jacobian,
            time,
        };
        let iterations = self.control.run_newton(&mut residual, step, time)?;
        residual.sync(self.control.iterate());
        Ok(iterations)
    }
}

/// Resizes `buffer` to `size` if needed and returns it.
fn sized(buffer: &mut DVector<f64>, size: usize) -> &mut DVector<f64> {
    if buffer.len() != size {
        *buffer = DVector::zeros(size);
    }
    buffer
}

/// Holds the highest derivative at its last committed value.
fn hold_highest(history: &mut History) {
    if let Some(window) = history.windows_mut().last_mut()
        && let [current, committed, ..] = window.as_mut_slice()
    {
        current.copy_from(committed);
    }
}

impl<S: PartitionedSystem, L: LinearSolver> Controller for PartitionedProblem<'_, S, L> {
    fn phase(&self) -> Phase {
        self.control.phase()
    }

    fn start(&mut self) -> Result<(), Error> {
        self.initialize()
    }

    fn advance(&mut self) -> Result<Option<usize>, Error> {
        let step_size = self.control.begin_step()?;
        let integrator1 = *self.first.integrator()?;
        let integrator2 = *self.second.integrator()?;

        self.first.history.next_step(step_size)?;
        if let Err(error) = self.second.history.next_step(step_size) {
            self.first.history.undo_step()?;
            return Err(error.into());
        }
        let time = self.first.history.time(0)?;

        let iterations = match self.integrate(integrator1, integrator2, time) {
            Ok(iterations) => iterations,
            Err(error) => {
                self.first.history.undo_step()?;
                self.second.history.undo_step()?;
                return Err(error);
            }
        };

        self.first.outputs.write(&self.first.history);
        self.second.outputs.write(&self.second.history);
        self.control.end_step(time);
        Ok(iterations)
    }

    fn event(&self, iterations: Option<usize>) -> Event<'_> {
        Event {
            step: self.first.history.steps_taken(),
            time: self.first.history.current_time().unwrap_or_default(),
            iterations,
            first: Some(&self.first.history),
            second: Some(&self.second.history),
        }
    }

    fn solution(&self, status: Status) -> Solution {
        self.control.solution(
            status,
            self.first.history.steps_taken(),
            self.first.history.current_time().unwrap_or_default(),
        )
    }
}

/// The Newton system of one step over the implicit partitions.
///
/// The unknown stacks `q1` and then `q2`, each present only when its
/// partition has an implicit relation.
struct Residual<'s, S> {
    system: &'s S,
    first: &'s mut History,
    second: &'s mut History,
    implicit1: Option<&'s Implicit>,
    implicit2: Option<&'s Implicit>,
    residue1: &'s mut DVector<f64>,
    residue2: &'s mut DVector<f64>,
    full: &'s mut DMatrix<f64>,
    time: f64,
}

impl<S> Residual<'_, S> {
    /// Splits the iterate into the implicit histories and derives their rates.
    fn sync(&mut self, x: &DVector<f64>) {
        let size1 = self.residue1.len();
        let size2 = self.residue2.len();
        let mut offset = 0;

        if let Some(implicit) = self.implicit1 {
            self.first.current_mut(0).copy_from(&x.rows(0, size1));
            implicit.derive(self.first);
            offset = size1;
        }
        if let Some(implicit) = self.implicit2 {
            self.second.current_mut(0).copy_from(&x.rows(offset, size2));
            implicit.derive(self.second);
        }
    }

    /// Start and length of the solved block within `[q1; q2]`.
    fn solved(&self) -> (usize, usize) {
        let size1 = self.residue1.len();
        let size2 = self.residue2.len();
        match (self.implicit1.is_some(), self.implicit2.is_some()) {
            (true, true) => (0, size1 + size2),
            (true, false) => (0, size1),
            (false, true) => (size1, size2),
            (false, false) => (0, 0),
        }
    }
}

/// Views of both partitions at the current iterate.
fn states<'h>(
    first: &'h History,
    second: &'h History,
) -> (FirstOrderState<'h>, SecondOrderState<'h>) {
    (
        FirstOrderState {
            q: first.current(0),
            qdot: first.current(1),
        },
        SecondOrderState {
            q: second.current(0),
            qdot: second.current(1),
            qddot: second.current(2),
        },
    )
}

impl<S: PartitionedSystem> NonlinearSystem for Residual<'_, S> {
    type Error = S::Error;

    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), S::Error> {
        self.sync(x);
        let (first, second) = states(self.first, self.second);
        self.residue1.fill(0.0);
        self.residue2.fill(0.0);

        self.system
            .residue(self.residue1, self.residue2, first, second, self.time)?;

        let size1 = self.residue1.len();
        let mut offset = 0;
        if self.implicit1.is_some() {
            residue.rows_mut(0, size1).copy_from(&*self.residue1);
            offset = size1;
        }
        if self.implicit2.is_some() {
            residue
                .rows_mut(offset, self.residue2.len())
                .copy_from(&*self.residue2);
        }
        Ok(())
    }

    fn jacobian(&mut self, x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), S::Error> {
        self.sync(x);
        let (first, second) = states(self.first, self.second);
        let partials = Partials {
            first_qdot: self.implicit1.map_or(0.0, |implicit| implicit.sensitivity().qdot),
            second_qdot: self.implicit2.map_or(0.0, |implicit| implicit.sensitivity().qdot),
            second_qddot: self.implicit2.map_or(0.0, |implicit| implicit.sensitivity().qddot),
        };

        if self.implicit1.is_some() && self.implicit2.is_some() {
            return self
                .system
                .jacobian(jacobian, first, second, partials, self.time);
        }

        self.full.fill(0.0);
        self.system
            .jacobian(self.full, first, second, partials, self.time)?;
        let (start, size) = self.solved();
        jacobian.copy_from(&self.full.view((start, start), (size, size)));
        Ok(())
    }

    fn is_converged(&mut self, x: &DVector<f64>, residue: &DVector<f64>, epsilon: f64) -> bool {
        self.sync(x);
        let (first, second) = states(self.first, self.second);
        self.system
            .is_converged(first, second, residue, self.time, epsilon)
    }
}
