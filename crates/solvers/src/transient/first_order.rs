use std::path::Path;

use multistep_core::{FirstOrderSystem, LinearSolver, NonlinearSystem, Observer};
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

/// Time-stepping controller for a [`FirstOrderSystem`].
///
/// # Example
///
/// ```
/// use std::convert::Infallible;
///
/// use multistep_core::{DMatrix, DVector, FirstOrderSystem};
/// use multistep_solvers::{integrator::Method, transient::FirstOrderProblem};
///
/// /// qdot = -q
/// struct Decay;
///
/// impl FirstOrderSystem for Decay {
///     type Error = Infallible;
///
///     fn evaluate(&self, q: &DVector<f64>, qdot: &mut DVector<f64>, _t: f64) -> Result<(), Infallible> {
///         qdot.copy_from(&(-q));
///         Ok(())
///     }
///
///     fn residue(
///         &self,
///         residue: &mut DVector<f64>,
///         q: &DVector<f64>,
///         qdot: &DVector<f64>,
///         _t: f64,
///     ) -> Result<(), Infallible> {
///         residue.copy_from(&(qdot + q));
///         Ok(())
///     }
///
///     fn jacobian(
///         &self,
///         jacobian: &mut DMatrix<f64>,
///         _q: &DVector<f64>,
///         _qdot: &DVector<f64>,
///         partial_qdot: f64,
///         _t: f64,
///     ) -> Result<(), Infallible> {
///         jacobian.fill_with_identity();
///         *jacobian *= partial_qdot + 1.0;
///         Ok(())
///     }
/// }
///
/// let mut problem = FirstOrderProblem::new(&Decay);
/// problem.set_integrator(Method::Bdf(2))?;
/// problem.set_initial_configuration(&DVector::from_element(1, 1.0))?;
/// problem.set_time_parameters(0.0, 1.0, 0.01)?;
///
/// let solution = problem.solve_unobserved()?;
/// assert!((problem.configuration(0, 0)?[0] - (-1.0_f64).exp()).abs() < 1e-3);
/// assert_eq!(solution.steps, 100);
/// # Ok::<(), multistep_solvers::transient::Error>(())
/// ```
#[derive(Debug)]
pub struct FirstOrderProblem<'a, S, L = DenseLu> {
    system: &'a S,
    partition: Partition,
    control: Control<L>,
}

impl<'a, S: FirstOrderSystem> FirstOrderProblem<'a, S> {
    /// Creates a controller for `system` using dense LU for Newton updates.
    #[must_use]
    pub fn new(system: &'a S) -> Self {
        Self::with_linear_solver(system, DenseLu)
    }
}

impl<'a, S: FirstOrderSystem, L: LinearSolver> FirstOrderProblem<'a, S, L> {
    /// Creates a controller for `system` using `linear` for Newton updates.
    #[must_use]
    pub fn with_linear_solver(system: &'a S, linear: L) -> Self {
        Self {
            system,
            partition: Partition::new(1),
            control: Control::new(linear),
        }
    }

    /// Selects the integrator, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Fails if the method is invalid or the controller is initialized.
    pub fn set_integrator(&mut self, method: Method) -> Result<(), Error> {
        self.control.require_setup("select an integrator")?;
        self.partition.set_integrator(method)
    }

    /// Sets the initial configuration `q0`.
    ///
    /// # Errors
    ///
    /// Fails if the controller is initialized.
    pub fn set_initial_configuration(&mut self, q0: &DVector<f64>) -> Result<(), Error> {
        self.control.require_setup("set the initial configuration")?;
        self.partition.set_initial(&[q0])
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

    /// Overrides the integrator's seed policy for the order-0 value.
    ///
    /// # Errors
    ///
    /// Fails if the controller is initialized.
    pub fn set_seed_policy(&mut self, policy: SeedPolicy) -> Result<(), Error> {
        self.control.require_setup("set the seed policy")?;
        self.partition.set_seed_policy(policy);
        Ok(())
    }

    /// Writes derivative `order` (0 or 1) of every committed step to `path`.
    ///
    /// # Errors
    ///
    /// Fails if `order` exceeds 1. A file that cannot be opened is logged
    /// and skipped.
    pub fn set_output_file(&mut self, path: impl AsRef<Path>, order: usize) -> Result<(), Error> {
        self.partition.set_output_file(path.as_ref(), order)
    }

    /// Returns derivative `order` of the configuration `step` steps back.
    ///
    /// # Errors
    ///
    /// Fails if the order or step is not stored.
    pub fn configuration(&self, order: usize, step: usize) -> Result<&DVector<f64>, Error> {
        Ok(self.partition.history.conf(order, step)?)
    }

    /// Returns the configuration history.
    #[must_use]
    pub fn history(&self) -> &History {
        &self.partition.history
    }

    /// Returns the time of the last committed step.
    #[must_use]
    pub fn time(&self) -> Option<f64> {
        self.partition.history.current_time()
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.control.phase()
    }

    /// Returns `true` if an explicit integrator is selected.
    #[must_use]
    pub fn is_integrator_explicit(&self) -> bool {
        self.partition.is_explicit().unwrap_or(false)
    }

    /// Validates the setup, evaluates `qdot0` and writes the initial output.
    ///
    /// # Errors
    ///
    /// Fails if the integrator, initial configuration or time parameters are
    /// missing or incompatible, or if the system fails to evaluate.
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.control.require_setup("initialize")?;
        let integrator = self.partition.check()?;
        let time = self.control.time_parameters()?;
        self.partition.prepare(&integrator, time.start())?;

        let (lower, qdot) = self.partition.history.split_top_mut();
        qdot.fill(0.0);
        self.system
            .evaluate(&lower[0][0], qdot, time.start())
            .map_err(Error::system)?;

        self.partition.outputs.write(&self.partition.history);
        self.control.configured();
        log::debug!(
            "first-order problem initialized with {} at t = {}",
            integrator.method(),
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
    /// The observer receives an [`Event`] for the initial configuration and
    /// after every committed step, and may return [`Action::StopEarly`].
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
}

impl<S: FirstOrderSystem, L: LinearSolver> FirstOrderProblem<'_, S, L> {
    /// Fills the freshly rotated current slots for the step ending at `time`.
    fn integrate(&mut self, integrator: Integrator, time: f64) -> Result<Option<usize>, Error> {
        let history = &mut self.partition.history;

        if integrator.is_explicit() {
            integrator.advance(history);
            let (lower, qdot) = history.split_top_mut();
            qdot.fill(0.0);
            self.system
                .evaluate(&lower[0][0], qdot, time)
                .map_err(Error::system)?;
            integrator.correct(history);
            return Ok(None);
        }

        let implicit = &mut self.partition.implicit;
        integrator.prepare(history, implicit);
        self.control.seed(&[history.current(0)]);

        let step = history.steps_taken();
        let mut residual = Residual {
            system: self.system,
            history: &mut *history,
            implicit,
            time,
        };
        let iterations = self.control.run_newton(&mut residual, step, time)?;
        residual.sync(self.control.iterate());
        Ok(Some(iterations))
    }
}

impl<S: FirstOrderSystem, L: LinearSolver> Controller for FirstOrderProblem<'_, S, L> {
    fn phase(&self) -> Phase {
        self.control.phase()
    }

    fn start(&mut self) -> Result<(), Error> {
        self.initialize()
    }

    fn advance(&mut self) -> Result<Option<usize>, Error> {
        let step_size = self.control.begin_step()?;
        let integrator = *self.partition.integrator()?;

        self.partition.history.next_step(step_size)?;
        let time = self.partition.history.time(0)?;

        let iterations = match self.integrate(integrator, time) {
            Ok(iterations) => iterations,
            Err(error) => {
                self.partition.history.undo_step()?;
                return Err(error);
            }
        };

        self.partition.outputs.write(&self.partition.history);
        self.control.end_step(time);
        Ok(iterations)
    }

    fn event(&self, iterations: Option<usize>) -> Event<'_> {
        let history = &self.partition.history;
        Event {
            step: history.steps_taken(),
            time: history.current_time().unwrap_or_default(),
            iterations,
            first: Some(history),
            second: None,
        }
    }

    fn solution(&self, status: Status) -> Solution {
        let history = &self.partition.history;
        self.control.solution(
            status,
            history.steps_taken(),
            history.current_time().unwrap_or_default(),
        )
    }
}

/// The Newton system of one implicit step: unknown `q_{n+1}`.
struct Residual<'s, S> {
    system: &'s S,
    history: &'s mut History,
    implicit: &'s Implicit,
    time: f64,
}

impl<S> Residual<'_, S> {
    /// Writes the iterate into the history and derives `qdot` from it.
    fn sync(&mut self, x: &DVector<f64>) {
        self.history.current_mut(0).copy_from(x);
        self.implicit.derive(self.history);
    }
}

impl<S: FirstOrderSystem> NonlinearSystem for Residual<'_, S> {
    type Error = S::Error;

    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), S::Error> {
        self.sync(x);
        self.system.residue(
            residue,
            self.history.current(0),
            self.history.current(1),
            self.time,
        )
    }

    fn jacobian(&mut self, x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), S::Error> {
        self.sync(x);
        self.system.jacobian(
            jacobian,
            self.history.current(0),
            self.history.current(1),
            self.implicit.sensitivity().qdot,
            self.time,
        )
    }

    fn is_converged(&mut self, x: &DVector<f64>, residue: &DVector<f64>, epsilon: f64) -> bool {
        self.sync(x);
        self.system.is_converged(
            self.history.current(0),
            self.history.current(1),
            residue,
            self.time,
            epsilon,
        )
    }
}
