use multistep_core::{LinearSolver, NonlinearSystem, Observer};
use nalgebra::DVector;

use crate::nonlinear::newton::{self, Newton};

use super::{
    Action, Error, Event, NonConvergence, Phase, Solution, Status, TimeParameters,
};

/// Settings and run state shared by every controller.
#[derive(Debug)]
pub(crate) struct Control<L> {
    phase: Phase,
    time: Option<TimeParameters>,
    non_convergence: NonConvergence,
    newton: Newton<L>,
    iterate: DVector<f64>,
    newton_iters: usize,
    unconverged_steps: usize,
}

impl<L: LinearSolver> Control<L> {
    pub(crate) fn new(linear: L) -> Self {
        Self {
            phase: Phase::Uninitialized,
            time: None,
            non_convergence: NonConvergence::default(),
            newton: Newton::with_linear_solver(newton::Config::default(), linear),
            iterate: DVector::zeros(0),
            newton_iters: 0,
            unconverged_steps: 0,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Fails unless the controller is still being set up.
    pub(crate) fn require_setup(&self, operation: &'static str) -> Result<(), Error> {
        if self.phase == Phase::Uninitialized {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                phase: self.phase,
                operation,
            })
        }
    }

    pub(crate) fn set_time_parameters(&mut self, t0: f64, tf: f64, step_size: f64) -> Result<(), Error> {
        self.require_setup("set time parameters")?;
        self.time = Some(TimeParameters::new(t0, tf, step_size)?);
        Ok(())
    }

    pub(crate) fn time_parameters(&self) -> Result<TimeParameters, Error> {
        self.time.ok_or(Error::MissingTimeParameters)
    }

    pub(crate) fn set_convergence(&mut self, epsilon: f64) -> Result<(), Error> {
        let config = newton::Config::new(self.newton.config().max_iters(), epsilon)?;
        self.newton.set_config(config);
        Ok(())
    }

    pub(crate) fn set_max_iterations(&mut self, max_iters: usize) {
        let config = self.newton.config().with_max_iters(max_iters);
        self.newton.set_config(config);
    }

    pub(crate) fn set_non_convergence(&mut self, policy: NonConvergence) {
        self.non_convergence = policy;
    }

    /// Marks the end of a successful initialization.
    pub(crate) fn configured(&mut self) {
        self.phase = Phase::Configured;
        self.newton_iters = 0;
        self.unconverged_steps = 0;
    }

    /// Checks that a step may be taken and returns its size.
    pub(crate) fn begin_step(&self) -> Result<f64, Error> {
        if !self.phase.can_step() {
            return Err(Error::InvalidPhase {
                phase: self.phase,
                operation: "step",
            });
        }
        Ok(self.time_parameters()?.step_size())
    }

    /// Commits the step at `time`, finishing once the final time is reached.
    pub(crate) fn end_step(&mut self, time: f64) {
        let finished = self.time.is_some_and(|params| params.is_finished(time));
        self.phase = if finished {
            Phase::Finished
        } else {
            Phase::Stepping
        };
    }

    /// Copies `parts` end to end into the Newton iterate.
    pub(crate) fn seed(&mut self, parts: &[&DVector<f64>]) {
        let size = parts.iter().map(|part| part.len()).sum();
        if self.iterate.len() != size {
            self.iterate = DVector::zeros(size);
        }

        let mut offset = 0;
        for part in parts {
            self.iterate.rows_mut(offset, part.len()).copy_from(*part);
            offset += part.len();
        }
    }

    pub(crate) fn iterate(&self) -> &DVector<f64> {
        &self.iterate
    }

    /// Runs Newton from the seeded iterate and applies the
    /// non-convergence policy, returning the number of updates.
    pub(crate) fn run_newton<S: NonlinearSystem>(
        &mut self,
        system: &mut S,
        step: usize,
        time: f64,
    ) -> Result<usize, Error> {
        let solution = self.newton.solve_unobserved(system, &mut self.iterate)?;
        self.newton_iters += solution.iters;

        if solution.is_converged() {
            return Ok(solution.iters);
        }

        match self.non_convergence {
            NonConvergence::Fail => Err(Error::NotConverged {
                step,
                time,
                iterations: solution.iters,
            }),
            NonConvergence::Continue => {
                log::warn!(
                    "step {step} (t = {time}) committed without convergence, |R| = {:e}",
                    solution.residual_norm
                );
                self.unconverged_steps += 1;
                Ok(solution.iters)
            }
        }
    }

    pub(crate) fn solution(&self, status: Status, steps: usize, time: f64) -> Solution {
        Solution {
            status,
            steps,
            time,
            newton_iters: self.newton_iters,
            unconverged_steps: self.unconverged_steps,
        }
    }
}

/// The stepping surface shared by every controller.
pub(crate) trait Controller {
    fn phase(&self) -> Phase;

    /// Runs the controller's initialization.
    fn start(&mut self) -> Result<(), Error>;

    /// Takes one step, returning the Newton updates spent on it.
    fn advance(&mut self) -> Result<Option<usize>, Error>;

    /// Describes the last committed step.
    fn event(&self, iterations: Option<usize>) -> Event<'_>;

    fn solution(&self, status: Status) -> Solution;
}

/// Takes one step and hands the resulting event to `observer`.
pub(crate) fn step_solve<C, Obs>(controller: &mut C, observer: &mut Obs) -> Result<Option<Action>, Error>
where
    C: Controller,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    let iterations = controller.advance()?;
    Ok(observer.observe(&controller.event(iterations)))
}

/// Steps until the final time or until the observer stops the run.
pub(crate) fn solve<C, Obs>(controller: &mut C, mut observer: Obs) -> Result<Solution, Error>
where
    C: Controller,
    Obs: for<'e> Observer<Event<'e>, Action>,
{
    if controller.phase() == Phase::Uninitialized {
        controller.start()?;
    }

    if controller.phase() == Phase::Configured
        && let Some(Action::StopEarly) = observer.observe(&controller.event(None))
    {
        return Ok(controller.solution(Status::StoppedByObserver));
    }

    while controller.phase().can_step() {
        if let Some(Action::StopEarly) = step_solve(controller, &mut observer)? {
            return Ok(controller.solution(Status::StoppedByObserver));
        }
    }

    Ok(controller.solution(Status::Complete))
}
