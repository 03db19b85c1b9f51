//! Trajectory recording for time-stepping controllers.

use multistep_core::{DVector, Observer};
use multistep_solvers::{history::History, transient::Event};

/// Selects which configuration of a [`transient::Event`] to read.
///
/// [`transient::Event`]: multistep_solvers::transient::Event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// The first-order configuration (the only one of a first-order problem).
    First,

    /// The second-order configuration (the only one of a second-order problem).
    Second,
}

impl Partition {
    fn history<'a>(self, event: &Event<'a>) -> Option<&'a History> {
        match self {
            Self::First => event.first,
            Self::Second => event.second,
        }
    }
}

/// Selects one scalar of a transient event: a component of a derivative of
/// one configuration at the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Configuration to read.
    pub partition: Partition,

    /// Derivative order (0 for the configuration itself).
    pub order: usize,

    /// Component index within the vector.
    pub component: usize,
}

impl Probe {
    /// Creates a probe on the first-order configuration.
    #[must_use]
    pub fn first(order: usize, component: usize) -> Self {
        Self {
            partition: Partition::First,
            order,
            component,
        }
    }

    /// Creates a probe on the second-order configuration.
    #[must_use]
    pub fn second(order: usize, component: usize) -> Self {
        Self {
            partition: Partition::Second,
            order,
            component,
        }
    }

    /// Reads the selected value, or `None` if the event does not carry it.
    #[must_use]
    pub fn sample(&self, event: &Event<'_>) -> Option<f64> {
        let history = self.partition.history(event)?;
        let values = history.conf(self.order, 0).ok()?;
        values.get(self.component).copied()
    }
}

/// An observer that stores one derivative of one configuration at every step.
///
/// Events that do not carry the selected configuration or order are skipped.
/// The recorder never returns an action.
///
/// # Example
///
/// ```ignore
/// let mut positions = Recorder::new(Partition::Second, 0);
/// problem.solve(&mut positions)?;
/// let trace = positions.component(0);
/// ```
#[derive(Debug, Clone)]
pub struct Recorder {
    partition: Partition,
    order: usize,
    samples: Vec<(f64, DVector<f64>)>,
}

impl Recorder {
    /// Creates an empty recorder for derivative `order` of `partition`.
    #[must_use]
    pub fn new(partition: Partition, order: usize) -> Self {
        Self {
            partition,
            order,
            samples: Vec::new(),
        }
    }

    /// Returns the recorded `(time, vector)` pairs in step order.
    #[must_use]
    pub fn samples(&self) -> &[(f64, DVector<f64>)] {
        &self.samples
    }

    /// Returns the recorded times.
    pub fn times(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|(time, _)| *time)
    }

    /// Returns `[time, value]` points for one vector component.
    ///
    /// Samples too short to hold `component` are skipped.
    #[must_use]
    pub fn component(&self, component: usize) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .filter_map(|(time, values)| values.get(component).map(|value| [*time, *value]))
            .collect()
    }

    /// Returns the number of recorded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Discards all recorded samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn record(&mut self, event: &Event<'_>) {
        let Some(history) = self.partition.history(event) else {
            return;
        };
        if let Ok(values) = history.conf(self.order, 0) {
            self.samples.push((event.time, values.clone()));
        }
    }
}

impl<A> Observer<Event<'_>, A> for Recorder {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        self.record(event);
        None
    }
}

/// Allows `&mut Recorder` to be passed to controllers that take an observer
/// by value, so the samples can be read after the solve completes.
impl<A> Observer<Event<'_>, A> for &mut Recorder {
    fn observe(&mut self, event: &Event<'_>) -> Option<A> {
        (*self).record(event);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use multistep_core::{DMatrix, SecondOrderSystem};
    use multistep_solvers::{integrator::Method, transient::SecondOrderProblem};

    /// qddot = -q
    struct Spring;

    impl SecondOrderSystem for Spring {
        type Error = std::convert::Infallible;

        fn evaluate(
            &self,
            q: &DVector<f64>,
            _qdot: &DVector<f64>,
            qddot: &mut DVector<f64>,
            _t: f64,
        ) -> Result<(), Self::Error> {
            qddot.copy_from(&(-q));
            Ok(())
        }

        fn residue(
            &self,
            residue: &mut DVector<f64>,
            q: &DVector<f64>,
            _qdot: &DVector<f64>,
            qddot: &DVector<f64>,
            _t: f64,
        ) -> Result<(), Self::Error> {
            residue.copy_from(&(qddot + q));
            Ok(())
        }

        fn jacobian(
            &self,
            jacobian: &mut DMatrix<f64>,
            _q: &DVector<f64>,
            _qdot: &DVector<f64>,
            _partial_qdot: f64,
            partial_qddot: f64,
            _t: f64,
        ) -> Result<(), Self::Error> {
            jacobian.fill_with_identity();
            *jacobian *= partial_qddot + 1.0;
            Ok(())
        }
    }

    fn history(values: &[f64]) -> History {
        let mut history = History::starting_at(0.5);
        history
            .set_initial_condition(0, &DVector::from_column_slice(values))
            .expect("should accept the first condition");
        history
    }

    fn event<'a>(first: Option<&'a History>, second: Option<&'a History>) -> Event<'a> {
        Event {
            step: 0,
            time: 0.5,
            iterations: None,
            first,
            second,
        }
    }

    #[test]
    fn probe_reads_selected_component() {
        let first = history(&[1.0, 2.0]);
        let second = history(&[3.0]);
        let event = event(Some(&first), Some(&second));

        assert_eq!(Probe::first(0, 1).sample(&event), Some(2.0));
        assert_eq!(Probe::second(0, 0).sample(&event), Some(3.0));
        assert_eq!(Probe::first(1, 0).sample(&event), Some(0.0));
    }

    #[test]
    fn probe_skips_missing_values() {
        let first = history(&[1.0]);
        let event = event(Some(&first), None);

        assert_eq!(Probe::second(0, 0).sample(&event), None);
        assert_eq!(Probe::first(5, 0).sample(&event), None);
        assert_eq!(Probe::first(0, 3).sample(&event), None);
    }

    #[test]
    fn recorder_skips_events_without_its_partition() {
        let first = history(&[1.0]);
        let mut recorder = Recorder::new(Partition::Second, 0);

        let _: Option<()> = recorder.observe(&event(Some(&first), None));
        assert!(recorder.is_empty());
    }

    #[test]
    fn records_every_step_of_a_solve() {
        let mut problem = SecondOrderProblem::new(&Spring);
        problem
            .set_integrator(Method::CentralDifference)
            .expect("should accept central difference");
        problem
            .set_initial_configuration(
                &DVector::from_element(1, 1.0),
                &DVector::from_element(1, 0.0),
            )
            .expect("should accept initial conditions");
        problem
            .set_time_parameters(0.0, 1.0, 0.01)
            .expect("should accept time parameters");

        let mut positions = Recorder::new(Partition::Second, 0);
        let mut accelerations = Recorder::new(Partition::Second, 2);
        problem.solve(&mut positions).expect("should solve");

        assert_eq!(positions.len(), 101);
        let times: Vec<f64> = positions.times().collect();
        assert_relative_eq!(times[0], 0.0);
        assert_relative_eq!(times[100], 1.0, epsilon = 1e-9);

        let trace = positions.component(0);
        assert_relative_eq!(trace[0][1], 1.0);
        assert_relative_eq!(trace[100][1], 1.0_f64.cos(), epsilon = 1e-4);

        // Nothing recorded once the controller has finished.
        problem.solve(&mut accelerations).expect("should be a no-op");
        assert!(accelerations.is_empty());

        positions.clear();
        assert!(positions.component(0).is_empty());
    }
}
