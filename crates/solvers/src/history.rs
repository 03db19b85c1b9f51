//! Windowed storage of a configuration and its time derivatives.
//!
//! A [`History`] keeps, for every derivative order `0..=d`, the last few
//! vectors computed by the integrator (most recent first), together with the
//! full timeline of committed steps.
//!
//! ```text
//! order 0:  q_n+1   q_n   q_n-1  ...
//! order 1:  qdot_n+1  qdot_n  ...
//! order 2:  qddot_n+1 ...
//! ```
//!
//! Advancing a step rotates every window in place: the oldest vector becomes
//! the new current slot and is overwritten by the integrator. No vector is
//! allocated after the windows have been sized.

mod error;

pub use error::HistoryError;

use nalgebra::DVector;

/// What [`History::next_step`] writes into the order-0 current slot after the
/// rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Copy the previous value, giving implicit solvers `q_n` as their
    /// starting guess for `q_n+1`.
    #[default]
    CopyPrevious,

    /// Leave the rotated-in (oldest) vector untouched.
    Keep,
}

/// Values and derivatives of a configuration over a sliding window of steps.
#[derive(Debug, Clone, Default)]
pub struct History {
    vector_size: Option<usize>,
    orders: Vec<Vec<DVector<f64>>>,
    time: Vec<f64>,
    last_step_size: f64,
    seed_policy: SeedPolicy,
    evicted: Vec<DVector<f64>>,
    undo: Option<f64>,
}

impl History {
    /// Creates an empty history with no vectors and an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history whose timeline starts at `t0`.
    #[must_use]
    pub fn starting_at(t0: f64) -> Self {
        let mut history = Self::new();
        history.set_time(t0);
        history
    }

    /// Sets the value of derivative `order` at the current step.
    ///
    /// The first call fixes the vector size. Derivative slots are created up
    /// to `order + 1`, so the highest stored derivative is always one above
    /// the highest initial condition.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::SizeMismatch`] if `values` does not match the
    /// size fixed by an earlier initial condition.
    pub fn set_initial_condition(
        &mut self,
        order: usize,
        values: &DVector<f64>,
    ) -> Result<(), HistoryError> {
        let size = match self.vector_size {
            None => {
                self.vector_size = Some(values.len());
                values.len()
            }
            Some(expected) if expected != values.len() => {
                return Err(HistoryError::SizeMismatch {
                    expected,
                    found: values.len(),
                });
            }
            Some(expected) => expected,
        };

        while self.orders.len() <= order + 1 {
            self.orders.push(vec![DVector::zeros(size)]);
        }
        self.orders[order][0].copy_from(values);
        self.undo = None;

        log::debug!("initial condition set for derivative order {order} (size {size})");
        Ok(())
    }

    /// Grows the per-order windows to the requested depths.
    ///
    /// Order 0 keeps `value` steps, orders `1..d` keep `intermediate` steps and
    /// the highest order `d` keeps `highest` steps. Windows never shrink; new
    /// slots are zero vectors.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NoInitialCondition`] if called before any
    /// initial condition has been set.
    pub fn set_stored_steps(
        &mut self,
        value: usize,
        intermediate: usize,
        highest: usize,
    ) -> Result<(), HistoryError> {
        let size = self.vector_size.ok_or(HistoryError::NoInitialCondition)?;
        let top = self.orders.len() - 1;

        for (order, window) in self.orders.iter_mut().enumerate() {
            let depth = match order {
                0 => value,
                o if o == top => highest,
                _ => intermediate,
            };
            while window.len() < depth {
                window.push(DVector::zeros(size));
            }
        }
        self.undo = None;

        log::debug!(
            "history windows resized to {:?}",
            self.orders.iter().map(Vec::len).collect::<Vec<_>>()
        );
        Ok(())
    }

    /// Appends a time value to the timeline.
    pub fn set_time(&mut self, time: f64) {
        self.time.push(time);
        self.undo = None;
    }

    /// Sets what [`History::next_step`] does with the order-0 current slot.
    pub fn set_seed_policy(&mut self, policy: SeedPolicy) {
        self.seed_policy = policy;
    }

    /// Returns the active seed policy.
    #[must_use]
    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    /// Advances the history by one step of size `step_size`.
    ///
    /// Every window is rotated so that the oldest vector becomes the current
    /// slot and all other vectors move one step back. The seed policy is then
    /// applied and `time + step_size` is appended to the timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeline is empty or the step size is not
    /// finite and positive.
    pub fn next_step(&mut self, step_size: f64) -> Result<(), HistoryError> {
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(HistoryError::InvalidStepSize(step_size));
        }
        let last = *self.time.last().ok_or(HistoryError::NoStartTime)?;

        self.evicted.resize_with(self.orders.len(), || DVector::zeros(0));
        for (window, evicted) in self.orders.iter_mut().zip(&mut self.evicted) {
            if let Some(oldest) = window.last() {
                evicted.clone_from(oldest);
            }
            window.rotate_right(1);
        }
        self.undo = Some(self.last_step_size);

        if self.seed_policy == SeedPolicy::CopyPrevious
            && let Some(values) = self.orders.first_mut()
            && values.len() > 1
        {
            let (current, previous) = values.split_at_mut(1);
            current[0].copy_from(&previous[0]);
        }

        self.last_step_size = step_size;
        self.time.push(last + step_size);

        log::debug!("advancing to step {} at t = {}", self.time.len() - 1, last + step_size);
        Ok(())
    }

    /// Reverts the most recent [`next_step`](Self::next_step).
    ///
    /// Every window and the timeline return to their state before that step,
    /// including the vector the rotation recycled. Only one step can be
    /// undone, and only until the windows are resized or the timeline is
    /// restarted.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::NothingToUndo`] if there is no step to revert.
    pub fn undo_step(&mut self) -> Result<(), HistoryError> {
        let step_size = self.undo.take().ok_or(HistoryError::NothingToUndo)?;

        for (window, evicted) in self.orders.iter_mut().zip(&self.evicted) {
            window.rotate_left(1);
            if let Some(oldest) = window.last_mut() {
                oldest.copy_from(evicted);
            }
        }
        self.time.pop();
        self.last_step_size = step_size;

        log::debug!("reverted to step {}", self.steps_taken());
        Ok(())
    }

    /// Returns the stored vector of derivative `order`, `step` steps back.
    ///
    /// `step = 0` is the current step.
    ///
    /// # Errors
    ///
    /// Returns an error if `order` or `step` is outside the stored range.
    pub fn conf(&self, order: usize, step: usize) -> Result<&DVector<f64>, HistoryError> {
        self.check(order, step)?;
        Ok(&self.orders[order][step])
    }

    /// Overwrites the stored vector of derivative `order`, `step` steps back.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot does not exist or `values` has the wrong
    /// size.
    pub fn set_conf(
        &mut self,
        order: usize,
        step: usize,
        values: &DVector<f64>,
    ) -> Result<(), HistoryError> {
        self.check(order, step)?;
        let slot = &mut self.orders[order][step];
        if slot.len() != values.len() {
            return Err(HistoryError::WrongSize {
                expected: slot.len(),
                found: values.len(),
            });
        }
        slot.copy_from(values);
        Ok(())
    }

    /// Returns the time `step` steps before the current one.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::TimeOutOfRange`] if the timeline is shorter
    /// than `step + 1`.
    pub fn time(&self, step: usize) -> Result<f64, HistoryError> {
        let size = self.time.len();
        if step >= size {
            return Err(HistoryError::TimeOutOfRange { step, size });
        }
        Ok(self.time[size - 1 - step])
    }

    /// Returns the most recent time, if any.
    #[must_use]
    pub fn current_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    /// Returns every committed time, oldest first.
    #[must_use]
    pub fn timeline(&self) -> &[f64] {
        &self.time
    }

    /// Returns the number of entries in the timeline.
    #[must_use]
    pub fn time_size(&self) -> usize {
        self.time.len()
    }

    /// Returns the number of steps taken since the start time.
    #[must_use]
    pub fn steps_taken(&self) -> usize {
        self.time.len().saturating_sub(1)
    }

    /// Returns the highest stored derivative order.
    #[must_use]
    pub fn diff_order(&self) -> usize {
        self.orders.len().saturating_sub(1)
    }

    /// Returns the vector size, or `None` before the first initial condition.
    #[must_use]
    pub fn vector_size(&self) -> Option<usize> {
        self.vector_size
    }

    /// Returns the size of the most recent step.
    #[must_use]
    pub fn last_step_size(&self) -> f64 {
        self.last_step_size
    }

    /// Returns the window depth of derivative `order` (0 if not stored).
    #[must_use]
    pub fn stored_steps(&self, order: usize) -> usize {
        self.orders.get(order).map_or(0, Vec::len)
    }

    /// Returns the current vector of `order`, panicking if it is not stored.
    pub(crate) fn current(&self, order: usize) -> &DVector<f64> {
        &self.orders[order][0]
    }

    /// Returns the window of `order` mutably and the window of `order + 1`.
    pub(crate) fn split_lower_mut(
        &mut self,
        order: usize,
    ) -> (&mut [DVector<f64>], &[DVector<f64>]) {
        let (lower, upper) = self.orders.split_at_mut(order + 1);
        (&mut lower[order], &upper[0])
    }

    /// Returns the window of `order` and the window of `order + 1` mutably.
    pub(crate) fn split_upper_mut(
        &mut self,
        order: usize,
    ) -> (&[DVector<f64>], &mut [DVector<f64>]) {
        let (lower, upper) = self.orders.split_at_mut(order + 1);
        (&lower[order], &mut upper[0])
    }

    /// Returns the current slot of `order` for writing.
    pub(crate) fn current_mut(&mut self, order: usize) -> &mut DVector<f64> {
        &mut self.orders[order][0]
    }

    /// Returns the window of `order`, most recent first.
    pub(crate) fn window(&self, order: usize) -> &[DVector<f64>] {
        &self.orders[order]
    }

    /// Returns every window, indexed by derivative order.
    pub(crate) fn windows(&self) -> &[Vec<DVector<f64>>] {
        &self.orders
    }

    pub(crate) fn windows_mut(&mut self) -> &mut [Vec<DVector<f64>>] {
        &mut self.orders
    }

    /// Returns the windows below the highest order together with the current
    /// highest-order slot.
    ///
    /// Only valid once an initial condition has been set.
    pub(crate) fn split_top_mut(&mut self) -> (&[Vec<DVector<f64>>], &mut DVector<f64>) {
        let top = self.diff_order();
        let (lower, upper) = self.orders.split_at_mut(top);
        (lower, &mut upper[0][0])
    }

    /// Restarts the timeline at `t0`, discarding any earlier entries.
    pub(crate) fn restart_at(&mut self, t0: f64) {
        self.time.clear();
        self.time.push(t0);
        self.last_step_size = 0.0;
        self.undo = None;
    }

    fn check(&self, order: usize, step: usize) -> Result<(), HistoryError> {
        let window = self.orders.get(order).ok_or(HistoryError::OrderOutOfRange {
            order,
            max: self.diff_order(),
        })?;
        if step >= window.len() {
            return Err(HistoryError::StepOutOfRange {
                order,
                step,
                stored: window.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn vector(values: &[f64]) -> DVector<f64> {
        DVector::from_column_slice(values)
    }

    #[test]
    fn first_initial_condition_fixes_size_and_orders() {
        let mut history = History::new();
        history
            .set_initial_condition(0, &vector(&[1.0, 2.0]))
            .expect("first condition");

        assert_eq!(history.vector_size(), Some(2));
        assert_eq!(history.diff_order(), 1);
        assert_eq!(history.conf(0, 0).unwrap(), &vector(&[1.0, 2.0]));
        assert_eq!(history.conf(1, 0).unwrap(), &vector(&[0.0, 0.0]));
    }

    #[test]
    fn second_order_conditions_add_a_slot() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[0.2, 0.0])).unwrap();
        history.set_initial_condition(1, &vector(&[0.0, 1.0])).unwrap();

        assert_eq!(history.diff_order(), 2);
        assert_eq!(history.conf(1, 0).unwrap(), &vector(&[0.0, 1.0]));
    }

    #[test]
    fn mismatched_initial_condition_fails() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[1.0, 2.0])).unwrap();

        let err = history
            .set_initial_condition(1, &vector(&[1.0, 2.0, 3.0]))
            .unwrap_err();

        assert_eq!(
            err,
            HistoryError::SizeMismatch {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn stored_steps_require_initial_condition() {
        let mut history = History::new();
        let err = history.set_stored_steps(2, 2, 3).unwrap_err();

        assert_eq!(err, HistoryError::NoInitialCondition);
        assert_eq!(history.stored_steps(0), 0);
    }

    #[test]
    fn stored_steps_grow_each_order() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();
        history.set_initial_condition(1, &vector(&[2.0])).unwrap();
        history.set_stored_steps(2, 4, 3).unwrap();

        assert_eq!(history.stored_steps(0), 2);
        assert_eq!(history.stored_steps(1), 4);
        assert_eq!(history.stored_steps(2), 3);

        // Windows never shrink.
        history.set_stored_steps(1, 1, 1).unwrap();
        assert_eq!(history.stored_steps(1), 4);
    }

    #[test]
    fn next_step_requires_start_time() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();

        assert_eq!(history.next_step(0.1), Err(HistoryError::NoStartTime));
    }

    #[test]
    fn next_step_rejects_bad_step_size() {
        let mut history = History::starting_at(0.0);
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();

        assert!(matches!(
            history.next_step(-0.1),
            Err(HistoryError::InvalidStepSize(_))
        ));
        assert!(matches!(
            history.next_step(f64::NAN),
            Err(HistoryError::InvalidStepSize(_))
        ));
    }

    #[test]
    fn rotation_keeps_written_and_committed_values() {
        let mut history = History::starting_at(0.0);
        history.set_seed_policy(SeedPolicy::Keep);
        history.set_initial_condition(0, &vector(&[0.0])).unwrap();
        history.set_stored_steps(3, 3, 3).unwrap();

        for k in 1..=3 {
            history.next_step(0.5).unwrap();
            let written = vector(&[f64::from(k)]);
            history.set_conf(0, 0, &written).unwrap();
            history.set_conf(1, 0, &(&written * 10.0)).unwrap();

            assert_eq!(history.conf(0, 0).unwrap(), &written);
            assert_relative_eq!(history.conf(0, 1).unwrap()[0], f64::from(k - 1));
            assert_relative_eq!(history.conf(1, 0).unwrap()[0], 10.0 * f64::from(k));
        }

        assert_relative_eq!(history.conf(0, 2).unwrap()[0], 1.0);
    }

    #[test]
    fn copy_previous_seeds_current_value() {
        let mut history = History::starting_at(0.0);
        history.set_initial_condition(0, &vector(&[3.0])).unwrap();
        history.set_stored_steps(3, 2, 2).unwrap();

        history.next_step(0.1).unwrap();

        assert_eq!(history.seed_policy(), SeedPolicy::CopyPrevious);
        assert_eq!(history.conf(0, 0).unwrap(), &vector(&[3.0]));
        assert_eq!(history.conf(0, 1).unwrap(), &vector(&[3.0]));
    }

    #[test]
    fn undo_restores_windows_and_timeline() {
        let mut history = History::starting_at(0.0);
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();
        history.set_stored_steps(3, 1, 1).unwrap();
        history.set_conf(1, 0, &vector(&[-1.0])).unwrap();

        history.next_step(0.1).unwrap();
        history.set_conf(0, 0, &vector(&[0.9])).unwrap();
        history.set_conf(1, 0, &vector(&[-0.9])).unwrap();
        history.next_step(0.2).unwrap();
        let before = history.clone();

        history.next_step(0.5).unwrap();
        history.set_conf(0, 0, &vector(&[7.0])).unwrap();
        history.set_conf(1, 0, &vector(&[7.0])).unwrap();
        history.undo_step().expect("should undo the last step");

        assert_eq!(history.steps_taken(), 2);
        assert_eq!(history.timeline(), before.timeline());
        assert_relative_eq!(history.last_step_size(), 0.2);
        for step in 0..3 {
            assert_eq!(history.conf(0, step), before.conf(0, step));
        }
        assert_eq!(history.conf(1, 0), before.conf(1, 0));
        assert_eq!(history.undo_step(), Err(HistoryError::NothingToUndo));
    }

    #[test]
    fn resizing_discards_the_undo() {
        let mut history = History::starting_at(0.0);
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();
        history.next_step(0.1).unwrap();
        history.set_stored_steps(2, 1, 1).unwrap();

        assert_eq!(history.undo_step(), Err(HistoryError::NothingToUndo));
        assert_eq!(history.steps_taken(), 1);
    }

    #[test]
    fn timeline_counts_committed_steps() {
        let mut history = History::starting_at(1.0);
        history.set_initial_condition(0, &vector(&[0.0])).unwrap();

        for _ in 0..4 {
            history.next_step(0.25).unwrap();
        }

        assert_eq!(history.time_size(), 5);
        assert_eq!(history.steps_taken(), 4);
        assert_relative_eq!(history.time(0).unwrap(), 2.0);
        assert_relative_eq!(history.time(4).unwrap(), 1.0);
        assert_relative_eq!(history.last_step_size(), 0.25);
        assert!(matches!(
            history.time(5),
            Err(HistoryError::TimeOutOfRange { step: 5, size: 5 })
        ));
    }

    #[test]
    fn out_of_range_access_is_checked() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[1.0])).unwrap();

        assert_eq!(
            history.conf(2, 0),
            Err(HistoryError::OrderOutOfRange { order: 2, max: 1 })
        );
        assert_eq!(
            history.conf(0, 1),
            Err(HistoryError::StepOutOfRange {
                order: 0,
                step: 1,
                stored: 1
            })
        );
    }

    #[test]
    fn set_conf_checks_size() {
        let mut history = History::new();
        history.set_initial_condition(0, &vector(&[1.0, 2.0])).unwrap();

        assert_eq!(
            history.set_conf(0, 0, &vector(&[1.0])),
            Err(HistoryError::WrongSize {
                expected: 2,
                found: 1
            })
        );
    }
}
