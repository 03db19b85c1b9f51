/// Receives solver events and optionally returns a control action.
///
/// Solvers call [`Observer::observe`] at well-defined points (after a Newton
/// iteration, after a committed time step) and act on the returned action,
/// if any. Returning `None` lets the solver continue unchanged.
///
/// The trait is implemented for `()`, which ignores every event, and for any
/// closure `FnMut(&E) -> Option<A>`, so ad-hoc observers rarely need a named
/// type.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns an action for the solver.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Action {
        Stop,
    }

    fn drive<O: Observer<usize, Action>>(mut observer: O, events: &[usize]) -> Option<usize> {
        events
            .iter()
            .find(|event| observer.observe(event).is_some())
            .copied()
    }

    #[test]
    fn unit_never_acts() {
        assert_eq!(drive((), &[1, 2, 3]), None);
    }

    #[test]
    fn closure_can_stop() {
        let stop_at_two = |event: &usize| (*event == 2).then_some(Action::Stop);
        assert_eq!(drive(stop_at_two, &[1, 2, 3]), Some(2));
    }

    #[test]
    fn closure_can_capture_state() {
        let mut seen = Vec::new();
        let _ = drive(
            |event: &usize| {
                seen.push(*event);
                None
            },
            &[4, 5],
        );
        assert_eq!(seen, vec![4, 5]);
    }
}
