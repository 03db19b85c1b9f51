/// Control actions supported by the time-stepping controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current step and return the solution so far.
    StopEarly,
}
