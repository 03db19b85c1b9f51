/// Indicates how a time integration terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the final time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a time integration.
///
/// The integrated values stay in the controller's histories and output files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// How the integration terminated.
    pub status: Status,

    /// Number of committed steps.
    pub steps: usize,

    /// Time of the last committed step.
    pub time: f64,

    /// Total Newton updates over all steps (0 for explicit schemes).
    pub newton_iters: usize,

    /// Steps committed without Newton convergence under
    /// [`NonConvergence::Continue`](super::NonConvergence::Continue).
    pub unconverged_steps: usize,
}
