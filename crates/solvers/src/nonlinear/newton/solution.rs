/// Indicates how the Newton solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The system accepted the iterate.
    Converged,

    /// Reached the iteration limit without converging.
    MaxIters,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a Newton solve.
///
/// The final iterate is left in the vector passed to the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// How the solver terminated.
    pub status: Status,

    /// Number of updates applied.
    pub iters: usize,

    /// L2 norm of the residual at the final iterate.
    pub residual_norm: f64,
}

impl Solution {
    /// Returns `true` if the solver converged.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.status == Status::Converged
    }
}
