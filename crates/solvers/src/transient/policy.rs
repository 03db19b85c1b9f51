/// What a controller does when Newton fails to converge within a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonConvergence {
    /// Abort the step with [`Error::NotConverged`](super::Error::NotConverged).
    #[default]
    Fail,

    /// Log a warning and commit the last iterate.
    Continue,
}
