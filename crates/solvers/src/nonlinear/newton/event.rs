use nalgebra::DVector;

/// Event emitted by the Newton solver after each update.
///
/// No event is emitted for the initial residual evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Number of updates applied so far (1 for the first event).
    pub iteration: usize,

    /// The updated iterate.
    pub x: &'a DVector<f64>,

    /// Residual at the updated iterate.
    pub residual: &'a DVector<f64>,

    /// Increment applied in this update.
    pub increment: &'a DVector<f64>,
}

impl Event<'_> {
    /// Returns the L2 norm of the residual.
    #[must_use]
    pub fn residual_norm(&self) -> f64 {
        self.residual.norm()
    }
}
