use nalgebra::{DMatrix, DVector};

/// Defines a second-order differential system.
///
/// Explicit integrators use `qddot = f(q, qdot, t)`; implicit integrators use
/// the residual form `R(q, qdot, qddot, t) = 0`. For a structural system
/// `M qddot + C qdot + K q = F(t)` the residual is the equation itself and the
/// jacobian is `partial_qddot * M + partial_qdot * C + K`.
///
/// Output buffers arrive sized and zero-filled.
pub trait SecondOrderSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the acceleration `qddot` at `(q, qdot, time)`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the acceleration cannot be computed.
    fn evaluate(
        &self,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        qddot: &mut DVector<f64>,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Computes the residual of the system at a trial state.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residual cannot be computed.
    fn residue(
        &self,
        residue: &mut DVector<f64>,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        qddot: &DVector<f64>,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Computes the composite jacobian
    /// `∂R/∂q + partial_qdot * ∂R/∂qdot + partial_qddot * ∂R/∂qddot`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the jacobian cannot be computed.
    fn jacobian(
        &self,
        jacobian: &mut DMatrix<f64>,
        q: &DVector<f64>,
        qdot: &DVector<f64>,
        partial_qdot: f64,
        partial_qddot: f64,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Returns `true` once the Newton iterate is accepted.
    ///
    /// Defaults to comparing the L2 norm of the residual against `epsilon`.
    fn is_converged(
        &self,
        _q: &DVector<f64>,
        _qdot: &DVector<f64>,
        _qddot: &DVector<f64>,
        residue: &DVector<f64>,
        _time: f64,
        epsilon: f64,
    ) -> bool {
        residue.norm() <= epsilon
    }
}
