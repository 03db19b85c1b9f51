use nalgebra::{DMatrix, DVector};

/// Defines a first-order differential system.
///
/// The system is described both in explicit form, `qdot = f(q, t)`, used by
/// explicit integrators, and in residual form, `R(q, qdot, t) = 0`, used by
/// implicit integrators. An ODE `qdot = f(q, t)` typically writes
/// `R = qdot - f(q, t)`, whose jacobian is `partial_qdot * I - ∂f/∂q`.
///
/// Output buffers arrive sized and zero-filled.
pub trait FirstOrderSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the derivative `qdot` at configuration `q` and `time`.
    ///
    /// Called once at initialization for every integrator family, and once
    /// per step by explicit integrators.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn evaluate(&self, q: &DVector<f64>, qdot: &mut DVector<f64>, time: f64)
    -> Result<(), Self::Error>;

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
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Computes the composite jacobian `∂R/∂q + partial_qdot * ∂R/∂qdot`.
    ///
    /// `partial_qdot` is the sensitivity of `qdot` with respect to `q` implied
    /// by the active integrator.
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
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Returns `true` once the Newton iterate is accepted.
    ///
    /// Defaults to comparing the L2 norm of the residual against `epsilon`.
    fn is_converged(
        &self,
        _q: &DVector<f64>,
        _qdot: &DVector<f64>,
        residue: &DVector<f64>,
        _time: f64,
        epsilon: f64,
    ) -> bool {
        residue.norm() <= epsilon
    }
}
