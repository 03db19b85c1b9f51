use nalgebra::{DMatrix, DVector};

/// Configuration of the first-order partition at the step being solved.
#[derive(Debug, Clone, Copy)]
pub struct FirstOrderState<'a> {
    pub q: &'a DVector<f64>,
    pub qdot: &'a DVector<f64>,
}

/// Configuration of the second-order partition at the step being solved.
#[derive(Debug, Clone, Copy)]
pub struct SecondOrderState<'a> {
    pub q: &'a DVector<f64>,
    pub qdot: &'a DVector<f64>,
    pub qddot: &'a DVector<f64>,
}

/// Integrator sensitivities of the derived unknowns with respect to `q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partials {
    /// `∂qdot/∂q` of the first-order partition.
    pub first_qdot: f64,

    /// `∂qdot/∂q` of the second-order partition.
    pub second_qdot: f64,

    /// `∂qddot/∂q` of the second-order partition.
    pub second_qddot: f64,
}

/// Defines a partitioned system: a first-order set of equations coupled with a
/// second-order set.
///
/// The jacobian is always requested over the stacked unknown `[q1; q2]`:
/// square of size `n1 + n2` with the first-order block first. When only one
/// partition is implicit, the solver keeps that partition's diagonal block.
///
/// Output buffers arrive sized and zero-filled.
pub trait PartitionedSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the highest derivatives of both partitions.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivatives cannot be computed.
    fn evaluate(
        &self,
        q1: &DVector<f64>,
        q2: &DVector<f64>,
        qdot2: &DVector<f64>,
        qdot1: &mut DVector<f64>,
        qddot2: &mut DVector<f64>,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Computes the residuals of both partitions at a trial state.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residuals cannot be computed.
    fn residue(
        &self,
        residue1: &mut DVector<f64>,
        residue2: &mut DVector<f64>,
        first: FirstOrderState<'_>,
        second: SecondOrderState<'_>,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Computes the composite jacobian over `[q1; q2]`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the jacobian cannot be computed.
    fn jacobian(
        &self,
        jacobian: &mut DMatrix<f64>,
        first: FirstOrderState<'_>,
        second: SecondOrderState<'_>,
        partials: Partials,
        time: f64,
    ) -> Result<(), Self::Error>;

    /// Returns `true` once the Newton iterate is accepted.
    ///
    /// `residue` holds the rows of the partitions being solved: the stacked
    /// `[R1; R2]` when both are implicit, otherwise only the implicit one's.
    /// Defaults to comparing its L2 norm against `epsilon`.
    fn is_converged(
        &self,
        _first: FirstOrderState<'_>,
        _second: SecondOrderState<'_>,
        residue: &DVector<f64>,
        _time: f64,
        epsilon: f64,
    ) -> bool {
        residue.norm() <= epsilon
    }
}
