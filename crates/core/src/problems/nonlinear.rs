use nalgebra::{DMatrix, DVector};

/// Defines a nonlinear system `R(x) = 0` to be solved by Newton iteration.
///
/// The solver owns the output buffers and hands them to the system already
/// sized and zero-filled; implementations only write into them.
///
/// Methods take `&mut self` so systems can cache intermediate results between
/// the residual and jacobian evaluations at the same `x`.
pub trait NonlinearSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Writes the residual `R(x)` into `residue`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the residual cannot be evaluated at `x`.
    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), Self::Error>;

    /// Writes the jacobian `∂R/∂x` into `jacobian`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the jacobian cannot be evaluated at `x`.
    fn jacobian(&mut self, x: &DVector<f64>, jacobian: &mut DMatrix<f64>)
    -> Result<(), Self::Error>;

    /// Returns `true` once the iterate is accepted as a solution.
    ///
    /// The default accepts when the L2 norm of the residual is at most
    /// `epsilon`. Override it to use another norm or a problem-specific test.
    fn is_converged(&mut self, _x: &DVector<f64>, residue: &DVector<f64>, epsilon: f64) -> bool {
        residue.norm() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    struct Linear;

    impl NonlinearSystem for Linear {
        type Error = Infallible;

        fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), Infallible> {
            residue.copy_from(x);
            Ok(())
        }

        fn jacobian(&mut self, _x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), Infallible> {
            jacobian.fill_with_identity();
            Ok(())
        }
    }

    #[test]
    fn default_convergence_uses_l2_norm() {
        let mut system = Linear;
        let x = DVector::zeros(2);

        // ‖(3e-4, 4e-4)‖₂ = 5e-4
        let residue = DVector::from_vec(vec![3e-4, 4e-4]);
        assert!(system.is_converged(&x, &residue, 6e-4));
        assert!(!system.is_converged(&x, &residue, 4e-4));
    }
}
