use nalgebra::{DMatrix, DVector};
use thiserror::Error;

/// The linear system could not be solved because the matrix is singular.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("matrix is singular")]
pub struct SingularMatrix;

/// A backend capable of solving `A x = b`.
///
/// The Newton solver calls [`LinearSolver::solve`] at most once per iteration.
/// Implementations may keep factorization workspaces between calls, which is
/// why `solve` takes `&mut self`.
pub trait LinearSolver {
    /// Solves `matrix * x = rhs`, overwriting `rhs` with `x`.
    ///
    /// # Errors
    ///
    /// Returns [`SingularMatrix`] if the system has no unique solution.
    fn solve(&mut self, matrix: &DMatrix<f64>, rhs: &mut DVector<f64>) -> Result<(), SingularMatrix>;
}

impl<L: LinearSolver + ?Sized> LinearSolver for &mut L {
    fn solve(&mut self, matrix: &DMatrix<f64>, rhs: &mut DVector<f64>) -> Result<(), SingularMatrix> {
        (**self).solve(matrix, rhs)
    }
}
