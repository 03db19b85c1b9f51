//! Linear solver backends.

use multistep_core::{LinearSolver, SingularMatrix};
use nalgebra::{DMatrix, DVector};

/// Dense LU factorization with partial pivoting.
///
/// The matrix is factorized on every call; no state is kept between solves.
///
/// # Allocation
///
/// nalgebra's LU factorizes in place and takes ownership of its matrix, so
/// every solve copies the `n × n` jacobian into a fresh allocation and leaves
/// the caller's matrix untouched. For large systems, or to reuse a
/// factorization across Newton iterations, supply a custom
/// [`LinearSolver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DenseLu;

impl LinearSolver for DenseLu {
    fn solve(&mut self, matrix: &DMatrix<f64>, rhs: &mut DVector<f64>) -> Result<(), SingularMatrix> {
        if !matrix.is_square() || matrix.nrows() != rhs.len() {
            return Err(SingularMatrix);
        }

        if matrix.clone().lu().solve_mut(rhs) && rhs.iter().all(|v| v.is_finite()) {
            Ok(())
        } else {
            Err(SingularMatrix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn solves_dense_system() {
        let matrix = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]);
        let mut rhs = DVector::from_vec(vec![1.0, 2.0]);

        DenseLu.solve(&matrix, &mut rhs).expect("should solve");

        // 4x + y = 1, 2x + 3y = 2
        assert_relative_eq!(rhs[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(rhs[1], 0.6, epsilon = 1e-12);
    }

    #[test]
    fn solve_leaves_the_matrix_untouched() {
        let matrix = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 2.0, 3.0]);
        let original = matrix.clone();
        let mut rhs = DVector::from_vec(vec![1.0, 2.0]);
        let mut solver = DenseLu;

        solver.solve(&matrix, &mut rhs).expect("should solve");
        solver.solve(&matrix, &mut rhs).expect("should solve again");

        assert_eq!(matrix, original);
    }

    #[test]
    fn reports_singular_matrix() {
        let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let mut rhs = DVector::from_vec(vec![1.0, 1.0]);

        assert_eq!(DenseLu.solve(&matrix, &mut rhs), Err(SingularMatrix));
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let matrix = DMatrix::identity(3, 3);
        let mut rhs = DVector::zeros(2);

        assert_eq!(DenseLu.solve(&matrix, &mut rhs), Err(SingularMatrix));
    }
}
