use std::convert::Infallible;

use approx::assert_relative_eq;
use multistep_core::{LinearSolver, NonlinearSystem, SingularMatrix};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use super::{Action, Config, Error, Event, Newton, Status};

/// Componentwise cubic: `x_i³ = (i + 1)⁶`, accepted on the L1 norm.
struct Cubic {
    size: usize,
    tolerance_checks: usize,
}

impl Cubic {
    fn new(size: usize) -> Self {
        Self {
            size,
            tolerance_checks: 0,
        }
    }

    fn target(i: usize) -> f64 {
        let base = (i + 1) as f64;
        base.powi(6)
    }
}

impl NonlinearSystem for Cubic {
    type Error = Infallible;

    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), Infallible> {
        for i in 0..self.size {
            residue[i] = x[i].powi(3) - Self::target(i);
        }
        Ok(())
    }

    fn jacobian(&mut self, x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), Infallible> {
        for i in 0..self.size {
            jacobian[(i, i)] = 3.0 * x[i].powi(2);
        }
        Ok(())
    }

    fn is_converged(&mut self, _x: &DVector<f64>, residue: &DVector<f64>, epsilon: f64) -> bool {
        self.tolerance_checks += 1;
        residue.lp_norm(1) < epsilon
    }
}

/// A linear system `A x = b`.
struct Affine {
    matrix: DMatrix<f64>,
    rhs: DVector<f64>,
}

impl NonlinearSystem for Affine {
    type Error = Infallible;

    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), Infallible> {
        residue.copy_from(&(&self.matrix * x - &self.rhs));
        Ok(())
    }

    fn jacobian(&mut self, _x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), Infallible> {
        jacobian.copy_from(&self.matrix);
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("residual undefined for negative x")]
struct NegativeInput;

/// `sqrt(x) - 2 = 0`, failing for negative inputs.
struct SquareRoot;

impl NonlinearSystem for SquareRoot {
    type Error = NegativeInput;

    fn residue(&mut self, x: &DVector<f64>, residue: &mut DVector<f64>) -> Result<(), NegativeInput> {
        if x[0] < 0.0 {
            return Err(NegativeInput);
        }
        residue[0] = x[0].sqrt() - 2.0;
        Ok(())
    }

    fn jacobian(&mut self, x: &DVector<f64>, jacobian: &mut DMatrix<f64>) -> Result<(), NegativeInput> {
        jacobian[(0, 0)] = 0.5 / x[0].sqrt();
        Ok(())
    }
}

#[test]
fn solves_componentwise_cubic() {
    let mut system = Cubic::new(5);
    let mut x = DVector::from_element(5, 1.0);
    let config = Config::new(100, 1e-3).expect("valid config");

    let solution = Newton::new(config)
        .solve_unobserved(&mut system, &mut x)
        .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert!(solution.iters > 0);
    for i in 0..5 {
        let expected = ((i + 1) as f64).powi(2);
        assert_relative_eq!(x[i], expected, max_relative = 1e-5);
    }
}

#[test]
fn converged_start_is_returned_untouched() {
    let mut system = Affine {
        matrix: DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]),
        rhs: DVector::from_vec(vec![2.0, 8.0]),
    };
    let mut x = DVector::from_vec(vec![1.0, 2.0]);

    let solution = Newton::default()
        .solve_unobserved(&mut system, &mut x)
        .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 0);
    assert_eq!(x, DVector::from_vec(vec![1.0, 2.0]));
}

#[test]
fn linear_system_converges_in_one_update() {
    let mut system = Affine {
        matrix: DMatrix::from_row_slice(2, 2, &[3.0, 1.0, 1.0, 2.0]),
        rhs: DVector::from_vec(vec![9.0, 8.0]),
    };
    let mut x = DVector::zeros(2);

    let solution = Newton::default()
        .solve_unobserved(&mut system, &mut x)
        .expect("should converge");

    assert_eq!(solution.status, Status::Converged);
    assert_eq!(solution.iters, 1);
    assert_relative_eq!(x[0], 2.0, epsilon = 1e-12);
    assert_relative_eq!(x[1], 3.0, epsilon = 1e-12);
}

#[test]
fn stops_at_iteration_limit() {
    let mut system = Cubic::new(3);
    let mut x = DVector::from_element(3, 1.0);
    let config = Config::new(2, 1e-12).expect("valid config");

    let solution = Newton::new(config)
        .solve_unobserved(&mut system, &mut x)
        .expect("should stop");

    assert_eq!(solution.status, Status::MaxIters);
    assert_eq!(solution.iters, 2);
    assert!(solution.residual_norm > 1e-12);
}

#[test]
fn reports_singular_jacobian() {
    let mut system = Affine {
        matrix: DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]),
        rhs: DVector::from_vec(vec![1.0, 1.0]),
    };
    let mut x = DVector::zeros(2);

    let error = Newton::default()
        .solve_unobserved(&mut system, &mut x)
        .expect_err("should fail");

    assert!(matches!(error, Error::SingularJacobian { iteration: 1 }));
}

#[test]
fn system_errors_are_propagated() {
    let mut x = DVector::from_element(1, -1.0);

    let error = Newton::default()
        .solve_unobserved(&mut SquareRoot, &mut x)
        .expect_err("should fail");

    assert!(matches!(error, Error::System(_)));
    assert_eq!(error.to_string(), "system error: residual undefined for negative x");
}

#[test]
fn observer_sees_each_update_and_can_stop() {
    let mut system = Cubic::new(2);
    let mut x = DVector::from_element(2, 1.0);
    let mut norms = Vec::new();

    let solution = Newton::default()
        .solve(&mut system, &mut x, |event: &Event<'_>| {
            norms.push(event.residual_norm());
            (event.iteration == 3).then_some(Action::StopEarly)
        })
        .expect("should stop early");

    assert_eq!(solution.status, Status::StoppedByObserver);
    assert_eq!(solution.iters, 3);
    assert_eq!(norms.len(), 3);
    assert_relative_eq!(solution.residual_norm, norms[2]);
}

/// Counts solves and forwards to the dense backend.
#[derive(Default)]
struct CountingSolver {
    calls: usize,
}

impl LinearSolver for CountingSolver {
    fn solve(&mut self, matrix: &DMatrix<f64>, rhs: &mut DVector<f64>) -> Result<(), SingularMatrix> {
        self.calls += 1;
        crate::linear::DenseLu.solve(matrix, rhs)
    }
}

#[test]
fn custom_linear_solver_is_used_once_per_update() {
    let mut system = Cubic::new(4);
    let mut x = DVector::from_element(4, 1.0);
    let mut newton = Newton::with_linear_solver(Config::default(), CountingSolver::default());

    let solution = newton
        .solve_unobserved(&mut system, &mut x)
        .expect("should converge");

    assert_eq!(newton.linear.calls, solution.iters);
    assert_eq!(system.tolerance_checks, solution.iters + 1);
}

#[test]
fn invalid_epsilon_is_rejected() {
    assert!(Config::new(10, 0.0).is_err());
    assert!(Config::new(10, f64::INFINITY).is_err());
    assert_eq!(Config::default().max_iters(), 100);
    assert_relative_eq!(Config::default().epsilon(), 1e-6);
}
