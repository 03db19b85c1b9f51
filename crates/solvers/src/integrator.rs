//! Fixed-step multistep integrators.
//!
//! An [`Integrator`] advances a [`History`] by one step. Explicit schemes
//! predict the new values from committed history alone; implicit schemes
//! relate the unknown order-0 value to the higher derivatives so that a
//! Newton iteration can solve for it.
//!
//! # Families
//!
//! | key         | kind     | systems          |
//! |-------------|----------|------------------|
//! | `AB-1..5`   | explicit | first and second |
//! | `AM-1..5`   | implicit | first and second |
//! | `BDF-1..5`  | implicit | first and second |
//! | `CD`        | explicit | second only      |
//! | `NEWMARK`   | implicit | second only      |
//!
//! Multistep formulas apply to every derivative level below the highest one,
//! so a second-order system integrates `q` from the `qdot` history and `qdot`
//! from the `qddot` history. Until enough steps have been committed the
//! effective order is reduced, so only committed history is ever read.
//!
//! # Implicit relation
//!
//! For a trial `q_{n+1}` every implicit scheme can be written as
//!
//! ```text
//! qdot_{n+1}  = (q_{n+1} - known_0) / c
//! qddot_{n+1} = (qdot_{n+1} - known_1) / c          (multistep)
//! ```
//!
//! with `c = h a_0` (Adams-Moulton) or `c = h β` (BDF), while Newmark uses
//! `qddot_{n+1} = (q_{n+1} - known_0) / (β h²)` and
//! `qdot_{n+1} = known_1 + γ h qddot_{n+1}`. The sensitivities of the derived
//! values with respect to `q_{n+1}` are handed to the system jacobian.

mod adams_bashforth;
mod adams_moulton;
mod bdf;
mod central_difference;
mod error;
mod implicit;
mod method;
mod newmark;

pub use error::Error;
pub use method::Method;

pub(crate) use implicit::Implicit;

use crate::history::{History, SeedPolicy};

/// Window depths a [`History`] needs for a given integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredSteps {
    /// Depth of the order-0 window.
    pub value: usize,

    /// Depth of the windows strictly between order 0 and the highest order.
    pub intermediate: usize,

    /// Depth of the highest-order window.
    pub highest: usize,
}

/// A validated integration scheme.
///
/// # Accuracy
///
/// Multistep schemes start from a single initial condition, so step `n`
/// runs at order `min(k, n)` until `k` steps are committed. The first step
/// is therefore first order, and its `O(h²)` local error carries into the
/// global solution. Over a fixed interval AB-k and BDF-k with `k > 2` then
/// converge at roughly second order rather than order `k`; the extra order
/// only shows in the error constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Integrator {
    method: Method,
}

impl Integrator {
    /// Creates an integrator from a method selector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedOrder`] for a multistep order outside
    /// `1..=5` and [`Error::InvalidNewmark`] for invalid Newmark parameters.
    pub fn new(method: Method) -> Result<Self, Error> {
        method.validate()?;
        log::debug!("integrator {method} selected");
        Ok(Self { method })
    }

    /// Returns the method this integrator was built from.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the nominal order of accuracy.
    ///
    /// Central difference and Newmark report 2.
    #[must_use]
    pub fn order(&self) -> usize {
        match self.method {
            Method::AdamsBashforth(k) | Method::AdamsMoulton(k) | Method::Bdf(k) => k,
            Method::CentralDifference | Method::Newmark { .. } => 2,
        }
    }

    /// Returns `true` if the scheme needs no nonlinear solve.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        matches!(
            self.method,
            Method::AdamsBashforth(_) | Method::CentralDifference
        )
    }

    /// Returns the coefficient table at the nominal order.
    ///
    /// Adams-Bashforth and Adams-Moulton return their weights `b_i` / `a_i`,
    /// BDF returns the weights `α_1..α_k` followed by `β`, Newmark returns
    /// `[β, γ]` and central difference returns an empty table.
    #[must_use]
    pub fn coefficients(&self) -> Vec<f64> {
        match self.method {
            Method::AdamsBashforth(k) => adams_bashforth::COEFFICIENTS[k - 1].to_vec(),
            Method::AdamsMoulton(k) => adams_moulton::COEFFICIENTS[k - 1].to_vec(),
            Method::Bdf(k) => {
                let mut table = bdf::ALPHA[k - 1].to_vec();
                table.push(bdf::BETA[k - 1]);
                table
            }
            Method::CentralDifference => Vec::new(),
            Method::Newmark { beta, gamma } => vec![beta, gamma],
        }
    }

    /// Returns the window depths the history must provide.
    #[must_use]
    pub fn stored_steps(&self) -> StoredSteps {
        let (value, intermediate, highest) = match self.method {
            Method::AdamsBashforth(k) => (2, (k + 1).max(2), k + 1),
            Method::AdamsMoulton(k) => (2, k.max(2), k.max(1)),
            Method::Bdf(k) => (k + 1, k + 1, 1),
            Method::CentralDifference | Method::Newmark { .. } => (2, 2, 2),
        };
        StoredSteps {
            value,
            intermediate,
            highest,
        }
    }

    /// Returns the lowest differential order the scheme can integrate.
    #[must_use]
    pub fn min_diff_order(&self) -> usize {
        match self.method {
            Method::CentralDifference | Method::Newmark { .. } => 2,
            _ => 1,
        }
    }

    /// Returns the default seed policy for the order-0 slot.
    ///
    /// Implicit schemes start Newton from the previous value; explicit
    /// schemes overwrite the slot anyway.
    #[must_use]
    pub fn seed_policy(&self) -> SeedPolicy {
        if self.is_explicit() {
            SeedPolicy::Keep
        } else {
            SeedPolicy::CopyPrevious
        }
    }

    /// Predicts every order below the highest from committed history.
    ///
    /// Only explicit schemes act; implicit schemes leave the history as is.
    /// The history must already have been advanced with
    /// [`History::next_step`] and sized with [`Integrator::stored_steps`].
    pub(crate) fn advance(&self, history: &mut History) {
        match self.method {
            Method::AdamsBashforth(k) => adams_bashforth::advance(k, history),
            Method::CentralDifference => central_difference::advance(history),
            _ => {}
        }
    }

    /// Applies the post-evaluation correction of explicit schemes.
    pub(crate) fn correct(&self, history: &mut History) {
        if self.method == Method::CentralDifference {
            central_difference::correct(history);
        }
    }

    /// Computes the known parts of the implicit relation for the new step.
    ///
    /// Explicit schemes leave `implicit` untouched.
    pub(crate) fn prepare(&self, history: &History, implicit: &mut Implicit) {
        match self.method {
            Method::AdamsMoulton(k) => adams_moulton::prepare(k, history, implicit),
            Method::Bdf(k) => bdf::prepare(k, history, implicit),
            Method::Newmark { beta, gamma } => newmark::prepare(beta, gamma, history, implicit),
            Method::AdamsBashforth(_) | Method::CentralDifference => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use nalgebra::DVector;

    fn scalar(value: f64) -> DVector<f64> {
        DVector::from_element(1, value)
    }

    /// A first-order history sized for `integrator`, starting at `t = 0`.
    fn first_order_history(integrator: &Integrator, q0: f64, qdot0: f64) -> History {
        let mut history = History::starting_at(0.0);
        history.set_initial_condition(0, &scalar(q0)).unwrap();
        history.set_conf(1, 0, &scalar(qdot0)).unwrap();
        let stored = integrator.stored_steps();
        history
            .set_stored_steps(stored.value, stored.intermediate, stored.highest)
            .unwrap();
        history.set_seed_policy(integrator.seed_policy());
        history
    }

    #[test]
    fn bdf_name_and_code_agree() {
        let by_name = Integrator::new("BDF-3".parse().unwrap()).expect("should build");
        let by_code = Integrator::new(Method::from_code(2, 3).unwrap()).expect("should build");

        assert_eq!(by_name, by_code);
        assert_eq!(by_name.coefficients(), by_code.coefficients());
        assert_eq!(by_name.stored_steps(), by_code.stored_steps());
    }

    #[test]
    fn unsupported_orders_fail() {
        assert_eq!(
            Integrator::new(Method::AdamsMoulton(6)),
            Err(Error::UnsupportedOrder {
                family: "AM",
                order: 6
            })
        );
        assert!(Integrator::new(Method::Bdf(0)).is_err());
        assert!(
            Integrator::new(Method::Newmark {
                beta: -1.0,
                gamma: 0.5
            })
            .is_err()
        );
    }

    #[test]
    fn classification() {
        let ab = Integrator::new(Method::AdamsBashforth(3)).unwrap();
        let cd = Integrator::new(Method::CentralDifference).unwrap();
        let am = Integrator::new(Method::AdamsMoulton(2)).unwrap();
        let newmark = Integrator::new(Method::AVERAGE_ACCELERATION).unwrap();

        assert!(ab.is_explicit() && cd.is_explicit());
        assert!(!am.is_explicit() && !newmark.is_explicit());
        assert_eq!(ab.seed_policy(), SeedPolicy::Keep);
        assert_eq!(am.seed_policy(), SeedPolicy::CopyPrevious);
        assert_eq!(ab.min_diff_order(), 1);
        assert_eq!(cd.min_diff_order(), 2);
        assert_eq!(newmark.min_diff_order(), 2);
    }

    #[test]
    fn stored_steps_per_family() {
        let steps = |method| Integrator::new(method).unwrap().stored_steps();

        assert_eq!(
            steps(Method::AdamsBashforth(4)),
            StoredSteps {
                value: 2,
                intermediate: 5,
                highest: 5
            }
        );
        assert_eq!(
            steps(Method::AdamsMoulton(1)),
            StoredSteps {
                value: 2,
                intermediate: 2,
                highest: 1
            }
        );
        assert_eq!(
            steps(Method::Bdf(2)),
            StoredSteps {
                value: 3,
                intermediate: 3,
                highest: 1
            }
        );
    }

    #[test]
    fn coefficient_tables_are_consistent() {
        // Adams weights sum to one, BDF weights α sum to one.
        for k in 1..=5 {
            let ab = Integrator::new(Method::AdamsBashforth(k)).unwrap();
            let am = Integrator::new(Method::AdamsMoulton(k)).unwrap();
            let bdf = Integrator::new(Method::Bdf(k)).unwrap();

            assert_relative_eq!(ab.coefficients().iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(am.coefficients().iter().sum::<f64>(), 1.0, epsilon = 1e-12);

            let table = bdf.coefficients();
            assert_eq!(table.len(), k + 1);
            assert_relative_eq!(table[..k].iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn adams_bashforth_1_on_constant_rate_is_exact() {
        let integrator = Integrator::new(Method::AdamsBashforth(1)).unwrap();
        let mut history = first_order_history(&integrator, 1.0, 3.0);
        let h = 0.1;

        for step in 1..=5 {
            let before = history.conf(0, 0).unwrap()[0];
            history.next_step(h).unwrap();
            integrator.advance(&mut history);
            // qdot = c
            history.set_conf(1, 0, &scalar(3.0)).unwrap();

            assert_eq!(history.conf(0, 0).unwrap()[0], before + 3.0 * h);
            assert_relative_eq!(
                history.conf(0, 0).unwrap()[0],
                1.0 + 3.0 * h * f64::from(step),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn adams_bashforth_2_uses_previous_rate() {
        let integrator = Integrator::new(Method::AdamsBashforth(2)).unwrap();
        let mut history = first_order_history(&integrator, 0.0, 1.0);

        // First step falls back to order 1.
        history.next_step(0.5).unwrap();
        integrator.advance(&mut history);
        assert_relative_eq!(history.conf(0, 0).unwrap()[0], 0.5);
        history.set_conf(1, 0, &scalar(2.0)).unwrap();

        // q2 = q1 + h (3/2 f1 - 1/2 f0)
        history.next_step(0.5).unwrap();
        integrator.advance(&mut history);
        assert_relative_eq!(
            history.conf(0, 0).unwrap()[0],
            0.5 + 0.5 * (1.5 * 2.0 - 0.5 * 1.0)
        );
    }

    #[test]
    fn implicit_relation_derives_rate() {
        let integrator = Integrator::new(Method::Bdf(2)).unwrap();
        let mut history = first_order_history(&integrator, 1.0, 0.0);
        let mut implicit = Implicit::default();

        // First step falls back to BDF-1: qdot = (q - q_n) / h.
        history.next_step(0.25).unwrap();
        integrator.prepare(&history, &mut implicit);
        history.set_conf(0, 0, &scalar(1.5)).unwrap();
        implicit.derive(&mut history);

        assert_relative_eq!(history.conf(1, 0).unwrap()[0], 2.0);
        let sensitivity = implicit.sensitivity();
        assert_relative_eq!(sensitivity.qdot, 4.0);
        assert_relative_eq!(sensitivity.qddot, 16.0);

        // BDF-2: qdot = (q - 4/3 q_n + 1/3 q_n-1) / (2/3 h)
        history.next_step(0.25).unwrap();
        integrator.prepare(&history, &mut implicit);
        history.set_conf(0, 0, &scalar(2.0)).unwrap();
        implicit.derive(&mut history);

        let expected = (2.0 - 4.0 / 3.0 * 1.5 + 1.0 / 3.0 * 1.0) / (2.0 / 3.0 * 0.25);
        assert_relative_eq!(history.conf(1, 0).unwrap()[0], expected, epsilon = 1e-12);
    }
}
