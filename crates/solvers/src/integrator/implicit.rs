use nalgebra::DVector;

use crate::history::History;

/// Sensitivities of the derived derivatives with respect to the order-0 value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Sensitivity {
    /// `∂qdot/∂q`.
    pub qdot: f64,

    /// `∂qddot/∂q`.
    pub qddot: f64,
}

/// How the unknown order-0 value determines the higher derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Relation {
    /// Each level follows from the one below: `q_{j+1} = (q_j - known_j) / c`.
    Multistep { c: f64 },

    /// `qddot = (q - known_0) / (β h²)`, then `qdot = known_1 + γ h qddot`.
    Newmark { beta_h2: f64, gamma_h: f64 },
}

/// The step-dependent half of an implicit scheme.
///
/// Built by [`Integrator::prepare`](super::Integrator::prepare) once per
/// step from committed history, then applied to every Newton iterate.
#[derive(Debug, Clone)]
pub(crate) struct Implicit {
    known: Vec<DVector<f64>>,
    relation: Relation,
}

impl Default for Implicit {
    fn default() -> Self {
        Self {
            known: Vec::new(),
            relation: Relation::Multistep { c: 1.0 },
        }
    }
}

impl Implicit {
    /// Resizes the known vectors to `levels` vectors of length `size`.
    pub(super) fn known_mut(&mut self, levels: usize, size: usize) -> &mut [DVector<f64>] {
        self.known.truncate(levels);
        for known in &mut self.known {
            if known.len() != size {
                *known = DVector::zeros(size);
            }
        }
        while self.known.len() < levels {
            self.known.push(DVector::zeros(size));
        }
        &mut self.known
    }

    pub(super) fn set_multistep(&mut self, c: f64) {
        self.relation = Relation::Multistep { c };
    }

    pub(super) fn set_newmark(&mut self, beta_h2: f64, gamma_h: f64) {
        self.relation = Relation::Newmark { beta_h2, gamma_h };
    }

    /// Writes the derivatives implied by the current order-0 value.
    pub(crate) fn derive(&self, history: &mut History) {
        match self.relation {
            Relation::Multistep { c } => {
                for (level, known) in self.known.iter().enumerate() {
                    let (values, rates) = history.split_upper_mut(level);
                    let rate = &mut rates[0];
                    rate.copy_from(&values[0]);
                    *rate -= known;
                    *rate /= c;
                }
            }
            Relation::Newmark { beta_h2, gamma_h } => {
                let ([disp, vel, acc], [known_disp, known_vel]) =
                    (history.windows_mut(), self.known.as_slice())
                else {
                    return;
                };
                let acc = &mut acc[0];
                acc.copy_from(&disp[0]);
                *acc -= known_disp;
                *acc /= beta_h2;

                let vel = &mut vel[0];
                vel.copy_from(known_vel);
                vel.axpy(gamma_h, acc, 1.0);
            }
        }
    }

    /// Returns `∂qdot/∂q` and `∂qddot/∂q` for the current relation.
    pub(crate) fn sensitivity(&self) -> Sensitivity {
        match self.relation {
            Relation::Multistep { c } => Sensitivity {
                qdot: 1.0 / c,
                qddot: 1.0 / (c * c),
            },
            Relation::Newmark { beta_h2, gamma_h } => Sensitivity {
                qdot: gamma_h / beta_h2,
                qddot: 1.0 / beta_h2,
            },
        }
    }
}
