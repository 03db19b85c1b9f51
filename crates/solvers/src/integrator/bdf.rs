use crate::history::History;

use super::Implicit;

/// Weights `α_i` of `q_{n+1} = Σ α_i q_{n+1-i} + h β f_{n+1}`, indexed by order.
pub(super) const ALPHA: [&[f64]; 5] = [
    &[1.0],
    &[4.0 / 3.0, -1.0 / 3.0],
    &[18.0 / 11.0, -9.0 / 11.0, 2.0 / 11.0],
    &[48.0 / 25.0, -36.0 / 25.0, 16.0 / 25.0, -3.0 / 25.0],
    &[
        300.0 / 137.0,
        -300.0 / 137.0,
        200.0 / 137.0,
        -75.0 / 137.0,
        12.0 / 137.0,
    ],
];

/// Weight `β` of the unknown rate, indexed by order.
pub(super) const BETA: [f64; 5] = [1.0, 2.0 / 3.0, 6.0 / 11.0, 12.0 / 25.0, 60.0 / 137.0];

/// Collects `Σ α_i q_{n+1-i}` for every integrated level.
pub(super) fn prepare(order: usize, history: &History, implicit: &mut Implicit) {
    let h = history.last_step_size();
    let effective = order.min(history.steps_taken()).max(1);
    let alpha = ALPHA[effective - 1];
    let levels = history.diff_order();
    let size = history.vector_size().unwrap_or(0);

    for (level, known) in implicit.known_mut(levels, size).iter_mut().enumerate() {
        let values = history.window(level);

        known.fill(0.0);
        for (i, &a) in alpha.iter().enumerate() {
            known.axpy(a, &values[1 + i], 1.0);
        }
    }

    implicit.set_multistep(h * BETA[effective - 1]);
}
