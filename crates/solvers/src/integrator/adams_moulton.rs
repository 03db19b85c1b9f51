use crate::history::History;

use super::Implicit;

/// Weights `a_i` of `q_{n+1} = q_n + h Σ a_i f_{n+1-i}`, indexed by order.
///
/// `a_0` multiplies the unknown rate.
pub(super) const COEFFICIENTS: [&[f64]; 5] = [
    &[1.0],
    &[1.0 / 2.0, 1.0 / 2.0],
    &[5.0 / 12.0, 8.0 / 12.0, -1.0 / 12.0],
    &[9.0 / 24.0, 19.0 / 24.0, -5.0 / 24.0, 1.0 / 24.0],
    &[
        251.0 / 720.0,
        646.0 / 720.0,
        -264.0 / 720.0,
        106.0 / 720.0,
        -19.0 / 720.0,
    ],
];

/// Collects `q_n + h Σ_{i≥1} a_i f_{n+1-i}` for every integrated level.
///
/// The initial rate is known, so order `k` becomes usable after `k - 1`
/// committed steps.
pub(super) fn prepare(order: usize, history: &History, implicit: &mut Implicit) {
    let h = history.last_step_size();
    let effective = order.min(history.steps_taken() + 1);
    let weights = COEFFICIENTS[effective - 1];
    let levels = history.diff_order();
    let size = history.vector_size().unwrap_or(0);

    for (level, known) in implicit.known_mut(levels, size).iter_mut().enumerate() {
        let values = history.window(level);
        let rates = history.window(level + 1);

        known.copy_from(&values[1]);
        for (i, &a) in weights.iter().enumerate().skip(1) {
            known.axpy(h * a, &rates[i], 1.0);
        }
    }

    implicit.set_multistep(h * weights[0]);
}
