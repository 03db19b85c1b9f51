use crate::history::History;

/// Weights `b_i` of `q_{n+1} = q_n + h Σ b_i f_{n-i}`, indexed by order.
pub(super) const COEFFICIENTS: [&[f64]; 5] = [
    &[1.0],
    &[3.0 / 2.0, -1.0 / 2.0],
    &[23.0 / 12.0, -16.0 / 12.0, 5.0 / 12.0],
    &[55.0 / 24.0, -59.0 / 24.0, 37.0 / 24.0, -9.0 / 24.0],
    &[
        1901.0 / 720.0,
        -2774.0 / 720.0,
        2616.0 / 720.0,
        -1274.0 / 720.0,
        251.0 / 720.0,
    ],
];

/// Predicts every level below the highest from the committed rates.
pub(super) fn advance(order: usize, history: &mut History) {
    let h = history.last_step_size();
    let effective = order.min(history.steps_taken()).max(1);
    let weights = COEFFICIENTS[effective - 1];

    for level in 0..history.diff_order() {
        let (values, rates) = history.split_lower_mut(level);
        let (current, committed) = values.split_at_mut(1);
        let next = &mut current[0];

        next.copy_from(&committed[0]);
        for (i, &b) in weights.iter().enumerate() {
            next.axpy(h * b, &rates[1 + i], 1.0);
        }
    }
}
