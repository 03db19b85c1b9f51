use crate::history::History;

/// Predicts displacement and a half-step velocity.
///
/// ```text
/// q_{n+1}  = q_n + h qdot_n + h²/2 qddot_n
/// qdot*    = qdot_n + h/2 qddot_n
/// ```
pub(super) fn advance(history: &mut History) {
    let h = history.last_step_size();
    let [disp, vel, acc] = history.windows_mut() else {
        return;
    };

    let (next, committed) = disp.split_at_mut(1);
    next[0].copy_from(&committed[0]);
    next[0].axpy(h, &vel[1], 1.0);
    next[0].axpy(0.5 * h * h, &acc[1], 1.0);

    let (next, committed) = vel.split_at_mut(1);
    next[0].copy_from(&committed[0]);
    next[0].axpy(0.5 * h, &acc[1], 1.0);
}

/// Completes the velocity with the new acceleration.
///
/// `qdot_{n+1} = qdot_n + h/2 (qddot_n + qddot_{n+1})`
pub(super) fn correct(history: &mut History) {
    let h = history.last_step_size();
    let [_, vel, acc] = history.windows_mut() else {
        return;
    };

    let (next, committed) = vel.split_at_mut(1);
    next[0].copy_from(&committed[0]);
    next[0].axpy(0.5 * h, &acc[1], 1.0);
    next[0].axpy(0.5 * h, &acc[0], 1.0);
}
