use crate::history::History;

use super::Implicit;

/// Collects the committed parts of the Newmark update.
///
/// ```text
/// known_0 = q_n + h qdot_n + h² (1/2 - β) qddot_n
/// known_1 = qdot_n + h (1 - γ) qddot_n
/// ```
pub(super) fn prepare(beta: f64, gamma: f64, history: &History, implicit: &mut Implicit) {
    let h = history.last_step_size();
    let size = history.vector_size().unwrap_or(0);
    let [disp, vel, acc] = history.windows() else {
        return;
    };

    let [known_disp, known_vel] = implicit.known_mut(2, size) else {
        return;
    };

    known_disp.copy_from(&disp[1]);
    known_disp.axpy(h, &vel[1], 1.0);
    known_disp.axpy(h * h * (0.5 - beta), &acc[1], 1.0);

    known_vel.copy_from(&vel[1]);
    known_vel.axpy(h * (1.0 - gamma), &acc[1], 1.0);

    implicit.set_newmark(beta * h * h, gamma * h);
}
