//! Fixed-step time integration of differential systems.
//!
//! A controller ties a user system to a [`History`], an [`Integrator`] and a
//! reusable [`Newton`] solver:
//!
//! - [`FirstOrderProblem`] — `qdot = f(q, t)` or `R(q, qdot, t) = 0`
//! - [`SecondOrderProblem`] — `qddot = f(q, qdot, t)` or `R(q, qdot, qddot, t) = 0`
//! - [`PartitionedProblem`] — a first-order set coupled with a second-order set
//!
//! # Lifecycle
//!
//! Controllers are configured (integrator, initial configuration, time
//! parameters, Newton settings, output files), then initialized, then
//! stepped until the final time. See [`Phase`].
//!
//! # Algorithm
//!
//! Each step:
//!
//! 1. Advance the history by one step (rotating every window).
//! 2. Explicit schemes: predict the lower orders, evaluate the highest order
//!    through the system, apply the scheme's correction.
//! 3. Implicit schemes: prepare the step relation from committed history,
//!    then run Newton on the order-0 value. Every iterate is written into the
//!    history and the higher orders are derived from it before the system's
//!    residual, jacobian or convergence test is called.
//! 4. Append the step to the output files.
//! 5. Emit an [`Event`] to the observer.
//!
//! # Observer
//!
//! The observer passed to `solve` receives an [`Event`] for the initial
//! configuration and after every committed step, and may return
//! [`Action::StopEarly`].
//!
//! [`History`]: crate::history::History
//! [`Integrator`]: crate::integrator::Integrator
//! [`Newton`]: crate::nonlinear::newton::Newton

mod action;
mod control;
mod error;
mod event;
mod first_order;
mod output;
mod partition;
mod partitioned;
mod phase;
mod policy;
mod second_order;
mod solution;
mod time;


pub use action::Action;
pub use error::Error;
pub use event::Event;
pub use first_order::FirstOrderProblem;
pub use partitioned::PartitionedProblem;
pub use phase::Phase;
pub use policy::NonConvergence;
pub use second_order::SecondOrderProblem;
pub use solution::{Solution, Status};
pub use time::{ConfigError, TimeParameters};
