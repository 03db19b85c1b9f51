use std::error::Error as StdError;

use crate::{
    history::HistoryError,
    integrator::{self, Method},
    nonlinear::newton,
};

use super::{ConfigError, Phase};

/// Errors that can occur while configuring or stepping a controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    #[error("integrator error: {0}")]
    Integrator(#[from] integrator::Error),

    #[error("invalid time parameters: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid Newton settings: {0}")]
    NewtonConfig(#[from] newton::ConfigError),

    #[error("no integrator has been selected")]
    MissingIntegrator,

    #[error("no initial configuration has been set")]
    MissingInitialCondition,

    #[error("no time parameters have been set")]
    MissingTimeParameters,

    #[error("{method} cannot integrate a system of differential order {diff_order}")]
    Incompatible { method: Method, diff_order: usize },

    #[error("cannot {operation} while {phase}")]
    InvalidPhase {
        phase: Phase,
        operation: &'static str,
    },

    #[error("output order {order} exceeds the highest stored order {max}")]
    InvalidOutputOrder { order: usize, max: usize },

    #[error("Newton did not converge at step {step} (t = {time}) after {iterations} iterations")]
    NotConverged {
        step: usize,
        time: f64,
        iterations: usize,
    },

    #[error("Newton error: {0}")]
    Newton(newton::Error),

    #[error("system error: {0}")]
    System(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn system<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::System(Box::new(err))
    }
}

impl From<newton::Error> for Error {
    /// System failures inside Newton are reported as [`Error::System`].
    fn from(err: newton::Error) -> Self {
        match err {
            newton::Error::System(source) => Self::System(source),
            other => Self::Newton(other),
        }
    }
}
