use thiserror::Error;

/// Errors raised when selecting or building an [`Integrator`](super::Integrator).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("unknown integrator code {0} (expected 0 AB, 1 AM, 2 BDF or 3 CD)")]
    UnknownCode(usize),

    #[error("unknown integrator name `{0}`")]
    UnknownName(String),

    #[error("{family} supports orders 1 to 5 (got {order})")]
    UnsupportedOrder { family: &'static str, order: usize },

    #[error("Newmark parameters must be finite and positive (beta = {beta}, gamma = {gamma})")]
    InvalidNewmark { beta: f64, gamma: f64 },
}
