use thiserror::Error;

/// Errors raised by a [`History`](super::History).
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum HistoryError {
    #[error("initial condition has size {found}, existing vectors have size {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("initial conditions must be assigned before defining step storage")]
    NoInitialCondition,

    #[error("no start time has been set")]
    NoStartTime,

    #[error("no step to undo")]
    NothingToUndo,

    #[error("step size must be finite and positive (got {0})")]
    InvalidStepSize(f64),

    #[error("derivative order {order} exceeds the stored maximum {max}")]
    OrderOutOfRange { order: usize, max: usize },

    #[error("step {step} is outside the stored window of {stored} for order {order}")]
    StepOutOfRange {
        order: usize,
        step: usize,
        stored: usize,
    },

    #[error("step {step} is outside the timeline of {size} entries")]
    TimeOutOfRange { step: usize, size: usize },

    #[error("vector has size {found}, expected {expected}")]
    WrongSize { expected: usize, found: usize },
}
