use std::error::Error as StdError;

/// Errors that can occur during Newton iteration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("system error: {0}")]
    System(#[source] Box<dyn StdError + Send + Sync>),

    #[error("singular jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },
}

impl Error {
    pub(crate) fn system<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::System(Box::new(err))
    }
}
