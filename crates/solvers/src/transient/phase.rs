use std::fmt;

/// Lifecycle of a controller.
///
/// ```text
/// Uninitialized ──initialize──▶ Configured ──step──▶ Stepping ──t ≥ tf──▶ Finished
/// ```
///
/// Setup calls are only accepted while `Uninitialized`; stepping is only
/// accepted while `Configured` or `Stepping`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Uninitialized,
    Configured,
    Stepping,
    Finished,
}

impl Phase {
    /// Returns `true` if another step may be taken.
    #[must_use]
    pub fn can_step(self) -> bool {
        matches!(self, Self::Configured | Self::Stepping)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Configured => "configured",
            Self::Stepping => "stepping",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}
