use thiserror::Error;

/// Start time, final time and fixed step size of an integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeParameters {
    start: f64,
    end: f64,
    step_size: f64,
}

/// Errors that can occur when validating time parameters.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("start time must be finite")]
    Start,

    #[error("final time must be finite and greater than the start time")]
    End,

    #[error("step size must be finite and positive")]
    StepSize,
}

impl Default for TimeParameters {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(0.0, 1.0, 0.01).unwrap()
    }
}

impl TimeParameters {
    /// Relative slack, in step sizes, used to decide the final time is reached.
    const END_TOLERANCE: f64 = 1e-6;

    /// Creates validated time parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not finite, the step size is not
    /// positive, or `end` does not come after `start`.
    pub fn new(start: f64, end: f64, step_size: f64) -> Result<Self, ConfigError> {
        if !start.is_finite() {
            return Err(ConfigError::Start);
        }
        if !end.is_finite() || end <= start {
            return Err(ConfigError::End);
        }
        if !step_size.is_finite() || step_size <= 0.0 {
            return Err(ConfigError::StepSize);
        }

        Ok(Self {
            start,
            end,
            step_size,
        })
    }

    /// Returns the start time.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Returns the final time.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Returns the fixed step size.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    /// Returns `true` once `time` is within `1e-6` step sizes of the end.
    #[must_use]
    pub fn is_finished(&self, time: f64) -> bool {
        self.end - time <= Self::END_TOLERANCE * self.step_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_values() {
        assert!(TimeParameters::new(0.0, 5.0, 0.04).is_ok());
        assert_eq!(TimeParameters::new(f64::NAN, 1.0, 0.1), Err(ConfigError::Start));
        assert_eq!(TimeParameters::new(1.0, 1.0, 0.1), Err(ConfigError::End));
        assert_eq!(TimeParameters::new(0.0, 1.0, 0.0), Err(ConfigError::StepSize));
        assert_eq!(
            TimeParameters::new(0.0, 1.0, f64::INFINITY),
            Err(ConfigError::StepSize)
        );
    }

    #[test]
    fn end_is_reached_within_tolerance() {
        let time = TimeParameters::new(0.0, 1.0, 0.1).unwrap();

        assert!(!time.is_finished(0.9));
        assert!(time.is_finished(0.999_999_99));
        assert!(time.is_finished(1.0));
        assert!(time.is_finished(1.05));
    }
}
