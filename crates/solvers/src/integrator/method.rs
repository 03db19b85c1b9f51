use std::{fmt, str::FromStr};

use super::Error;

/// Highest order available for the multistep families.
pub(super) const MAX_ORDER: usize = 5;

/// Selects an integration scheme.
///
/// A `Method` is only a selector. It is validated and turned into a usable
/// scheme by [`Integrator::new`](super::Integrator::new).
///
/// Methods can also be parsed from their short names:
///
/// ```
/// use multistep_solvers::integrator::Method;
///
/// let bdf: Method = "BDF-3".parse().unwrap();
/// assert_eq!(bdf, Method::Bdf(3));
/// assert_eq!(bdf.to_string(), "BDF-3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    /// Explicit Adams-Bashforth of the given order.
    AdamsBashforth(usize),

    /// Implicit Adams-Moulton of the given order.
    AdamsMoulton(usize),

    /// Implicit backward differentiation formula of the given order.
    Bdf(usize),

    /// Explicit central difference for second-order systems.
    CentralDifference,

    /// Implicit Newmark scheme for second-order systems.
    Newmark { beta: f64, gamma: f64 },
}

impl Method {
    /// Newmark average acceleration parameters used by the `NEWMARK` key.
    pub const AVERAGE_ACCELERATION: Self = Self::Newmark {
        beta: 0.25,
        gamma: 0.5,
    };

    /// Selects a method from its integer family code.
    ///
    /// Codes are `0` Adams-Bashforth, `1` Adams-Moulton, `2` BDF and `3`
    /// central difference (which ignores `order`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownCode`] for any other code.
    pub fn from_code(code: usize, order: usize) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::AdamsBashforth(order)),
            1 => Ok(Self::AdamsMoulton(order)),
            2 => Ok(Self::Bdf(order)),
            3 => Ok(Self::CentralDifference),
            _ => Err(Error::UnknownCode(code)),
        }
    }

    /// Creates a Newmark method with validated parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNewmark`] unless both parameters are finite
    /// and positive.
    pub fn newmark(beta: f64, gamma: f64) -> Result<Self, Error> {
        let method = Self::Newmark { beta, gamma };
        method.validate()?;
        Ok(method)
    }

    /// Checks the order or parameters carried by the selector.
    pub(super) fn validate(self) -> Result<(), Error> {
        match self {
            Self::AdamsBashforth(order) | Self::AdamsMoulton(order) | Self::Bdf(order) => {
                if (1..=MAX_ORDER).contains(&order) {
                    Ok(())
                } else {
                    Err(Error::UnsupportedOrder {
                        family: self.family(),
                        order,
                    })
                }
            }
            Self::CentralDifference => Ok(()),
            Self::Newmark { beta, gamma } => {
                let valid = |v: f64| v.is_finite() && v > 0.0;
                if valid(beta) && valid(gamma) {
                    Ok(())
                } else {
                    Err(Error::InvalidNewmark { beta, gamma })
                }
            }
        }
    }

    /// Returns the short family name.
    #[must_use]
    pub fn family(self) -> &'static str {
        match self {
            Self::AdamsBashforth(_) => "AB",
            Self::AdamsMoulton(_) => "AM",
            Self::Bdf(_) => "BDF",
            Self::CentralDifference => "CD",
            Self::Newmark { .. } => "NEWMARK",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdamsBashforth(order) | Self::AdamsMoulton(order) | Self::Bdf(order) => {
                write!(f, "{}-{order}", self.family())
            }
            Self::CentralDifference | Self::Newmark { .. } => f.write_str(self.family()),
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Parses `AB-k`, `AM-k`, `BDF-k` (k in 1..=5), `CD` or `NEWMARK`.
    ///
    /// Names are matched case-insensitively. `NEWMARK` selects
    /// [`Method::AVERAGE_ACCELERATION`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || Error::UnknownName(s.to_owned());
        let key = s.trim().to_ascii_uppercase();

        match key.as_str() {
            "CD" => return Ok(Self::CentralDifference),
            "NEWMARK" => return Ok(Self::AVERAGE_ACCELERATION),
            _ => {}
        }

        let (family, order) = key.split_once('-').ok_or_else(unknown)?;
        let order = match order.parse::<usize>() {
            Ok(order) if (1..=MAX_ORDER).contains(&order) => order,
            _ => return Err(unknown()),
        };

        match family {
            "AB" => Ok(Self::AdamsBashforth(order)),
            "AM" => Ok(Self::AdamsMoulton(order)),
            "BDF" => Ok(Self::Bdf(order)),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_select_families() {
        assert_eq!(Method::from_code(0, 2), Ok(Method::AdamsBashforth(2)));
        assert_eq!(Method::from_code(1, 4), Ok(Method::AdamsMoulton(4)));
        assert_eq!(Method::from_code(2, 3), Ok(Method::Bdf(3)));
        assert_eq!(Method::from_code(3, 9), Ok(Method::CentralDifference));
        assert_eq!(Method::from_code(4, 1), Err(Error::UnknownCode(4)));
    }

    #[test]
    fn parses_every_key() {
        for order in 1..=5 {
            for (family, expected) in [
                ("AB", Method::AdamsBashforth(order)),
                ("AM", Method::AdamsMoulton(order)),
                ("BDF", Method::Bdf(order)),
            ] {
                let key = format!("{family}-{order}");
                let method: Method = key.parse().expect("should parse");
                assert_eq!(method, expected);
                assert_eq!(method.to_string(), key);
            }
        }

        assert_eq!("CD".parse(), Ok(Method::CentralDifference));
        assert_eq!("newmark".parse(), Ok(Method::AVERAGE_ACCELERATION));
    }

    #[test]
    fn rejects_unknown_names() {
        for name in ["AB-6", "AB-0", "BDF", "RK-4", "AM-x", ""] {
            assert_eq!(
                name.parse::<Method>(),
                Err(Error::UnknownName(name.to_owned())),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn newmark_parameters_are_validated() {
        assert!(Method::newmark(0.25, 0.5).is_ok());
        assert!(matches!(
            Method::newmark(0.0, 0.5),
            Err(Error::InvalidNewmark { .. })
        ));
        assert!(matches!(
            Method::newmark(0.25, f64::NAN),
            Err(Error::InvalidNewmark { .. })
        ));
    }
}
