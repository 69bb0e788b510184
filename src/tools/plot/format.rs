use std::fmt;
use std::str::FromStr;

use crate::error::MendError;

/// How cell values are printed: `d`, `.Nf`, `f` or `.N%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// Rounded to the nearest integer.
    Integer,
    /// Fixed point with this many decimals.
    Fixed(usize),
    /// Multiplied by 100, with this many decimals and a `%` sign.
    Percent(usize),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Fixed(2)
    }
}

impl NumberFormat {
    pub fn format(self, value: f64) -> String {
        match self {
            NumberFormat::Integer => format!("{}", value.round() as i64),
            NumberFormat::Fixed(decimals) => format!("{value:.decimals$}"),
            NumberFormat::Percent(decimals) => format!("{:.*}%", decimals, value * 100.0),
        }
    }
}

impl FromStr for NumberFormat {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MendError::PlotOption(format!("unsupported number format '{s}'"));
        let decimals = |digits: &str| digits.parse::<usize>().map_err(|_| invalid());
        match s {
            "d" => Ok(NumberFormat::Integer),
            "f" => Ok(NumberFormat::Fixed(6)),
            "%" => Ok(NumberFormat::Percent(6)),
            _ => {
                let spec = s.strip_prefix('.').ok_or_else(invalid)?;
                if let Some(digits) = spec.strip_suffix('f') {
                    Ok(NumberFormat::Fixed(decimals(digits)?))
                } else if let Some(digits) = spec.strip_suffix('%') {
                    Ok(NumberFormat::Percent(decimals(digits)?))
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFormat::Integer => f.write_str("d"),
            NumberFormat::Fixed(decimals) => write!(f, ".{decimals}f"),
            NumberFormat::Percent(decimals) => write!(f, ".{decimals}%"),
        }
    }
}
