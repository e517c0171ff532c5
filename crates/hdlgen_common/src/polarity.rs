//! Active level of clocks and control signals.

use crate::result::RtlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which level or edge of a signal is the active one.
///
/// For clocks, `Positive` selects the rising edge and `Negative` the falling
/// edge. For resets and enables it selects active-high or active-low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Rising edge / active high.
    #[default]
    Positive,
    /// Falling edge / active low.
    Negative,
}

impl Polarity {
    /// Returns `true` for [`Polarity::Positive`].
    pub fn is_positive(self) -> bool {
        self == Polarity::Positive
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "positive"),
            Polarity::Negative => write!(f, "negative"),
        }
    }
}

impl FromStr for Polarity {
    type Err = RtlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Polarity::Positive),
            "negative" => Ok(Polarity::Negative),
            other => Err(RtlError::config(format!(
                "invalid polarity '{other}', expected 'positive' or 'negative'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tokens() {
        assert_eq!("positive".parse::<Polarity>().unwrap(), Polarity::Positive);
        assert_eq!("negative".parse::<Polarity>().unwrap(), Polarity::Negative);
    }

    #[test]
    fn parse_rejects_other_tokens() {
        let err = "rising".parse::<Polarity>().unwrap_err();
        assert!(matches!(err, RtlError::InvalidConfiguration(_)));
        assert!("Positive".parse::<Polarity>().is_err());
    }

    #[test]
    fn display_matches_token() {
        for p in [Polarity::Positive, Polarity::Negative] {
            assert_eq!(p.to_string().parse::<Polarity>().unwrap(), p);
        }
    }

    #[test]
    fn default_is_positive() {
        assert!(Polarity::default().is_positive());
        assert!(!Polarity::Negative.is_positive());
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&Polarity::Negative).unwrap();
        assert_eq!(json, "\"negative\"");
        let back: Polarity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Polarity::Negative);
    }
}
