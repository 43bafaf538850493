//! Rounding of converted amounts.

use serde::{Deserialize, Serialize};

/// How cross-currency results are rounded. Identity conversions are never
/// rounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    /// Nearest whole currency unit, halves away from zero.
    #[default]
    WholeUnits,
    /// Nearest multiple of `10^-n`, halves away from zero. `n` is capped at
    /// [`RoundingPolicy::MAX_MINOR_UNITS`].
    MinorUnits(u8),
}

impl RoundingPolicy {
    /// Most decimal places an `f64` amount can be scaled by without the
    /// intermediate product losing its integer precision.
    pub const MAX_MINOR_UNITS: u8 = 15;

    pub fn apply(self, amount: f64) -> f64 {
        match self {
            RoundingPolicy::WholeUnits => amount.round(),
            RoundingPolicy::MinorUnits(decimals) => {
                let decimals = decimals.min(Self::MAX_MINOR_UNITS);
                let factor = 10f64.powi(i32::from(decimals));
                (amount * factor).round() / factor
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_units_rounds_half_away_from_zero() {
        assert_eq!(RoundingPolicy::WholeUnits.apply(1.5), 2.0);
        assert_eq!(RoundingPolicy::WholeUnits.apply(-1.5), -2.0);
        assert_eq!(RoundingPolicy::WholeUnits.apply(1.49), 1.0);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(RoundingPolicy::MinorUnits(2).apply(1.236), 1.24);
        assert_eq!(RoundingPolicy::MinorUnits(0).apply(7.6), 8.0);
    }

    #[test]
    fn test_minor_units_capped() {
        let amount = 1234.5678;
        let rounded = RoundingPolicy::MinorUnits(255).apply(amount);
        assert!((rounded - amount).abs() < 1e-9);
        assert!(RoundingPolicy::MinorUnits(20).apply(2.0).is_finite());
    }
}
