//! Weather adjustment of a baseline CO₂ estimate.

use super::error::EmissionError;

/// Baseline emissions re-expressed under weather resistance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    /// `base * resistance`
    pub adjusted_co2_kg: f64,
    /// `adjusted - base`, non-negative whenever resistance >= 1.0.
    pub delta_co2_kg: f64,
    /// `1 / sqrt(resistance)`: speed retained at constant power.
    pub speed_factor: f64,
}

impl Adjustment {
    /// Applies a resistance factor to a baseline CO₂ estimate.
    ///
    /// # Errors
    ///
    /// - [`EmissionError::InvalidBaseline`] if `base_co2_kg` is negative or not finite
    /// - [`EmissionError::InvalidResistance`] if `resistance_factor` is not a
    ///   finite positive number
    pub fn apply(base_co2_kg: f64, resistance_factor: f64) -> Result<Self, EmissionError> {
        if !base_co2_kg.is_finite() || base_co2_kg < 0.0 {
            return Err(EmissionError::InvalidBaseline(base_co2_kg));
        }
        if !resistance_factor.is_finite() || resistance_factor <= 0.0 {
            return Err(EmissionError::InvalidResistance(resistance_factor));
        }

        let adjusted_co2_kg = base_co2_kg * resistance_factor;
        if !adjusted_co2_kg.is_finite() {
            return Err(EmissionError::InvalidBaseline(base_co2_kg));
        }

        Ok(Self {
            adjusted_co2_kg,
            delta_co2_kg: adjusted_co2_kg - base_co2_kg,
            speed_factor: 1.0 / resistance_factor.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emissions::Resistance;

    #[test]
    fn test_reference_scenario() {
        let resistance = Resistance::compute(12.0, 2.5);
        let adj = Adjustment::apply(450.0, resistance.factor).unwrap();

        assert!((adj.adjusted_co2_kg - 515.25).abs() < 1e-9);
        assert!((adj.delta_co2_kg - 65.25).abs() < 1e-9);
        assert_eq!(adj.delta_co2_kg, adj.adjusted_co2_kg - 450.0);
    }

    #[test]
    fn test_neutral_resistance_leaves_baseline_untouched() {
        let adj = Adjustment::apply(1234.5, 1.0).unwrap();
        assert_eq!(adj.adjusted_co2_kg, 1234.5);
        assert_eq!(adj.delta_co2_kg, 0.0);
        assert_eq!(adj.speed_factor, 1.0);
    }

    #[test]
    fn test_adjusted_never_below_base_for_resistance_at_least_one() {
        for base in [0.0, 0.1, 12.0, 450.0, 98_765.4] {
            for factor in [1.0, 1.0001, 1.145, 1.5, 2.75, 10.0] {
                let adj = Adjustment::apply(base, factor).unwrap();
                assert!(adj.adjusted_co2_kg >= base, "base={base} factor={factor}");
                assert_eq!(adj.delta_co2_kg, adj.adjusted_co2_kg - base);
                assert!(adj.delta_co2_kg >= 0.0);
            }
        }
    }

    #[test]
    fn test_speed_factor_shrinks_with_resistance() {
        let adj = Adjustment::apply(100.0, 4.0).unwrap();
        assert_eq!(adj.speed_factor, 0.5);
    }

    #[test]
    fn test_rejects_invalid_baseline() {
        for base in [-0.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                Adjustment::apply(base, 1.2),
                Err(EmissionError::InvalidBaseline(_))
            ));
        }
    }

    #[test]
    fn test_rejects_invalid_resistance() {
        for factor in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Adjustment::apply(100.0, factor),
                Err(EmissionError::InvalidResistance(_))
            ));
        }
    }

    #[test]
    fn test_overflowing_product_is_rejected() {
        assert!(Adjustment::apply(f64::MAX, 2.0).is_err());
    }
}
