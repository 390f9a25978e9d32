//! Weather resistance from wind and sea state.
//!
//! The resistance factor is a dimensionless multiplier on fuel burn:
//!
//! ```text
//! factor = 1.0 + max(0, wind - 5.0) * 0.01 + max(0, wave - 1.0) * 0.05
//! ```
//!
//! Storm and rough-sea flags are derived from the same numeric inputs. The
//! upstream condition label is advisory and never consulted here.

/// Wind speed (m/s) below which wind adds no resistance.
pub const WIND_BASELINE_MPS: f64 = 5.0;

/// Added resistance per m/s of wind above the baseline.
pub const WIND_COEFFICIENT: f64 = 0.01;

/// Wave height (m) below which waves add no resistance.
pub const WAVE_BASELINE_M: f64 = 1.0;

/// Added resistance per metre of wave height above the baseline.
pub const WAVE_COEFFICIENT: f64 = 0.05;

/// Wind speed (m/s) above which conditions are flagged as a storm.
pub const STORM_WIND_MPS: f64 = 15.0;

/// Wave height (m) above which the sea is flagged as rough.
pub const ROUGH_SEA_WAVE_M: f64 = 3.0;

/// Output of the resistance calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistance {
    /// Multiplier on baseline emissions, always >= 1.0.
    pub factor: f64,
    /// Wind above [`STORM_WIND_MPS`].
    pub storm: bool,
    /// Waves above [`ROUGH_SEA_WAVE_M`].
    pub rough_sea: bool,
}

impl Resistance {
    /// Calm water: factor 1.0 and no flags.
    pub const NEUTRAL: Resistance = Resistance {
        factor: 1.0,
        storm: false,
        rough_sea: false,
    };

    /// Computes resistance for the given wind speed and wave height.
    ///
    /// Negative or non-finite inputs contribute nothing, so the factor can
    /// never drop below 1.0.
    pub fn compute(wind_speed_mps: f64, wave_height_m: f64) -> Self {
        let wind_excess = excess_over(wind_speed_mps, WIND_BASELINE_MPS);
        let wave_excess = excess_over(wave_height_m, WAVE_BASELINE_M);

        Self {
            factor: 1.0 + wind_excess * WIND_COEFFICIENT + wave_excess * WAVE_COEFFICIENT,
            storm: wind_speed_mps > STORM_WIND_MPS,
            rough_sea: wave_height_m > ROUGH_SEA_WAVE_M,
        }
    }
}

// f64::max drops NaN, which is exactly the clamp we want.
fn excess_over(value: f64, baseline: f64) -> f64 {
    let excess = (value - baseline).max(0.0);
    if excess.is_finite() {
        excess
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calm_conditions_are_exactly_neutral() {
        for wind in [0.0, 1.0, 2.5, 4.99, 5.0] {
            for wave in [0.0, 0.5, 1.0] {
                let r = Resistance::compute(wind, wave);
                assert_eq!(r.factor, 1.0, "wind={wind} wave={wave}");
                assert!(!r.storm);
                assert!(!r.rough_sea);
            }
        }
    }

    #[test]
    fn test_reference_scenario() {
        // 1.0 + 7 * 0.01 + 1.5 * 0.05
        let r = Resistance::compute(12.0, 2.5);
        assert!((r.factor - 1.145).abs() < 1e-12);
        assert!(!r.storm);
        assert!(!r.rough_sea);
    }

    #[test]
    fn test_monotonic_in_wind_and_wave() {
        let steps: Vec<f64> = (0..60).map(|i| i as f64 * 0.5).collect();
        for &wave in &steps {
            let mut last = 0.0;
            for &wind in &steps {
                let f = Resistance::compute(wind, wave).factor;
                assert!(f >= last, "not monotonic in wind at wind={wind} wave={wave}");
                last = f;
            }
        }
        for &wind in &steps {
            let mut last = 0.0;
            for &wave in &steps {
                let f = Resistance::compute(wind, wave).factor;
                assert!(f >= last, "not monotonic in wave at wind={wind} wave={wave}");
                last = f;
            }
        }
    }

    #[test]
    fn test_flags_use_strict_thresholds() {
        assert!(!Resistance::compute(15.0, 3.0).storm);
        assert!(!Resistance::compute(15.0, 3.0).rough_sea);
        assert!(Resistance::compute(15.1, 0.0).storm);
        assert!(Resistance::compute(0.0, 3.1).rough_sea);
    }

    #[test]
    fn test_negative_and_non_finite_inputs_are_clamped() {
        assert_eq!(Resistance::compute(-20.0, -4.0).factor, 1.0);
        assert_eq!(Resistance::compute(f64::NAN, f64::NAN).factor, 1.0);
        assert_eq!(Resistance::compute(f64::INFINITY, 0.0).factor, 1.0);
        assert!(Resistance::compute(f64::NEG_INFINITY, 2.0).factor >= 1.0);
    }

    #[test]
    fn test_neutral_constant() {
        assert_eq!(Resistance::compute(0.0, 0.0), Resistance::NEUTRAL);
    }
}
